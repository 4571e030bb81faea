use kurbo::Point;
use printcanvas_cli::cli::{CheckArgs, RenderArgs, SvgArgs};
use printcanvas_cli::commands::{run_check, run_render, run_svg};
use printcanvas_core::objects::{ImageObject, ImageSource, ShapeKind, ShapeObject, ShapeStyle};
use printcanvas_core::{DesignDocument, DesignObject, Scene};
use std::path::{Path, PathBuf};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

fn write_document(dir: &Path) -> PathBuf {
    let mut scene = Scene::new(120.0, 80.0);
    scene.insert(DesignObject::Shape(ShapeObject::new(
        ShapeKind::Circle,
        Point::new(60.0, 40.0),
        ShapeStyle::default(),
    )));
    scene.insert(DesignObject::Image(ImageObject::new(
        Point::new(20.0, 20.0),
        ImageSource::Url("art/logo.png".into()),
        10,
        10,
    )));
    let path = dir.join("design.json");
    std::fs::write(&path, DesignDocument::from_scene(&scene).to_json().unwrap()).unwrap();
    path
}

#[test]
fn test_check_reports_counts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.json");
    std::fs::write(
        &path,
        r##"{"version":1,"canvas":{"width":100,"height":100,"background":"#ffffff"},
            "objects":[{"type":"bogus"},
                       {"type":"shape","id":"6f1f3c6e-8d1a-4a59-9a55-2b0f2f1b8c11","position":{"x":1.0,"y":2.0},
                        "kind":"rectangle","width":10.0,"height":10.0,"fill":"#000000"}]}"##,
    )
    .unwrap();

    let report = run_check(&CheckArgs { document: path }).unwrap();
    assert_eq!((report.loaded, report.skipped), (1, 1));
}

#[test]
fn test_check_fails_on_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_check(&CheckArgs {
        document: dir.path().join("nope.json"),
    });
    assert!(result.is_err());
}

#[test]
fn test_render_writes_png_at_scale() {
    let dir = tempfile::tempdir().unwrap();
    let document = write_document(dir.path());
    let output = dir.path().join("out.png");

    let raster = run_render(&RenderArgs {
        document,
        output: output.clone(),
        scale: 2.0,
        overlay: None,
    })
    .unwrap();

    assert_eq!((raster.width, raster.height), (240, 160));
    let bytes = std::fs::read(output).unwrap();
    assert_eq!(&bytes[..8], &PNG_SIGNATURE);
}

#[test]
fn test_render_rejects_bad_scale() {
    let dir = tempfile::tempdir().unwrap();
    let document = write_document(dir.path());
    let output = dir.path().join("out.png");
    let result = run_render(&RenderArgs {
        document,
        output: output.clone(),
        scale: 12.0,
        overlay: None,
    });
    assert!(result.is_err());
    assert!(!output.exists());
}

#[test]
fn test_svg_resolves_images_next_to_document() {
    let dir = tempfile::tempdir().unwrap();
    let document = write_document(dir.path());
    std::fs::create_dir(dir.path().join("art")).unwrap();
    std::fs::write(dir.path().join("art/logo.png"), PNG_SIGNATURE).unwrap();
    let output = dir.path().join("out.svg");

    run_svg(&SvgArgs {
        document,
        output: output.clone(),
        overlay: Some("Acme".into()),
    })
    .unwrap();

    let svg = std::fs::read_to_string(output).unwrap();
    assert!(svg.contains("data:image/png;base64,"));
    assert!(svg.contains(">Acme</text>"));
}
