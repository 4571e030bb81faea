//! Subcommand implementations.

use crate::cli::{CheckArgs, RenderArgs, SvgArgs};
use crate::resolver::FileResolver;
use anyhow::{Context, Result};
use printcanvas_core::{
    BrandOverlay, DesignDocument, ImportReport, RasterImage, RasterOptions, Rasterizer, Scene,
};
use printcanvas_render::{SvgRasterizer, render_svg};
use std::path::Path;

/// Read and leniently parse a design document into a scene.
pub fn load_scene(path: &Path) -> Result<(Scene, ImportReport)> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let (document, report) = DesignDocument::from_json_lenient(&json)
        .with_context(|| format!("Failed to parse design document {}", path.display()))?;
    if report.skipped > 0 {
        log::warn!("Skipped {} malformed objects in {}", report.skipped, path.display());
    }
    Ok((document.to_scene(), report))
}

pub fn run_render(args: &RenderArgs) -> Result<RasterImage> {
    let (scene, _) = load_scene(&args.document)?;
    let options = RasterOptions::new(args.scale).with_overlay(args.overlay.clone().map(BrandOverlay::new));
    let resolver = FileResolver::for_document(&args.document);

    let raster = SvgRasterizer::new()
        .rasterize(&scene, &options, &resolver)
        .context("Failed to rasterize design")?;
    std::fs::write(&args.output, &raster.png)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    log::info!("Rendered {} to {}", args.document.display(), args.output.display());
    Ok(raster)
}

pub fn run_svg(args: &SvgArgs) -> Result<()> {
    let (scene, _) = load_scene(&args.document)?;
    let options = RasterOptions::default().with_overlay(args.overlay.clone().map(BrandOverlay::new));
    let resolver = FileResolver::for_document(&args.document);

    let svg = render_svg(&scene, &options, &resolver);
    std::fs::write(&args.output, svg)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    Ok(())
}

pub fn run_check(args: &CheckArgs) -> Result<ImportReport> {
    let (scene, report) = load_scene(&args.document)?;
    log::info!(
        "{}: {}x{} canvas, {} objects",
        args.document.display(),
        scene.width,
        scene.height,
        scene.len()
    );
    Ok(report)
}
