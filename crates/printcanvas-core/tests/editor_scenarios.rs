//! End-to-end editor behavior.

use kurbo::{Point, Vec2};
use printcanvas_core::document::DesignDocument;
use printcanvas_core::export::{ImageResolver, RasterOptions, RasterResult};
use printcanvas_core::objects::{ShapeKind, ShapeStyle, TextStyle};
use printcanvas_core::{
    DesignObject, DeviceCapabilities, Editor, EditorEvent, GesturePhase, MemorySink, MountOptions,
    PointerEvent, PrintArea, RasterImage, Rasterizer, Scene,
};
use std::cell::RefCell;
use std::collections::HashSet;
use std::future::Future;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

fn block_on<F: Future>(f: F) -> F::Output {
    let mut cx = Context::from_waker(Waker::noop());
    let mut f = std::pin::pin!(f);
    loop {
        if let Poll::Ready(output) = f.as_mut().poll(&mut cx) {
            return output;
        }
    }
}

fn pointer_editor() -> Editor {
    let options = MountOptions::new(PrintArea::new(800.0, 600.0))
        .with_capabilities(DeviceCapabilities::pointer(1440.0, 900.0));
    Editor::mount(options).unwrap().0
}

fn touch_editor() -> Editor {
    let options = MountOptions::new(PrintArea::new(800.0, 600.0))
        .with_capabilities(DeviceCapabilities::touch(390.0, 844.0));
    Editor::mount(options).unwrap().0
}

/// Counts calls and reports the canvas size in a tiny fake PNG.
struct FakeRasterizer {
    calls: RefCell<usize>,
}

impl Rasterizer for FakeRasterizer {
    fn rasterize(
        &self,
        scene: &Scene,
        options: &RasterOptions,
        _images: &dyn ImageResolver,
    ) -> RasterResult<RasterImage> {
        *self.calls.borrow_mut() += 1;
        let (width, height) = options.output_size(scene.width, scene.height);
        Ok(RasterImage {
            width,
            height,
            png: vec![scene.objects().filter(|o| o.is_visible()).count() as u8],
        })
    }
}

fn assert_scene_consistent(editor: &Editor) {
    let scene = editor.scene();
    let ids: Vec<_> = scene.z_order().to_vec();
    let unique: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(ids.len(), unique.len(), "duplicate ids in z-order");
    for id in &ids {
        assert!(scene.get(*id).is_some(), "z-order references a deleted object");
    }
    assert_eq!(scene.objects().count(), ids.len());
}

#[test]
fn test_spec_scenario_duplicate_undo_redo() {
    let mut editor = pointer_editor();
    let first = editor.add_shape(
        ShapeKind::Rectangle,
        ShapeStyle::with_fill("#6366f1".parse().unwrap()),
    );
    assert_eq!(editor.object(first).unwrap().position(), Point::new(400.0, 300.0));

    let second = editor.duplicate_selected().unwrap();
    assert_ne!(first, second);
    let (a, b) = (
        editor.object(first).and_then(DesignObject::as_shape).unwrap(),
        editor.object(second).and_then(DesignObject::as_shape).unwrap(),
    );
    assert_eq!(a.fill, b.fill);
    assert_eq!((a.width, a.height), (b.width, b.height));
    assert_ne!(a.base.position, b.base.position);

    assert!(editor.undo());
    assert!(editor.undo());
    assert!(editor.is_empty());
    assert!(!editor.undo());

    assert!(editor.redo());
    assert!(editor.redo());
    assert_eq!(editor.len(), 2);
    assert!(editor.object(first).is_some());
    assert!(editor.object(second).is_some());
}

#[test]
fn test_z_order_invariant_under_mixed_operations() {
    let mut editor = pointer_editor();
    // Deterministic LCG so the sequence is reproducible
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = || {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (seed >> 33) as usize
    };

    for _ in 0..300 {
        match next() % 9 {
            0 => {
                editor.add_shape(ShapeKind::Circle, ShapeStyle::default());
            }
            1 => {
                editor.add_text("layer", TextStyle::default());
            }
            2 => {
                editor.delete_selected();
            }
            3 => {
                editor.duplicate_selected();
            }
            4 => {
                editor.move_up();
            }
            5 => {
                editor.move_down();
            }
            6 => {
                if next() % 2 == 0 {
                    editor.to_front();
                } else {
                    editor.to_back();
                }
            }
            7 => {
                editor.undo();
            }
            _ => {
                let ids = editor.scene().z_order().to_vec();
                if !ids.is_empty() {
                    editor.select(ids[next() % ids.len()]);
                    editor.translate_object(ids[next() % ids.len()], Vec2::new(3.0, -1.0));
                }
            }
        }
        assert_scene_consistent(&editor);
    }
}

#[test]
fn test_undo_redo_inverse_law() {
    let mut editor = pointer_editor();
    editor.add_text("Base", TextStyle::default());
    editor.add_shape(ShapeKind::Triangle, ShapeStyle::default());

    let pre = editor.scene().snapshot();
    editor.to_back();
    let post = editor.scene().snapshot();
    assert_ne!(pre, post);

    editor.undo();
    assert_eq!(editor.scene().snapshot(), pre);
    editor.redo();
    assert_eq!(editor.scene().snapshot(), post);
}

#[test]
fn test_bounded_history_after_25_mutations() {
    let mut editor = pointer_editor();
    for i in 0..25 {
        editor.add_text(format!("t{}", i), TextStyle::default());
    }
    assert_eq!(editor.history().undo_len(), 20);
}

#[test]
fn test_document_round_trip_through_editor() {
    let mut editor = pointer_editor();
    editor.add_text("Front", TextStyle::default());
    editor.apply_property(printcanvas_core::PropertyEdit::Rotation(33.3)).unwrap();
    editor.add_shape(ShapeKind::Circle, ShapeStyle::default());
    editor.apply_property(printcanvas_core::PropertyEdit::ScaleX(1.75)).unwrap();

    let document = editor.to_design_document();
    let json = document.to_json().unwrap();

    let mut other = pointer_editor();
    let report = other.import_document(&json).unwrap();
    assert_eq!(report.loaded, 2);
    let again = other.to_design_document();

    assert_eq!(again.objects.len(), document.objects.len());
    for (a, b) in document.objects.iter().zip(&again.objects) {
        assert_eq!(a.id(), b.id());
        assert_eq!(a.kind(), b.kind());
        let (ba, bb) = (a.base(), b.base());
        assert!((ba.position - bb.position).hypot() < 1e-6);
        assert!((ba.rotation - bb.rotation).abs() < 1e-6);
        assert!((ba.scale_x - bb.scale_x).abs() < 1e-6);
        assert!((ba.scale_y - bb.scale_y).abs() < 1e-6);
    }
    assert_eq!(serde_json::to_value(&again).unwrap(), serde_json::to_value(&document).unwrap());
}

#[test]
fn test_pinch_zoom_clamps_at_max() {
    let mut editor = touch_editor();
    assert_eq!(editor.viewport().zoom, 1.0);

    for round in 0..4 {
        let base = round * 10;
        editor.handle_pointer(PointerEvent::Down { id: base + 1, position: Point::new(100.0, 100.0) });
        editor.handle_pointer(PointerEvent::Down { id: base + 2, position: Point::new(110.0, 100.0) });
        // Distance ratio 10
        editor.handle_pointer(PointerEvent::Move { id: base + 2, position: Point::new(200.0, 100.0) });
        editor.handle_pointer(PointerEvent::Up { id: base + 2, position: Point::new(200.0, 100.0) });
        editor.handle_pointer(PointerEvent::Up { id: base + 1, position: Point::new(100.0, 100.0) });
    }
    assert_eq!(editor.viewport().zoom, 3.0);
}

#[test]
fn test_gesture_reset_then_single_finger_pans() {
    let mut editor = touch_editor();
    let id = editor.add_shape(ShapeKind::Rectangle, ShapeStyle::default());
    let rotation_before = editor.object(id).unwrap().base().rotation;

    // Two-finger twist on empty canvas (top-left corner, far from the shape)
    editor.handle_pointer(PointerEvent::Down { id: 1, position: Point::new(2.0, 2.0) });
    editor.handle_pointer(PointerEvent::Down { id: 2, position: Point::new(40.0, 2.0) });
    editor.handle_pointer(PointerEvent::Move { id: 2, position: Point::new(2.0, 40.0) });
    editor.handle_pointer(PointerEvent::Up { id: 1, position: Point::new(2.0, 2.0) });
    editor.handle_pointer(PointerEvent::Up { id: 2, position: Point::new(2.0, 40.0) });
    assert_eq!(editor.gestures().phase(), GesturePhase::Idle);

    let pan_before = editor.viewport().pan;
    editor.handle_pointer(PointerEvent::Down { id: 3, position: Point::new(5.0, 5.0) });
    editor.handle_pointer(PointerEvent::Move { id: 3, position: Point::new(25.0, 15.0) });
    editor.handle_pointer(PointerEvent::Up { id: 3, position: Point::new(25.0, 15.0) });

    assert_eq!(editor.viewport().pan - pan_before, Vec2::new(20.0, 10.0));
    assert_eq!(editor.object(id).unwrap().base().rotation, rotation_before);
}

#[test]
fn test_two_finger_twist_rotates_selected_object() {
    let mut editor = touch_editor();
    let id = editor.add_shape(ShapeKind::Rectangle, ShapeStyle::default());
    let center = editor.viewport().canvas_to_screen(Point::new(400.0, 300.0));
    let undo_len = editor.history().undo_len();

    editor.handle_pointer(PointerEvent::Down { id: 1, position: center });
    editor.handle_pointer(PointerEvent::Down { id: 2, position: center + Vec2::new(30.0, 0.0) });
    editor.handle_pointer(PointerEvent::Move { id: 2, position: center + Vec2::new(0.0, 30.0) });
    editor.handle_pointer(PointerEvent::Up { id: 2, position: center });
    editor.handle_pointer(PointerEvent::Up { id: 1, position: center });

    let rotation = editor.object(id).unwrap().base().rotation;
    assert!((rotation - 90.0).abs() < 1e-6);
    assert_eq!(editor.history().undo_len(), undo_len + 1);
    assert_eq!(editor.panel().map(|p| p.rotation), Some(rotation));
}

#[test]
fn test_set_visible_excluded_from_raster_and_hit_test() {
    let mut editor = pointer_editor();
    let id = editor.add_shape(ShapeKind::Rectangle, ShapeStyle::default());
    editor.add_text("kept", TextStyle::default());
    assert!(editor.set_visible(id, false));
    assert!(editor.scene().z_order().contains(&id));

    let rasterizer = FakeRasterizer { calls: RefCell::new(0) };
    let raster = editor.to_raster_image(&rasterizer, 2.0).unwrap();
    assert_eq!((raster.width, raster.height), (1600, 1200));
    assert_eq!(raster.png, vec![1]);

    assert!(editor.to_raster_image(&rasterizer, 0.0).is_err());
    assert_eq!(*rasterizer.calls.borrow(), 1);
}

#[test]
fn test_save_hands_document_and_raster_to_sink() {
    let mut editor = pointer_editor();
    editor.add_text("Save me", TextStyle::default());
    let rasterizer = FakeRasterizer { calls: RefCell::new(0) };
    let sink = MemorySink::new();

    block_on(editor.save(&rasterizer, 1.0, &sink)).unwrap();
    let payload = sink.last().unwrap();
    assert_eq!(payload.document, editor.to_design_document());
    assert_eq!((payload.raster.width, payload.raster.height), (800, 600));
}

#[test]
fn test_mount_hydrates_document_and_pending_image() {
    let mut source = Scene::new(800.0, 600.0);
    source.insert(DesignObject::Shape(printcanvas_core::objects::ShapeObject::new(
        ShapeKind::Circle,
        Point::new(50.0, 50.0),
        ShapeStyle::default(),
    )));
    let json = DesignDocument::from_scene(&source).to_json().unwrap();

    let mut options = MountOptions::new(PrintArea::new(800.0, 600.0));
    options.initial_document = Some(json);
    options.pending_image = Some("https://images.example/generated.png".into());
    let (mut editor, pending) = Editor::mount(options).unwrap();

    assert_eq!(editor.len(), 1);
    assert!(!editor.can_undo());
    assert_eq!(editor.last_import().map(|r| r.loaded), Some(1));

    let pending = pending.unwrap();
    assert_eq!(editor.pending_image_count(), 1);
    let events = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&events);
    editor.subscribe(move |e| seen.borrow_mut().push(e.clone()));

    let result = block_on(printcanvas_core::image_source::load(
        pending.source().clone(),
        &printcanvas_core::image_source::NoFetcher,
    ));
    assert!(editor.complete_image(pending, result).is_none());
    assert_eq!(editor.len(), 1);
    assert_eq!(editor.pending_image_count(), 0);
    assert!(events.borrow().iter().any(|e| matches!(e, EditorEvent::Warning(_))));
    editor.unmount();
}

#[test]
fn test_mutations_continue_while_image_pending() {
    let mut editor = pointer_editor();
    let pending = editor.request_image(printcanvas_core::objects::ImageSource::Url("slow.png".into()));
    let text = editor.add_text("meanwhile", TextStyle::default());

    let decoded = printcanvas_core::DecodedImage {
        source: pending.source().clone(),
        format: printcanvas_core::objects::ImageFormat::Png,
        bytes: Vec::new(),
        width: 100,
        height: 50,
    };
    let image = editor.complete_image(pending, Ok(decoded)).unwrap();
    // Appended at resolution time, in front of the earlier text
    assert_eq!(editor.scene().z_order(), &[text, image]);
    assert_eq!(editor.selected(), Some(image));
}
