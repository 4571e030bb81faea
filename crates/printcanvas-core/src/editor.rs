//! The editor facade: single writer over the scene.
//!
//! Every committed change goes through here so that history, the property
//! panel and render requests stay consistent. Gesture frames and continuous
//! panel controls run inside an interaction and are committed once when the
//! interaction ends.

use crate::config::{ConfigResult, EditorConfig};
use crate::device::{DeviceAdapter, DeviceCapabilities, DeviceProfile, EditorVariant, PrintArea};
use crate::document::{DesignDocument, DocumentResult, ImportReport};
use crate::export::{BrandOverlay, RasterImage, RasterOptions, RasterResult, Rasterizer};
use crate::gesture::{GestureAction, GestureConfig, GestureEngine, PointerEvent};
use crate::history::HistoryManager;
use crate::image_source::{DecodedImage, ImageCache, ImageResult};
use crate::objects::{
    DesignObject, ImageObject, ImageSource, ObjectId, SerializableColor, ShapeKind, ShapeObject,
    ShapeStyle, TextObject, TextStyle,
};
use crate::properties::{PanelState, PropertyEdit, PropertyError, PropertySync};
use crate::save::{DesignSink, SavePayload, SaveResult};
use crate::scene::{Scene, SceneSnapshot};
use crate::viewport::Viewport;
use kurbo::{Point, Vec2};
use std::collections::HashMap;

/// Notifications delivered to subscribed listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// The scene or viewport changed; redraw on the next frame.
    RenderRequested,
    SelectionChanged(Option<ObjectId>),
    HistoryChanged { can_undo: bool, can_redo: bool },
    /// A recoverable problem worth showing to the user.
    Warning(String),
}

/// Handle returned by [`Editor::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&EditorEvent)>;

/// Ticket for an image that is being fetched and decoded by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingImage {
    request: u64,
    source: ImageSource,
}

impl PendingImage {
    pub fn source(&self) -> &ImageSource {
        &self.source
    }
}

/// Everything the host supplies when mounting an editor.
#[derive(Debug, Clone)]
pub struct MountOptions {
    pub print_area: PrintArea,
    /// `None` keeps the device adapter in its detecting state.
    pub capabilities: Option<DeviceCapabilities>,
    /// Design document JSON to hydrate the scene from.
    pub initial_document: Option<String>,
    /// Externally generated image reference to seed as the first object.
    pub pending_image: Option<String>,
    pub brand_overlay: Option<BrandOverlay>,
    pub config: EditorConfig,
}

impl MountOptions {
    pub fn new(print_area: PrintArea) -> Self {
        Self {
            print_area,
            capabilities: None,
            initial_document: None,
            pending_image: None,
            brand_overlay: None,
            config: EditorConfig::default(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: DeviceCapabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }
}

/// An interactive design canvas.
pub struct Editor {
    config: EditorConfig,
    scene: Scene,
    history: HistoryManager,
    gestures: GestureEngine,
    properties: PropertySync,
    device: DeviceAdapter,
    images: ImageCache,
    selected: Option<ObjectId>,
    brand_overlay: Option<BrandOverlay>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    pending_images: HashMap<u64, ImageSource>,
    next_request: u64,
    render_pending: bool,
    /// Scene state captured when the current interaction began.
    interaction: Option<SceneSnapshot>,
    last_import: Option<ImportReport>,
}

impl Editor {
    /// Create an editor. Returns the pending image ticket if one was supplied.
    pub fn mount(options: MountOptions) -> ConfigResult<(Self, Option<PendingImage>)> {
        options.config.validate()?;
        let MountOptions {
            print_area,
            capabilities,
            initial_document,
            pending_image,
            brand_overlay,
            config,
        } = options;

        let mut scene = Scene::new(print_area.width, print_area.height);
        let [min_zoom, max_zoom] = config.pointer_zoom_range;
        scene.viewport.set_zoom_bounds(min_zoom, max_zoom);

        let mut editor = Self {
            history: HistoryManager::new(config.history_limit),
            gestures: GestureEngine::new(GestureConfig {
                multi_touch: false,
                min_gesture_distance: config.min_gesture_distance,
                wheel_zoom_base: config.wheel_zoom_base,
            }),
            properties: PropertySync::new(),
            device: DeviceAdapter::new(print_area, config.clone()),
            images: ImageCache::new(),
            selected: None,
            brand_overlay,
            listeners: Vec::new(),
            next_listener: 0,
            pending_images: HashMap::new(),
            next_request: 0,
            render_pending: false,
            interaction: None,
            last_import: None,
            scene,
            config,
        };

        if let Some(capabilities) = capabilities {
            editor.detect_device(capabilities);
        }

        if let Some(json) = initial_document {
            match DesignDocument::from_json_lenient(&json) {
                Ok((document, report)) => {
                    document.apply_to(&mut editor.scene);
                    log::info!(
                        "Hydrated scene: {} objects loaded, {} skipped",
                        report.loaded,
                        report.skipped
                    );
                    editor.last_import = Some(report);
                }
                Err(e) => editor.warn(format!("Ignoring initial document: {}", e)),
            }
        }

        let pending = pending_image.map(|reference| editor.request_image(ImageSource::parse(&reference)));
        editor.render_pending = true;
        Ok((editor, pending))
    }

    /// Detach listeners, drop pending image requests and release the scene.
    pub fn unmount(mut self) {
        log::info!(
            "Unmounting editor ({} objects, {} pending images)",
            self.scene.len(),
            self.pending_images.len()
        );
        self.listeners.clear();
        self.pending_images.clear();
        self.gestures.reset();
    }

    // --- Accessors ---

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn viewport(&self) -> &Viewport {
        &self.scene.viewport
    }

    pub fn object(&self, id: ObjectId) -> Option<&DesignObject> {
        self.scene.get(id)
    }

    /// Objects back to front.
    pub fn objects(&self) -> impl DoubleEndedIterator<Item = &DesignObject> {
        self.scene.objects()
    }

    pub fn len(&self) -> usize {
        self.scene.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scene.is_empty()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn gestures(&self) -> &GestureEngine {
        &self.gestures
    }

    pub fn panel(&self) -> Option<&PanelState> {
        self.properties.panel()
    }

    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    pub fn last_import(&self) -> Option<ImportReport> {
        self.last_import
    }

    pub fn brand_overlay(&self) -> Option<&BrandOverlay> {
        self.brand_overlay.as_ref()
    }

    // --- Listeners and rendering ---

    pub fn subscribe(&mut self, listener: impl FnMut(&EditorEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Whether a render has been requested and not yet taken.
    pub fn render_pending(&self) -> bool {
        self.render_pending
    }

    /// Acknowledge the pending render. The next mutation requests a new one.
    pub fn take_render_request(&mut self) -> bool {
        std::mem::take(&mut self.render_pending)
    }

    fn emit(&mut self, event: EditorEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    fn warn(&mut self, message: String) {
        log::warn!("{}", message);
        self.emit(EditorEvent::Warning(message));
    }

    fn request_render(&mut self) {
        if !self.render_pending {
            self.render_pending = true;
            self.emit(EditorEvent::RenderRequested);
        }
    }

    fn emit_history_changed(&mut self) {
        let event = EditorEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        };
        self.emit(event);
    }

    // --- Device ---

    pub fn is_ready(&self) -> bool {
        self.device.is_ready()
    }

    pub fn device_profile(&self) -> Option<&DeviceProfile> {
        self.device.profile()
    }

    pub fn variant(&self) -> Option<EditorVariant> {
        self.device.profile().map(|p| p.variant)
    }

    /// Complete capability detection and configure input for the variant.
    pub fn detect_device(&mut self, capabilities: DeviceCapabilities) {
        let profile = self.device.detect(capabilities);
        self.apply_profile(profile);
    }

    /// Recompute the layout after a viewport resize.
    /// Returns true if the editor variant changed.
    pub fn resize_viewport(&mut self, width: f64, height: f64) -> bool {
        let changed = self.device.resize(width, height);
        if let Some(profile) = self.device.profile().copied() {
            if changed {
                log::info!("Editor variant changed to {:?}", profile.variant);
            }
            self.apply_profile(profile);
        }
        changed
    }

    fn apply_profile(&mut self, profile: DeviceProfile) {
        // Reconfiguring drops contacts in flight, so their Up never arrives
        self.end_interaction();
        self.gestures.reconfigure(GestureConfig {
            multi_touch: profile.is_touch(),
            min_gesture_distance: self.config.min_gesture_distance,
            wheel_zoom_base: self.config.wheel_zoom_base,
        });
        let viewport = &mut self.scene.viewport;
        viewport.set_zoom_bounds(profile.min_zoom, profile.max_zoom);
        viewport.set_display_scale(profile.display_scale);
        self.request_render();
    }

    // --- Selection ---

    pub fn selected(&self) -> Option<ObjectId> {
        self.selected
    }

    pub fn selected_object(&self) -> Option<&DesignObject> {
        self.selected.and_then(|id| self.scene.get(id))
    }

    pub fn select(&mut self, id: ObjectId) -> bool {
        if !self.scene.contains(id) {
            return false;
        }
        self.set_selection(Some(id));
        true
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(None);
    }

    fn set_selection(&mut self, selection: Option<ObjectId>) {
        if self.selected != selection {
            self.selected = selection;
            self.emit(EditorEvent::SelectionChanged(selection));
            self.request_render();
        }
        self.sync_panel();
    }

    fn sync_panel(&mut self) {
        let selected = self.selected.and_then(|id| self.scene.get(id));
        self.properties.sync(selected);
    }

    /// Front-most visible object at a canvas point.
    pub fn object_at(&self, point: Point) -> Option<ObjectId> {
        self.scene.object_at(point)
    }

    // --- Committed mutations ---

    /// Record `before` as an undo step (unless an interaction is collecting
    /// changes) and propagate the change.
    fn commit_change(&mut self, before: SceneSnapshot) {
        if self.interaction.is_none() {
            self.history.commit_snapshot(before);
            self.emit_history_changed();
        }
        self.scene_changed();
    }

    fn scene_changed(&mut self) {
        self.sync_panel();
        self.request_render();
    }

    fn insert_and_select(&mut self, object: DesignObject) -> Option<ObjectId> {
        let id = object.id();
        let before = self.scene.snapshot();
        if !self.scene.insert(object) {
            return None;
        }
        self.commit_change(before);
        self.set_selection(Some(id));
        Some(id)
    }

    /// Add a text object at the canvas center and select it.
    pub fn add_text(&mut self, content: impl Into<String>, style: TextStyle) -> ObjectId {
        let text = TextObject::new(self.scene.center(), content.into(), style);
        let id = text.base.id();
        self.insert_and_select(DesignObject::Text(text));
        id
    }

    /// Add a shape at the canvas center and select it.
    pub fn add_shape(&mut self, kind: ShapeKind, style: ShapeStyle) -> ObjectId {
        let shape = ShapeObject::new(kind, self.scene.center(), style);
        let id = shape.base.id();
        self.insert_and_select(DesignObject::Shape(shape));
        id
    }

    /// Start adding an image. The scene is untouched until
    /// [`Editor::complete_image`] is called with the decode result.
    pub fn request_image(&mut self, source: ImageSource) -> PendingImage {
        let request = self.next_request;
        self.next_request += 1;
        self.pending_images.insert(request, source.clone());
        log::debug!("Image request {} pending", request);
        PendingImage { request, source }
    }

    /// Finish an image request. Failures leave the scene unchanged and raise a
    /// warning. Unknown or already completed requests are ignored.
    pub fn complete_image(
        &mut self,
        pending: PendingImage,
        result: ImageResult<DecodedImage>,
    ) -> Option<ObjectId> {
        if self.pending_images.remove(&pending.request).is_none() {
            log::debug!("Ignoring completion of unknown image request {}", pending.request);
            return None;
        }

        let decoded = match result {
            Ok(decoded) => decoded,
            Err(e) => {
                self.warn(format!("Failed to load image: {}", e));
                return None;
            }
        };

        self.images.insert(&decoded);
        let fraction = self.config.image_fit_fraction;
        let image = ImageObject::new(self.scene.center(), decoded.source, decoded.width, decoded.height)
            .fit_within(self.scene.width * fraction, self.scene.height * fraction);
        self.insert_and_select(DesignObject::Image(image))
    }

    pub fn pending_image_count(&self) -> usize {
        self.pending_images.len()
    }

    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        let before = self.scene.snapshot();
        if self.scene.remove(id).is_none() {
            return false;
        }
        self.commit_change(before);
        self.set_selection(None);
        true
    }

    /// Clone the selected object with an offset and a new id, and select it.
    pub fn duplicate_selected(&mut self) -> Option<ObjectId> {
        let mut copy = self.selected_object()?.clone();
        copy.regenerate_id();
        let offset = self.config.duplicate_offset;
        copy.translate(Vec2::new(offset, offset));
        self.insert_and_select(copy)
    }

    fn reorder_selected(&mut self, op: fn(&mut Scene, ObjectId) -> bool) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        let before = self.scene.snapshot();
        if !op(&mut self.scene, id) {
            return false;
        }
        self.commit_change(before);
        true
    }

    /// Move the selected object one step toward the front.
    pub fn move_up(&mut self) -> bool {
        self.reorder_selected(Scene::bring_forward)
    }

    /// Move the selected object one step toward the back.
    pub fn move_down(&mut self) -> bool {
        self.reorder_selected(Scene::send_backward)
    }

    pub fn to_front(&mut self) -> bool {
        self.reorder_selected(Scene::bring_to_front)
    }

    pub fn to_back(&mut self) -> bool {
        self.reorder_selected(Scene::send_to_back)
    }

    pub fn set_visible(&mut self, id: ObjectId, visible: bool) -> bool {
        let before = self.scene.snapshot();
        if !self.scene.set_visible(id, visible) {
            return false;
        }
        self.commit_change(before);
        true
    }

    pub fn set_background(&mut self, color: SerializableColor) -> bool {
        if self.scene.background == color {
            return false;
        }
        let before = self.scene.snapshot();
        self.scene.background = color;
        self.commit_change(before);
        true
    }

    /// Replace the scene content with a document. Undoable.
    pub fn import_document(&mut self, json: &str) -> DocumentResult<ImportReport> {
        let (document, report) = DesignDocument::from_json_lenient(json)?;
        let before = self.scene.snapshot();
        document.apply_to(&mut self.scene);
        if self.selected.is_some_and(|id| !self.scene.contains(id)) {
            self.set_selection(None);
        }
        self.commit_change(before);
        self.last_import = Some(report);
        Ok(report)
    }

    // --- Transient mutations ---

    /// Move an object. Inside an interaction this is folded into the
    /// interaction's single commit; otherwise it commits on its own.
    pub fn translate_object(&mut self, id: ObjectId, delta: Vec2) -> bool {
        self.transient(|scene| scene.translate_object(id, delta))
    }

    /// Rotate an object by degrees; same commit rules as `translate_object`.
    pub fn rotate_object(&mut self, id: ObjectId, degrees: f64) -> bool {
        self.transient(|scene| scene.rotate_object(id, degrees))
    }

    fn transient(&mut self, f: impl FnOnce(&mut Scene) -> bool) -> bool {
        let standalone = self.interaction.is_none();
        if standalone {
            self.begin_interaction();
        }
        let changed = f(&mut self.scene);
        if changed {
            self.scene_changed();
        }
        if standalone {
            self.end_interaction();
        }
        changed
    }

    // --- Property panel ---

    /// Apply a discrete panel edit as one undo step.
    pub fn apply_property(&mut self, edit: PropertyEdit) -> Result<(), PropertyError> {
        let id = self.selected.ok_or(PropertyError::NoSelection)?;
        let before = self.scene.snapshot();
        let object = self.scene.get_mut(id).ok_or(PropertyError::NoSelection)?;
        let previous = object.clone();
        edit.apply(object)?;
        if *object != previous {
            self.commit_change(before);
        }
        Ok(())
    }

    /// Start a continuous interaction (slider drag, gesture). Nested calls are
    /// absorbed by the outer interaction.
    pub fn begin_interaction(&mut self) {
        if self.interaction.is_none() {
            self.interaction = Some(self.scene.snapshot());
        }
    }

    pub fn in_interaction(&self) -> bool {
        self.interaction.is_some()
    }

    /// Apply a panel edit without recording history. A rejected edit
    /// leaves both the scene and the interaction state untouched.
    pub fn preview_property(&mut self, edit: PropertyEdit) -> Result<(), PropertyError> {
        let id = self.selected.ok_or(PropertyError::NoSelection)?;
        let mut preview = self.scene.get(id).ok_or(PropertyError::NoSelection)?.clone();
        edit.apply(&mut preview)?;

        self.begin_interaction();
        if let Some(object) = self.scene.get_mut(id) {
            *object = preview;
        }
        self.scene_changed();
        Ok(())
    }

    /// Finish the interaction. Commits one undo step if the scene changed.
    pub fn end_interaction(&mut self) -> bool {
        let Some(before) = self.interaction.take() else {
            return false;
        };
        if before == self.scene.snapshot() {
            return false;
        }
        self.history.commit_snapshot(before);
        self.emit_history_changed();
        true
    }

    // --- History ---

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        self.end_interaction();
        self.gestures.reset();
        if !self.history.undo(&mut self.scene) {
            return false;
        }
        self.after_history_jump();
        true
    }

    pub fn redo(&mut self) -> bool {
        self.end_interaction();
        self.gestures.reset();
        if !self.history.redo(&mut self.scene) {
            return false;
        }
        self.after_history_jump();
        true
    }

    fn after_history_jump(&mut self) {
        if self.selected.is_some_and(|id| !self.scene.contains(id)) {
            self.set_selection(None);
        }
        self.emit_history_changed();
        self.scene_changed();
    }

    // --- Input ---

    /// Feed raw pointer/touch input through the gesture engine.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        if !self.device.is_ready() {
            log::trace!("Ignoring input while device detection is pending");
            return;
        }
        let actions = self.gestures.handle(event, self.selected, &self.scene.viewport);
        for action in actions {
            self.apply_gesture(action);
        }
    }

    fn apply_gesture(&mut self, action: GestureAction) {
        match action {
            GestureAction::Pressed { position } => {
                let canvas_point = self.scene.viewport.screen_to_canvas(position);
                let hit = self.scene.object_at(canvas_point);
                self.set_selection(hit);
                self.begin_interaction();
            }
            GestureAction::MoveObject { id, delta } => {
                if self.scene.translate_object(id, delta) {
                    self.scene_changed();
                }
            }
            GestureAction::Rotate { id, degrees } => {
                if self.scene.rotate_object(id, degrees) {
                    self.scene_changed();
                }
            }
            GestureAction::Pan { delta } => {
                self.scene.viewport.pan_by(delta);
                self.request_render();
            }
            GestureAction::Zoom { factor, center } => {
                self.scene.viewport.zoom_at(center, factor);
                self.request_render();
            }
            GestureAction::Released => {
                self.end_interaction();
            }
        }
    }

    // --- Export ---

    pub fn to_design_document(&self) -> DesignDocument {
        DesignDocument::from_scene(&self.scene)
    }

    pub fn set_brand_overlay(&mut self, overlay: Option<BrandOverlay>) {
        if self.brand_overlay != overlay {
            self.brand_overlay = overlay;
            self.request_render();
        }
    }

    pub fn set_brand_overlay_visible(&mut self, visible: bool) {
        if let Some(overlay) = self.brand_overlay.as_mut() {
            if overlay.visible != visible {
                overlay.visible = visible;
                self.request_render();
            }
        }
    }

    /// Flatten visible objects (and the brand overlay) into a bitmap.
    pub fn to_raster_image(
        &self,
        rasterizer: &dyn Rasterizer,
        multiplier: f64,
    ) -> RasterResult<RasterImage> {
        let options = RasterOptions::new(multiplier).with_overlay(self.brand_overlay.clone());
        options.validate()?;
        rasterizer.rasterize(&self.scene, &options, &self.images)
    }

    /// Produce the document/raster pair handed to the save callback.
    pub fn save_payload(&self, rasterizer: &dyn Rasterizer, multiplier: f64) -> SaveResult<SavePayload> {
        Ok(SavePayload {
            document: self.to_design_document(),
            raster: self.to_raster_image(rasterizer, multiplier)?,
        })
    }

    /// Export and deliver to the host's sink.
    pub async fn save(
        &self,
        rasterizer: &dyn Rasterizer,
        multiplier: f64,
        sink: &dyn DesignSink,
    ) -> SaveResult<()> {
        let payload = self.save_payload(rasterizer, multiplier)?;
        log::info!(
            "Saving design: {} objects, {}x{} raster",
            payload.document.objects.len(),
            payload.raster.width,
            payload.raster.height
        );
        sink.save(payload).await
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("objects", &self.scene.len())
            .field("selected", &self.selected)
            .field("variant", &self.variant())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn editor() -> Editor {
        let options = MountOptions::new(PrintArea::new(800.0, 600.0))
            .with_capabilities(DeviceCapabilities::pointer(1440.0, 900.0));
        Editor::mount(options).unwrap().0
    }

    fn recorder(editor: &mut Editor) -> Rc<RefCell<Vec<EditorEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        editor.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        events
    }

    #[test]
    fn test_add_shape_defaults() {
        let mut editor = editor();
        let id = editor.add_shape(ShapeKind::Rectangle, ShapeStyle::default());
        let shape = editor.object(id).and_then(DesignObject::as_shape).unwrap();
        assert_eq!(shape.base.position, Point::new(400.0, 300.0));
        assert_eq!(shape.fill.to_hex(), "#6366f1");
        assert_eq!(editor.selected(), Some(id));
        assert_eq!(editor.panel().map(|p| p.id), Some(id));
    }

    #[test]
    fn test_selected_ops_are_noops_without_selection() {
        let mut editor = editor();
        editor.add_text("Hi", TextStyle::default());
        editor.clear_selection();
        let undo_len = editor.history().undo_len();

        assert!(!editor.delete_selected());
        assert!(editor.duplicate_selected().is_none());
        assert!(!editor.move_up());
        assert!(!editor.to_back());
        assert!(matches!(
            editor.apply_property(PropertyEdit::Opacity(0.5)),
            Err(PropertyError::NoSelection)
        ));
        assert_eq!(editor.history().undo_len(), undo_len);
        assert_eq!(editor.len(), 1);
    }

    #[test]
    fn test_render_requests_are_batched() {
        let mut editor = editor();
        editor.take_render_request();
        let events = recorder(&mut editor);

        editor.add_shape(ShapeKind::Circle, ShapeStyle::default());
        editor.add_shape(ShapeKind::Triangle, ShapeStyle::default());
        let renders = events
            .borrow()
            .iter()
            .filter(|e| **e == EditorEvent::RenderRequested)
            .count();
        assert_eq!(renders, 1);

        assert!(editor.take_render_request());
        assert!(!editor.render_pending());
        editor.move_down();
        assert!(editor.render_pending());
    }

    #[test]
    fn test_unsubscribe_stops_events() {
        let mut editor = editor();
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        let id = editor.subscribe(move |_| *c.borrow_mut() += 1);
        editor.add_text("a", TextStyle::default());
        let seen = *count.borrow();
        assert!(seen > 0);

        assert!(editor.unsubscribe(id));
        assert!(!editor.unsubscribe(id));
        editor.add_text("b", TextStyle::default());
        assert_eq!(*count.borrow(), seen);
    }

    #[test]
    fn test_continuous_edit_commits_once() {
        let mut editor = editor();
        editor.add_shape(ShapeKind::Rectangle, ShapeStyle::default());
        let undo_len = editor.history().undo_len();

        editor.begin_interaction();
        for step in 1..=10 {
            editor.preview_property(PropertyEdit::Opacity(1.0 - step as f64 * 0.05)).unwrap();
        }
        assert_eq!(editor.history().undo_len(), undo_len);
        assert!(editor.end_interaction());
        assert_eq!(editor.history().undo_len(), undo_len + 1);

        editor.undo();
        assert_eq!(editor.selected_object().map(|o| o.base().opacity), Some(1.0));
    }

    #[test]
    fn test_interaction_without_change_does_not_commit() {
        let mut editor = editor();
        editor.add_shape(ShapeKind::Rectangle, ShapeStyle::default());
        let undo_len = editor.history().undo_len();
        editor.begin_interaction();
        assert!(!editor.end_interaction());
        assert_eq!(editor.history().undo_len(), undo_len);
    }

    #[test]
    fn test_apply_property_rejects_mismatch() {
        let mut editor = editor();
        editor.add_shape(ShapeKind::Rectangle, ShapeStyle::default());
        let undo_len = editor.history().undo_len();
        let result = editor.apply_property(PropertyEdit::Content("x".into()));
        assert!(matches!(result, Err(PropertyError::NotApplicable { .. })));
        assert_eq!(editor.history().undo_len(), undo_len);

        editor.apply_property(PropertyEdit::Rotation(45.0)).unwrap();
        assert_eq!(editor.history().undo_len(), undo_len + 1);
        assert_eq!(editor.panel().map(|p| p.rotation), Some(45.0));
    }

    #[test]
    fn test_undo_drops_missing_selection() {
        let mut editor = editor();
        let id = editor.add_text("Hello", TextStyle::default());
        assert!(editor.undo());
        assert!(editor.object(id).is_none());
        assert_eq!(editor.selected(), None);
        assert!(editor.panel().is_none());
    }

    #[test]
    fn test_image_failure_is_a_warning() {
        let mut editor = editor();
        let events = recorder(&mut editor);
        let pending = editor.request_image(ImageSource::Url("https://x/missing.png".into()));
        let result = editor.complete_image(pending, Err(crate::image_source::ImageError::Empty));
        assert!(result.is_none());
        assert!(editor.is_empty());
        assert!(!editor.can_undo());
        assert!(events.borrow().iter().any(|e| matches!(e, EditorEvent::Warning(_))));
    }

    #[test]
    fn test_image_fits_canvas() {
        let mut editor = editor();
        let pending = editor.request_image(ImageSource::Url("big.png".into()));
        let decoded = DecodedImage {
            source: pending.source().clone(),
            format: crate::objects::ImageFormat::Png,
            bytes: vec![1, 2, 3],
            width: 2000,
            height: 1000,
        };
        let id = editor.complete_image(pending.clone(), Ok(decoded.clone())).unwrap();
        let bounds = editor.object(id).unwrap().bounds();
        // 60% of 800 wide is the limiting dimension
        assert!((bounds.width() - 480.0).abs() < 1e-9);
        assert_eq!(editor.images().len(), 1);

        // Completing the same ticket twice is ignored
        assert!(editor.complete_image(pending, Ok(decoded)).is_none());
        assert_eq!(editor.len(), 1);
    }

    #[test]
    fn test_pointer_drag_moves_selected_object() {
        let mut editor = editor();
        let id = editor.add_shape(ShapeKind::Rectangle, ShapeStyle::default());
        let undo_len = editor.history().undo_len();
        let scale = editor.viewport().scale();
        let center = editor.viewport().canvas_to_screen(Point::new(400.0, 300.0));

        editor.handle_pointer(PointerEvent::Down { id: 1, position: center });
        for i in 1..=5 {
            let position = center + Vec2::new(i as f64 * 2.0 * scale, 0.0);
            editor.handle_pointer(PointerEvent::Move { id: 1, position });
        }
        editor.handle_pointer(PointerEvent::Up { id: 1, position: center });

        let position = editor.object(id).unwrap().position();
        assert!((position.x - 410.0).abs() < 1e-6);
        assert_eq!(editor.history().undo_len(), undo_len + 1);
        assert!(!editor.in_interaction());
    }

    #[test]
    fn test_resize_mid_gesture_closes_interaction() {
        let options = MountOptions::new(PrintArea::new(800.0, 600.0))
            .with_capabilities(DeviceCapabilities::touch(390.0, 844.0));
        let (mut editor, _) = Editor::mount(options).unwrap();
        editor.add_shape(ShapeKind::Rectangle, ShapeStyle::default());
        let center = editor.viewport().canvas_to_screen(Point::new(400.0, 300.0));
        let undo_len = editor.history().undo_len();

        editor.handle_pointer(PointerEvent::Down { id: 1, position: center });
        assert!(editor.in_interaction());
        editor.resize_viewport(390.0, 700.0);
        editor.handle_pointer(PointerEvent::Up { id: 1, position: center });
        assert!(!editor.in_interaction());

        editor.add_text("a", TextStyle::default());
        editor.add_text("b", TextStyle::default());
        assert_eq!(editor.history().undo_len(), undo_len + 2);
    }

    #[test]
    fn test_undo_mid_drag_cancels_gesture() {
        let mut editor = editor();
        let id = editor.add_shape(ShapeKind::Rectangle, ShapeStyle::default());
        let scale = editor.viewport().scale();
        let center = editor.viewport().canvas_to_screen(Point::new(400.0, 300.0));

        editor.handle_pointer(PointerEvent::Down { id: 1, position: center });
        editor.handle_pointer(PointerEvent::Move {
            id: 1,
            position: center + Vec2::new(10.0 * scale, 0.0),
        });
        assert!(editor.undo());
        assert_eq!(editor.gestures().contact_count(), 0);

        // The rest of the stroke is ignored instead of mutating untracked
        editor.handle_pointer(PointerEvent::Move {
            id: 1,
            position: center + Vec2::new(60.0 * scale, 0.0),
        });
        editor.handle_pointer(PointerEvent::Up { id: 1, position: center });
        assert_eq!(editor.object(id).unwrap().position(), Point::new(400.0, 300.0));
        assert!(!editor.in_interaction());

        assert!(editor.redo());
        let position = editor.object(id).unwrap().position();
        assert!((position.x - 410.0).abs() < 1e-6);
    }

    #[test]
    fn test_rejected_preview_opens_no_interaction() {
        let mut editor = editor();
        editor.add_shape(ShapeKind::Rectangle, ShapeStyle::default());
        let undo_len = editor.history().undo_len();

        assert!(editor.preview_property(PropertyEdit::Content("x".into())).is_err());
        assert!(!editor.in_interaction());
        editor.add_text("counted", TextStyle::default());
        assert_eq!(editor.history().undo_len(), undo_len + 1);
    }

    #[test]
    fn test_input_ignored_while_detecting() {
        let (mut editor, _) = Editor::mount(MountOptions::new(PrintArea::new(100.0, 100.0))).unwrap();
        assert!(!editor.is_ready());
        editor.handle_pointer(PointerEvent::Down {
            id: 1,
            position: Point::new(1.0, 1.0),
        });
        assert_eq!(editor.gestures().contact_count(), 0);

        editor.detect_device(DeviceCapabilities::touch(400.0, 800.0));
        assert_eq!(editor.variant(), Some(EditorVariant::Touch));
        assert_eq!(editor.viewport().min_zoom, 0.5);
    }

    #[test]
    fn test_resize_switches_variant() {
        let options = MountOptions::new(PrintArea::new(720.0, 900.0))
            .with_capabilities(DeviceCapabilities::touch(1200.0, 900.0));
        let (mut editor, _) = Editor::mount(options).unwrap();
        assert_eq!(editor.variant(), Some(EditorVariant::Pointer));
        assert!(editor.resize_viewport(400.0, 800.0));
        assert_eq!(editor.variant(), Some(EditorVariant::Touch));
        assert!(editor.gestures().config().multi_touch);
    }

    #[test]
    fn test_mount_rejects_invalid_config() {
        let mut options = MountOptions::new(PrintArea::new(100.0, 100.0));
        options.config.history_limit = 0;
        assert!(Editor::mount(options).is_err());
    }

    #[test]
    fn test_mount_with_bad_document_warns_and_starts_empty() {
        let mut options = MountOptions::new(PrintArea::new(100.0, 100.0));
        options.initial_document = Some("{".into());
        let (editor, pending) = Editor::mount(options).unwrap();
        assert!(editor.is_empty());
        assert!(pending.is_none());
        assert!(editor.last_import().is_none());
    }
}
