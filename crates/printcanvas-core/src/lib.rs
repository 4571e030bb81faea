//! PrintCanvas Core Library
//!
//! Platform-agnostic engine for the PrintCanvas design editor: object model,
//! viewport, gestures, undo history, property panel sync, device adaptation
//! and export contracts.

pub mod config;
pub mod device;
pub mod document;
pub mod editor;
pub mod export;
pub mod gesture;
pub mod history;
pub mod image_source;
pub mod objects;
pub mod properties;
pub mod save;
pub mod scene;
pub mod viewport;

use std::future::Future;
use std::pin::Pin;

/// Boxed future for host callbacks (no `Send` bound: the editor runs on a
/// single-threaded event loop).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

pub use config::{ConfigError, EditorConfig};
pub use device::{DeviceAdapter, DeviceCapabilities, DeviceProfile, EditorVariant, PrintArea, ProductKind};
pub use document::{DesignDocument, DocumentError, ImportReport};
pub use editor::{Editor, EditorEvent, ListenerId, MountOptions, PendingImage};
pub use export::{BrandOverlay, ImageResolver, RasterError, RasterImage, RasterOptions, Rasterizer};
pub use gesture::{GestureAction, GestureEngine, GesturePhase, PointerEvent};
pub use history::HistoryManager;
pub use image_source::{DecodedImage, ImageCache, ImageError, ImageFetcher};
pub use objects::{DesignObject, ObjectId, SerializableColor};
pub use properties::{PanelState, PropertyEdit, PropertyError};
pub use save::{DesignSink, MemorySink, SaveError, SavePayload};
pub use scene::{Scene, SceneSnapshot};
pub use viewport::Viewport;
