//! Design documents: the lossless save format.

use crate::objects::{DesignObject, ObjectId, SerializableColor};
use crate::scene::Scene;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

/// Current document format version.
pub const DOCUMENT_VERSION: u32 = 1;

/// Errors that prevent a document from loading at all.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Document is missing an \"objects\" array")]
    MissingObjects,
    #[error("Invalid canvas: {0}")]
    InvalidCanvas(String),
}

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Canvas attributes stored with a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasInfo {
    pub width: f64,
    pub height: f64,
    pub background: SerializableColor,
}

impl Default for CanvasInfo {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            background: SerializableColor::white(),
        }
    }
}

/// Outcome of a lenient import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub loaded: usize,
    pub skipped: usize,
}

/// A saved design: canvas attributes plus objects back to front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignDocument {
    pub version: u32,
    #[serde(default)]
    pub canvas: CanvasInfo,
    pub objects: Vec<DesignObject>,
}

impl DesignDocument {
    pub fn from_scene(scene: &Scene) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            canvas: CanvasInfo {
                width: scene.width,
                height: scene.height,
                background: scene.background,
            },
            objects: scene.objects().cloned().collect(),
        }
    }

    /// Build a fresh scene sized to the document's canvas.
    pub fn to_scene(&self) -> Scene {
        let mut scene = Scene::new(self.canvas.width, self.canvas.height);
        self.apply_to(&mut scene);
        scene
    }

    /// Replace the scene's background and objects with this document's.
    /// Canvas size and viewport are left alone.
    pub fn apply_to(&self, scene: &mut Scene) {
        scene.background = self.canvas.background;
        scene.clear();
        for object in &self.objects {
            scene.insert(object.clone());
        }
    }

    pub fn to_json(&self) -> DocumentResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document, skipping malformed or duplicate objects.
    ///
    /// Only unparseable JSON or a missing `objects` array is fatal.
    pub fn from_json_lenient(json: &str) -> DocumentResult<(Self, ImportReport)> {
        let mut root: Value = serde_json::from_str(json)?;
        let Some(Value::Array(raw_objects)) = root.get_mut("objects").map(Value::take) else {
            return Err(DocumentError::MissingObjects);
        };

        let version = match root.get("version") {
            None => DOCUMENT_VERSION,
            Some(v) => v
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(DOCUMENT_VERSION),
        };
        if version > DOCUMENT_VERSION {
            log::warn!(
                "Document version {} is newer than supported version {}, loading best-effort",
                version,
                DOCUMENT_VERSION
            );
        }

        let canvas = match root.get_mut("canvas").map(Value::take) {
            Some(value) => {
                let canvas: CanvasInfo = serde_json::from_value(value)
                    .map_err(|e| DocumentError::InvalidCanvas(e.to_string()))?;
                if !(canvas.width.is_finite() && canvas.height.is_finite())
                    || canvas.width <= 0.0
                    || canvas.height <= 0.0
                {
                    return Err(DocumentError::InvalidCanvas(format!(
                        "size {}x{} must be positive",
                        canvas.width, canvas.height
                    )));
                }
                canvas
            }
            None => CanvasInfo::default(),
        };

        let mut report = ImportReport::default();
        let mut seen: HashSet<ObjectId> = HashSet::new();
        let mut objects = Vec::with_capacity(raw_objects.len());
        for (index, raw) in raw_objects.into_iter().enumerate() {
            let parsed = serde_json::from_value::<DesignObject>(raw)
                .map_err(|e| e.to_string())
                .and_then(|mut object| match object.normalize() {
                    Ok(()) => Ok(object),
                    Err(reason) => Err(reason.to_string()),
                });
            match parsed {
                Ok(object) if seen.insert(object.id()) => {
                    objects.push(object);
                    report.loaded += 1;
                }
                Ok(object) => {
                    log::warn!("Skipping object {}: duplicate id {}", index, object.id());
                    report.skipped += 1;
                }
                Err(e) => {
                    log::warn!("Skipping malformed object {}: {}", index, e);
                    report.skipped += 1;
                }
            }
        }

        Ok((
            Self {
                version,
                canvas,
                objects,
            },
            report,
        ))
    }
}
