//! Save hand-off to the host.

use crate::BoxFuture;
use crate::document::DesignDocument;
use crate::export::{RasterError, RasterImage};
use std::sync::RwLock;
use thiserror::Error;

/// Save errors.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Raster export failed: {0}")]
    Raster(#[from] RasterError),
    #[error("Save callback failed: {0}")]
    Sink(String),
}

/// Result type for save operations.
pub type SaveResult<T> = Result<T, SaveError>;

/// What the host receives on save.
#[derive(Debug, Clone, PartialEq)]
pub struct SavePayload {
    pub document: DesignDocument,
    pub raster: RasterImage,
}

/// Host save callback. Persistence is up to the implementation.
pub trait DesignSink {
    fn save(&self, payload: SavePayload) -> BoxFuture<'_, SaveResult<()>>;
}

/// Sink that keeps every payload in memory, for testing and previews.
#[derive(Default)]
pub struct MemorySink {
    saved: RwLock<Vec<SavePayload>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All payloads received so far.
    pub fn saved(&self) -> Vec<SavePayload> {
        self.saved.read().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<SavePayload> {
        self.saved.read().ok().and_then(|s| s.last().cloned())
    }
}

impl DesignSink for MemorySink {
    fn save(&self, payload: SavePayload) -> BoxFuture<'_, SaveResult<()>> {
        Box::pin(async move {
            let mut saved = self
                .saved
                .write()
                .map_err(|e| SaveError::Sink(format!("Lock error: {}", e)))?;
            saved.push(payload);
            Ok(())
        })
    }
}
