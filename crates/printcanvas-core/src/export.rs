//! Raster export contracts.
//!
//! The core only describes *what* a raster export is; pixel work lives in a
//! [`Rasterizer`] implementation supplied by a render backend.

use crate::objects::ImageSource;
use crate::scene::Scene;
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest accepted resolution multiplier.
pub const MAX_MULTIPLIER: f64 = 8.0;

/// Raster export errors.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Resolution multiplier {0} must be finite and in (0, 8]")]
    InvalidMultiplier(f64),
    #[error("Cannot allocate a {width}x{height} pixmap")]
    Allocation { width: u32, height: u32 },
    #[error("Failed to build vector scene: {0}")]
    Scene(String),
    #[error("Failed to encode PNG: {0}")]
    Encode(String),
}

/// Result type for raster export.
pub type RasterResult<T> = Result<T, RasterError>;

/// Provides bytes for image objects at export time.
pub trait ImageResolver {
    fn resolve(&self, source: &ImageSource) -> Option<Vec<u8>>;
}

/// Resolver that only knows embedded images.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedOnly;

impl ImageResolver for EmbeddedOnly {
    fn resolve(&self, source: &ImageSource) -> Option<Vec<u8>> {
        source.embedded_bytes()
    }
}

/// Brand label drawn over exports when visible. Never saved in documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandOverlay {
    pub label: String,
    pub visible: bool,
}

impl BrandOverlay {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            visible: true,
        }
    }
}

/// Parameters for one raster export.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterOptions {
    pub multiplier: f64,
    pub overlay: Option<BrandOverlay>,
}

impl RasterOptions {
    pub fn new(multiplier: f64) -> Self {
        Self {
            multiplier,
            overlay: None,
        }
    }

    pub fn with_overlay(mut self, overlay: Option<BrandOverlay>) -> Self {
        self.overlay = overlay;
        self
    }

    /// Overlay label, if one should be drawn.
    pub fn visible_overlay(&self) -> Option<&str> {
        self.overlay
            .as_ref()
            .filter(|o| o.visible && !o.label.trim().is_empty())
            .map(|o| o.label.as_str())
    }

    pub fn validate(&self) -> RasterResult<()> {
        let m = self.multiplier;
        if m.is_finite() && m > 0.0 && m <= MAX_MULTIPLIER {
            Ok(())
        } else {
            Err(RasterError::InvalidMultiplier(m))
        }
    }

    /// Output pixel size for a canvas: `ceil(dim * multiplier)`, at least 1.
    pub fn output_size(&self, width: f64, height: f64) -> (u32, u32) {
        let scaled = |v: f64| (v * self.multiplier).ceil().clamp(1.0, u32::MAX as f64) as u32;
        (scaled(width), scaled(height))
    }
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// An encoded raster export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    /// PNG-encoded pixels.
    pub png: Vec<u8>,
}

impl RasterImage {
    /// `data:image/png;base64,...` form for hosts that want a URL.
    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.png))
    }
}

/// Flattens a scene into a bitmap.
pub trait Rasterizer {
    fn rasterize(
        &self,
        scene: &Scene,
        options: &RasterOptions,
        images: &dyn ImageResolver,
    ) -> RasterResult<RasterImage>;
}
