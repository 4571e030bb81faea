//! Image objects for uploaded or generated raster images.

use super::{ObjectBase, ObjectTrait};
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Image format for embedded image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from a MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_lowercase().as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        None
    }
}

/// Where an image's pixels come from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    /// Remote or host-resolved reference.
    Url(String),
    /// Image bytes stored inline as base64.
    Embedded {
        format: ImageFormat,
        data_base64: String,
    },
}

impl ImageSource {
    /// Build an embedded source from raw bytes.
    pub fn embedded(format: ImageFormat, data: &[u8]) -> Self {
        ImageSource::Embedded {
            format,
            data_base64: STANDARD.encode(data),
        }
    }

    /// Interpret a host-supplied reference: `data:<mime>;base64,...` URLs become
    /// embedded sources, anything else is treated as a URL.
    pub fn parse(reference: &str) -> Self {
        let reference = reference.trim();
        if let Some(rest) = reference.strip_prefix("data:") {
            if let Some((meta, payload)) = rest.split_once(',') {
                if let Some(mime) = meta.strip_suffix(";base64") {
                    if let Some(format) = ImageFormat::from_mime(mime) {
                        return ImageSource::Embedded {
                            format,
                            data_base64: payload.to_string(),
                        };
                    }
                }
            }
        }
        ImageSource::Url(reference.to_string())
    }

    /// Decode embedded bytes. URLs have no local bytes.
    pub fn embedded_bytes(&self) -> Option<Vec<u8>> {
        match self {
            ImageSource::Embedded { data_base64, .. } => STANDARD.decode(data_base64).ok(),
            ImageSource::Url(_) => None,
        }
    }

    /// Stable key for caching decoded bytes.
    pub fn cache_key(&self) -> String {
        match self {
            ImageSource::Url(url) => url.clone(),
            ImageSource::Embedded {
                format,
                data_base64,
            } => format!("data:{};base64,{}", format.mime_type(), data_base64),
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, ImageSource::Embedded { .. })
    }
}

/// An image object displaying a decoded raster image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageObject {
    #[serde(flatten)]
    pub base: ObjectBase,
    pub source: ImageSource,
    /// Width in pixels, captured at decode time.
    pub natural_width: u32,
    /// Height in pixels, captured at decode time.
    pub natural_height: u32,
}

impl ImageObject {
    pub fn new(position: Point, source: ImageSource, natural_width: u32, natural_height: u32) -> Self {
        Self {
            base: ObjectBase::new(position),
            source,
            natural_width,
            natural_height,
        }
    }

    /// Uniformly scale the image to fit within max dimensions. Never upscales.
    pub fn fit_within(mut self, max_width: f64, max_height: f64) -> Self {
        let (w, h) = (f64::from(self.natural_width), f64::from(self.natural_height));
        if w <= 0.0 || h <= 0.0 {
            return self;
        }
        let scale = (max_width / w).min(max_height / h).min(1.0);
        self.base.scale_x = scale;
        self.base.scale_y = scale;
        self
    }
}

impl ObjectTrait for ImageObject {
    fn base(&self) -> &ObjectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    fn intrinsic_size(&self) -> (f64, f64) {
        (f64::from(self.natural_width), f64::from(self.natural_height))
    }
}
