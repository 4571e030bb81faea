//! Fetching and decoding image sources.

use crate::BoxFuture;
use crate::export::ImageResolver;
use crate::objects::{ImageFormat, ImageSource};
use std::collections::HashMap;
use std::io::Cursor;
use thiserror::Error;

/// Image loading errors.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("Invalid embedded image data: {0}")]
    InvalidData(String),
    #[error("Unsupported image format")]
    UnsupportedFormat,
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Image has zero size")]
    Empty,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for image operations.
pub type ImageResult<T> = Result<T, ImageError>;

/// Host hook that turns a URL into bytes.
pub trait ImageFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ImageResult<Vec<u8>>>;
}

/// Fetcher for hosts without network access: every URL fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFetcher;

impl ImageFetcher for NoFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ImageResult<Vec<u8>>> {
        Box::pin(async move {
            Err(ImageError::Fetch {
                url: url.to_string(),
                reason: "no image fetcher configured".to_string(),
            })
        })
    }
}

/// A successfully decoded image.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub source: ImageSource,
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decode bytes, capturing format and natural size.
pub fn decode_bytes(source: ImageSource, bytes: Vec<u8>) -> ImageResult<DecodedImage> {
    let reader = image::ImageReader::new(Cursor::new(bytes.as_slice())).with_guessed_format()?;
    let format = match reader.format() {
        Some(image::ImageFormat::Png) => ImageFormat::Png,
        Some(image::ImageFormat::Jpeg) => ImageFormat::Jpeg,
        Some(image::ImageFormat::WebP) => ImageFormat::WebP,
        _ => return Err(ImageError::UnsupportedFormat),
    };
    let decoded = reader.decode()?;
    let (width, height) = (decoded.width(), decoded.height());
    if width == 0 || height == 0 {
        return Err(ImageError::Empty);
    }
    log::debug!("Decoded {:?} image {}x{}", format, width, height);
    Ok(DecodedImage {
        source,
        format,
        bytes,
        width,
        height,
    })
}

/// Resolve a source to bytes (embedded locally, URLs via the fetcher) and decode.
pub async fn load(source: ImageSource, fetcher: &dyn ImageFetcher) -> ImageResult<DecodedImage> {
    let bytes = match &source {
        ImageSource::Embedded { .. } => source
            .embedded_bytes()
            .ok_or_else(|| ImageError::InvalidData("base64 payload did not decode".to_string()))?,
        ImageSource::Url(url) => fetcher.fetch(url).await?,
    };
    decode_bytes(source, bytes)
}

/// Decoded image bytes kept for export, keyed by source.
///
/// Entries outlive the objects that use them: undo or redo can bring a
/// deleted image back, and it must still export. The cache is dropped with
/// the editor.
#[derive(Debug, Default, Clone)]
pub struct ImageCache {
    entries: HashMap<String, Vec<u8>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, image: &DecodedImage) {
        self.entries.insert(image.source.cache_key(), image.bytes.clone());
    }

    pub fn get(&self, source: &ImageSource) -> Option<&[u8]> {
        self.entries.get(&source.cache_key()).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl ImageResolver for ImageCache {
    fn resolve(&self, source: &ImageSource) -> Option<Vec<u8>> {
        source
            .embedded_bytes()
            .or_else(|| self.get(source).map(<[u8]>::to_vec))
    }
}
