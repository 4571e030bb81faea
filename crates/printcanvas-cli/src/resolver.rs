//! Image resolution from the local filesystem.

use printcanvas_core::ImageResolver;
use printcanvas_core::objects::ImageSource;
use std::path::{Path, PathBuf};

/// Resolves `file://` URLs and plain paths against a base directory
/// (normally the document's). Remote URLs are not fetched.
#[derive(Debug, Clone)]
pub struct FileResolver {
    base_dir: PathBuf,
}

impl FileResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Resolver rooted at the directory containing `document`.
    pub fn for_document(document: &Path) -> Self {
        let dir = document.parent().unwrap_or_else(|| Path::new("."));
        Self::new(dir)
    }

    /// Local path for a URL, or `None` for remote schemes.
    pub fn local_path(&self, url: &str) -> Option<PathBuf> {
        let path = match url.strip_prefix("file://") {
            Some(rest) => rest,
            None if url.contains("://") => return None,
            None => url,
        };
        Some(self.base_dir.join(path))
    }
}

impl ImageResolver for FileResolver {
    fn resolve(&self, source: &ImageSource) -> Option<Vec<u8>> {
        let url = match source {
            ImageSource::Embedded { .. } => return source.embedded_bytes(),
            ImageSource::Url(url) => url,
        };
        let Some(path) = self.local_path(url) else {
            log::warn!("Remote image {} is not fetched by the CLI", url);
            return None;
        };
        match std::fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::warn!("Failed to read image {}: {}", path.display(), e);
                None
            }
        }
    }
}
