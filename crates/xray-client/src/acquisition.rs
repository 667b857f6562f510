//! Image acquisition: turn a user-picked file into a decoded bitmap.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, GenericImageView};
use tracing::debug;

use crate::error::{ClientResult, PredictionError};

/// Where the picked image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// A file on the local filesystem
    Path(PathBuf),
    /// Raw bytes already read by the caller
    Bytes(Vec<u8>),
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Bytes(bytes)
    }
}

/// Decoded, in-memory pixels of the selected image.
///
/// Cloning shares the pixel buffer.
#[derive(Debug, Clone)]
pub struct Bitmap {
    image: Arc<DynamicImage>,
}

impl Bitmap {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn as_image(&self) -> &DynamicImage {
        &self.image
    }
}

impl From<DynamicImage> for Bitmap {
    fn from(image: DynamicImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }
}

/// Decode an in-memory byte stream. Any format the `image` crate recognizes is accepted.
pub fn decode_bytes(bytes: &[u8]) -> ClientResult<Bitmap> {
    if bytes.is_empty() {
        return Err(PredictionError::decode("image data is empty"));
    }

    let image = image::load_from_memory(bytes)
        .map_err(|e| PredictionError::decode(format!("not a readable image: {}", e)))?;

    Ok(Bitmap::from(image))
}

/// Read and decode an image without blocking the async runtime.
pub async fn load_image(source: impl Into<ImageSource>) -> ClientResult<Bitmap> {
    let bytes = match source.into() {
        ImageSource::Path(path) => tokio::fs::read(&path).await.map_err(|e| {
            PredictionError::decode(format!("cannot open {}: {}", path.display(), e))
        })?,
        ImageSource::Bytes(bytes) => bytes,
    };

    let bitmap = tokio::task::spawn_blocking(move || decode_bytes(&bytes))
        .await
        .map_err(|e| PredictionError::decode(format!("decode task failed: {}", e)))??;

    debug!(
        width = bitmap.width(),
        height = bitmap.height(),
        "Decoded selected image"
    );
    Ok(bitmap)
}
