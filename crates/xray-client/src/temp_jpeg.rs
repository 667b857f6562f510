//! Scoped temp file holding the JPEG re-encoding of a bitmap.
//!
//! The file exists exactly as long as its [`TempJpeg`] guard. Dropping the
//! guard deletes it, so every exit path of a submission (success, HTTP
//! error, transport failure, task abort) releases it.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::ColorType;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::acquisition::Bitmap;
use crate::error::{ClientResult, PredictionError};

/// Filename prefix of per-submission temp files.
pub const TEMP_PREFIX: &str = "xray_";

/// Filename suffix of per-submission temp files.
pub const TEMP_SUFFIX: &str = ".jpg";

/// Guard owning a uniquely named JPEG file.
#[derive(Debug)]
pub struct TempJpeg {
    file: NamedTempFile,
    file_name: String,
}

impl TempJpeg {
    /// Encode `bitmap` at `quality` into a fresh temp file inside `dir`
    /// (the OS temp dir when `None`).
    ///
    /// Blocking; call from a blocking context.
    pub fn encode(bitmap: &Bitmap, quality: u8, dir: Option<&Path>) -> ClientResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX).suffix(TEMP_SUFFIX);

        let file = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| PredictionError::encode(e.to_string()))?;

        let rgb = bitmap.as_image().to_rgb8();
        {
            let mut writer = BufWriter::new(file.as_file());
            JpegEncoder::new_with_quality(&mut writer, quality)
                .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
                .map_err(|e| PredictionError::encode(format!("JPEG encoding failed: {}", e)))?;
            writer
                .flush()
                .map_err(|e| PredictionError::encode(e.to_string()))?;
        }

        let file_name = file
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| PredictionError::encode("temp file has no name"))?;

        debug!(path = %file.path().display(), quality, "Wrote temp JPEG");
        Ok(Self { file, file_name })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Base name of the file, used as the multipart filename.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Read the encoded bytes back for upload.
    pub async fn read(&self) -> ClientResult<Vec<u8>> {
        tokio::fs::read(self.path())
            .await
            .map_err(|e| PredictionError::encode(format!("cannot read temp file: {}", e)))
    }

    /// Delete the file now, reporting failure instead of ignoring it.
    pub fn close(self) -> ClientResult<()> {
        let path: PathBuf = self.file.path().to_path_buf();
        self.file.close().map_err(|e| {
            warn!(path = %path.display(), error = %e, "Failed to remove temp JPEG");
            PredictionError::encode(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, ImageBuffer, Rgba};

    fn bitmap() -> Bitmap {
        let img = ImageBuffer::from_fn(20, 10, |x, _| Rgba([x as u8 * 12, 40, 90, 128]));
        Bitmap::from(DynamicImage::ImageRgba8(img))
    }

    #[test]
    fn test_encode_writes_decodable_jpeg() {
        let dir = tempfile::TempDir::new().unwrap();
        let jpeg = TempJpeg::encode(&bitmap(), 90, Some(dir.path())).unwrap();

        assert!(jpeg.file_name().starts_with(TEMP_PREFIX));
        assert!(jpeg.file_name().ends_with(TEMP_SUFFIX));
        assert_eq!(jpeg.path().parent(), Some(dir.path()));

        let bytes = std::fs::read(jpeg.path()).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8], "JPEG SOI marker");
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (20, 10));
    }

    #[test]
    fn test_drop_removes_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let jpeg = TempJpeg::encode(&bitmap(), 90, Some(dir.path())).unwrap();
        let path = jpeg.path().to_path_buf();
        assert!(path.exists());

        drop(jpeg);
        assert!(!path.exists());
    }

    #[test]
    fn test_unique_names() {
        let dir = tempfile::TempDir::new().unwrap();
        let a = TempJpeg::encode(&bitmap(), 90, Some(dir.path())).unwrap();
        let b = TempJpeg::encode(&bitmap(), 90, Some(dir.path())).unwrap();
        assert_ne!(a.path(), b.path());
        a.close().unwrap();
        b.close().unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_directory_is_encode_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        let result = TempJpeg::encode(&bitmap(), 90, Some(&missing));
        assert!(matches!(result, Err(PredictionError::Encode(_))));
    }

    #[tokio::test]
    async fn test_read_returns_file_contents() {
        let jpeg = TempJpeg::encode(&bitmap(), 50, None).unwrap();
        let bytes = jpeg.read().await.unwrap();
        assert_eq!(bytes, std::fs::read(jpeg.path()).unwrap());
    }
}
