//! Shared fixtures for client integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Luma};
use serde_json::{json, Value};
use wiremock::MockServer;
use xray_client::{decode_bytes, Bitmap, PredictionClient, PredictionClientConfig};

/// A small grayscale "X-ray" encoded as PNG.
pub fn xray_png() -> Vec<u8> {
    let img = ImageBuffer::from_fn(32, 32, |x, y| Luma([((x + y) * 4) as u8]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(img)
        .write_to(&mut buf, ImageOutputFormat::Png)
        .unwrap();
    buf.into_inner()
}

pub fn xray_bitmap() -> Bitmap {
    decode_bytes(&xray_png()).unwrap()
}

pub fn pneumonia_body() -> Value {
    json!({
        "prediction": "Pneumonia",
        "confidence": 0.87,
        "probability": 0.87
    })
}

/// Client pointed at `server` that writes its temp files into `temp_dir`.
pub fn client_for(server: &MockServer, temp_dir: &Path) -> PredictionClient {
    let config = PredictionClientConfig {
        temp_dir: Some(temp_dir.to_path_buf()),
        ..PredictionClientConfig::with_base_url(server.uri())
    };
    PredictionClient::new(config).unwrap()
}

/// Number of entries left in a temp directory.
pub fn leftover_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
