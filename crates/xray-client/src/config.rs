//! Prediction client configuration.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{ClientResult, PredictionError};

/// Default service location (the Flask service listens on port 5000).
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// JPEG quality used when re-encoding the image for upload.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Configuration for the prediction client.
#[derive(Debug, Clone)]
pub struct PredictionClientConfig {
    /// Base URL of the prediction service
    pub base_url: String,
    /// Whole-request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// JPEG quality (1-100) of the uploaded image
    pub jpeg_quality: u8,
    /// Directory for per-submission temp files (OS temp dir when unset)
    pub temp_dir: Option<PathBuf>,
}

impl Default for PredictionClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            temp_dir: None,
        }
    }
}

impl PredictionClientConfig {
    /// Config pointing at `base_url` with every other value defaulted.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        let config = Self {
            base_url: std::env::var("XRAY_API_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(
                std::env::var("XRAY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            connect_timeout: Duration::from_secs(
                std::env::var("XRAY_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
            jpeg_quality: std::env::var("XRAY_JPEG_QUALITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_JPEG_QUALITY),
            temp_dir: std::env::var("XRAY_TEMP_DIR")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the client cannot work with.
    pub fn validate(&self) -> ClientResult<()> {
        self.api_base()?;

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(PredictionError::invalid_config(format!(
                "jpeg quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        if self.timeout.is_zero() {
            return Err(PredictionError::invalid_config("timeout must be non-zero"));
        }
        if self.connect_timeout.is_zero() {
            return Err(PredictionError::invalid_config(
                "connect timeout must be non-zero",
            ));
        }
        Ok(())
    }

    /// Base URL normalized so relative endpoint paths resolve beneath it.
    pub fn api_base(&self) -> ClientResult<Url> {
        let raw = self.base_url.trim();
        if raw.is_empty() {
            return Err(PredictionError::invalid_config("base URL cannot be empty"));
        }

        let mut url = Url::parse(raw).map_err(|e| {
            PredictionError::invalid_config(format!("invalid base URL '{}': {}", raw, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(PredictionError::invalid_config(format!(
                "base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// Resolve an endpoint path such as `predict` against the base URL.
    pub fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.api_base()?
            .join(path)
            .map_err(|e| PredictionError::invalid_config(format!("invalid endpoint '{}': {}", path, e)))
    }
}
