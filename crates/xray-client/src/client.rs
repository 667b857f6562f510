//! Prediction service HTTP client.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::error::Category;
use tracing::{debug, info, info_span, warn, Instrument};
use url::Url;
use xray_models::{ErrorBody, HealthResponse, PredictionResult};

use crate::acquisition::{load_image, Bitmap, ImageSource};
use crate::config::PredictionClientConfig;
use crate::error::{ClientResult, PredictionError};
use crate::metrics::{record_health_check, record_prediction};
use crate::temp_jpeg::TempJpeg;

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

/// Media type of the uploaded part.
pub const JPEG_MIME: &str = "image/jpeg";

/// Client for the remote pneumonia prediction service.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    http: Client,
    config: PredictionClientConfig,
    predict_url: Url,
    health_url: Url,
}

impl PredictionClient {
    /// Create a new prediction client.
    pub fn new(config: PredictionClientConfig) -> ClientResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("xray-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(PredictionError::Transport)?;

        let predict_url = config.endpoint("predict")?;
        let health_url = config.endpoint("health")?;

        Ok(Self {
            http,
            config,
            predict_url,
            health_url,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(PredictionClientConfig::from_env()?)
    }

    pub fn config(&self) -> &PredictionClientConfig {
        &self.config
    }

    pub fn predict_url(&self) -> &Url {
        &self.predict_url
    }

    /// Check if the prediction service is healthy.
    pub async fn health_check(&self) -> ClientResult<bool> {
        let healthy = match self.http.get(self.health_url.clone()).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<HealthResponse>().await {
                    Ok(health) => health.is_healthy(),
                    Err(e) => {
                        warn!("Prediction service health response unreadable: {}", e);
                        false
                    }
                }
            }
            Ok(response) => {
                warn!("Prediction service health check failed: {}", response.status());
                false
            }
            Err(e) => {
                warn!("Prediction service health check error: {}", e);
                false
            }
        };

        record_health_check(healthy);
        Ok(healthy)
    }

    /// Read, decode and submit an image in one step.
    pub async fn predict_source(
        &self,
        source: impl Into<ImageSource>,
    ) -> ClientResult<PredictionResult> {
        let bitmap = load_image(source).await?;
        self.predict(&bitmap).await
    }

    /// Submit a decoded image and interpret the service's answer.
    ///
    /// The temp JPEG backing the upload lives only for the duration of this
    /// call and is removed on every exit path.
    pub async fn predict(&self, bitmap: &Bitmap) -> ClientResult<PredictionResult> {
        let span = info_span!(
            "prediction_request",
            url = %self.predict_url,
            width = bitmap.width(),
            height = bitmap.height()
        );

        let start = Instant::now();
        let result = self.submit(bitmap.clone()).instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        match &result {
            Ok(prediction) => {
                info!(
                    label = %prediction.label,
                    confidence = prediction.confidence,
                    latency_ms,
                    "Prediction received"
                );
                record_prediction("ok", latency_ms);
            }
            Err(e) => {
                warn!(error = %e, kind = e.kind(), latency_ms, "Prediction failed");
                record_prediction(e.kind(), latency_ms);
            }
        }

        result
    }

    async fn submit(&self, bitmap: Bitmap) -> ClientResult<PredictionResult> {
        let jpeg = self.encode_temp(bitmap).await?;
        let bytes = jpeg.read().await?;
        debug!(file = %jpeg.file_name(), bytes = bytes.len(), "Uploading image");

        let part = Part::bytes(bytes)
            .file_name(jpeg.file_name().to_string())
            .mime_str(JPEG_MIME)?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self
            .http
            .post(self.predict_url.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // The status alone classifies the failure; the body only adds detail
            let message = response
                .text()
                .await
                .ok()
                .and_then(|body| ErrorBody::message_from(&body));
            return Err(PredictionError::Server {
                status_code: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        drop(jpeg);
        parse_prediction(&body)
    }

    async fn encode_temp(&self, bitmap: Bitmap) -> ClientResult<TempJpeg> {
        let quality = self.config.jpeg_quality;
        let dir: Option<PathBuf> = self.config.temp_dir.clone();

        tokio::task::spawn_blocking(move || TempJpeg::encode(&bitmap, quality, dir.as_deref()))
            .await
            .map_err(|e| PredictionError::encode(format!("encode task failed: {}", e)))?
    }
}

/// Interpret a 2xx response body.
///
/// Empty or syntactically broken bodies count as "no response"; well-formed
/// JSON that does not match the schema is malformed.
pub fn parse_prediction(body: &str) -> ClientResult<PredictionResult> {
    if body.trim().is_empty() {
        return Err(PredictionError::EmptyResponse);
    }

    let prediction: PredictionResult = serde_json::from_str(body).map_err(|e| match e.classify() {
        Category::Data => PredictionError::malformed(e.to_string()),
        Category::Io | Category::Syntax | Category::Eof => PredictionError::EmptyResponse,
    })?;

    prediction
        .validate()
        .map_err(|e| PredictionError::malformed(e.to_string()))?;

    Ok(prediction)
}
