use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::OcrConfig;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Invalid OCR endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("OCR request timed out")]
    Timeout,
    #[error("OCR HTTP error: {0}")]
    Http(reqwest::Error),
    #[error("OCR service error: {status}: {body}")]
    Service { status: u16, body: String },
    #[error("OCR response missing recognized text")]
    InvalidResponse,
    #[error("Imagem muito grande para OCR: {bytes} bytes (máximo {max})")]
    ImageTooLarge { bytes: usize, max: usize },
}

pub type OcrResult<T> = Result<T, OcrError>;

impl From<reqwest::Error> for OcrError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(e)
        }
    }
}

/// External OCR collaborator: one rasterized page in, recognized text out.
/// May fail or time out; the pipeline treats both as recoverable.
#[async_trait::async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> OcrResult<String>;
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    text: Option<String>,
}

/// HTTP client for the OCR collaborator. Blocking-async with an explicit
/// timeout; never left to hang.
pub struct HttpOcrEngine {
    endpoint: Url,
    client: Client,
    max_image_bytes: usize,
}

impl HttpOcrEngine {
    pub fn new(config: &OcrConfig) -> OcrResult<Self> {
        let endpoint = Url::parse(&config.endpoint)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .build()?;

        Ok(Self {
            endpoint,
            client,
            max_image_bytes: config.max_image_bytes,
        })
    }
}

#[async_trait::async_trait]
impl OcrEngine for HttpOcrEngine {
    async fn recognize(&self, image: &[u8]) -> OcrResult<String> {
        if image.len() > self.max_image_bytes {
            return Err(OcrError::ImageTooLarge {
                bytes: image.len(),
                max: self.max_image_bytes,
            });
        }

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .body(image.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OcrResponse = response.json().await?;
        let text = parsed.text.ok_or(OcrError::InvalidResponse)?;

        tracing::debug!(chars = text.len(), "OCR recognized text");
        Ok(text)
    }
}
