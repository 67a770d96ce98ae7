use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Media types accepted at the upload boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Pdf,
    Png,
    Jpeg,
}

impl MediaType {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/pdf" => Some(Self::Pdf),
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Png | Self::Jpeg)
    }
}

/// A document as received at the upload boundary. Immutable once built;
/// discarded when the pipeline invocation completes.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub id: Uuid,
    pub bytes: Vec<u8>,
    pub media_type: MediaType,
    pub received_at: DateTime<Utc>,
}

impl RawDocument {
    #[must_use]
    pub fn new(bytes: Vec<u8>, media_type: MediaType) -> Self {
        Self {
            id: Uuid::now_v7(),
            bytes,
            media_type,
            received_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Where the text of an extraction attempt came from. OCR fully replaces a
/// rejected native attempt for a page; the two are never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    Native,
    Ocr,
}

/// Native text pulled from a single page's embedded text layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    pub page: u32,
    pub text: String,
}

impl PageText {
    #[must_use]
    pub fn new(page: u32, text: String) -> Self {
        Self { page, text }
    }
}

/// One extraction attempt for one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionAttempt {
    pub page: u32,
    pub source: TextSource,
    pub text: String,
    /// Rendering resolution, set only when the page was rasterized for OCR.
    pub dpi: Option<u32>,
}

impl ExtractionAttempt {
    #[must_use]
    pub fn native(page: u32, text: String) -> Self {
        Self {
            page,
            source: TextSource::Native,
            text,
            dpi: None,
        }
    }

    #[must_use]
    pub fn ocr(page: u32, text: String, dpi: u32) -> Self {
        Self {
            page,
            source: TextSource::Ocr,
            text,
            dpi: Some(dpi),
        }
    }
}
