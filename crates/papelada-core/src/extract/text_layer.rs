use lopdf::Document;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::{MediaType, PageText, RawDocument};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Arquivo muito pequeno para ser um PDF ({0} bytes)")]
    TooSmall(usize),
    #[error("Arquivo não possui header PDF válido")]
    NotPdf,
    #[error("PDF protegido por senha")]
    Encrypted,
    #[error("PDF não contém páginas")]
    NoPages,
    #[error("Falha ao abrir PDF: {0}")]
    Parse(#[from] lopdf::Error),
    #[error("Extração de texto não suportada para {0:?}")]
    UnsupportedMedia(MediaType),
}

pub type ExtractResult<T> = Result<T, ExtractError>;

/// Minimum plausible size for a PDF payload.
const MIN_PDF_BYTES: usize = 100;

/// Pulls embedded text from a document without rendering it. The seam lets
/// tests substitute a deterministic extractor.
#[async_trait::async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_pages(&self, document: &RawDocument) -> ExtractResult<Vec<PageText>>;
}

/// Basic facts about a PDF payload, surfaced for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub page_count: u32,
    pub encrypted: bool,
    pub file_size: usize,
}

/// Native text layer extraction backed by lopdf.
pub struct LopdfTextExtractor;

impl LopdfTextExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for LopdfTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TextExtractor for LopdfTextExtractor {
    async fn extract_pages(&self, document: &RawDocument) -> ExtractResult<Vec<PageText>> {
        if document.media_type != MediaType::Pdf {
            return Err(ExtractError::UnsupportedMedia(document.media_type));
        }

        let doc = open_document(&document.bytes)?;
        let mut pages = Vec::new();

        for page_number in doc.get_pages().keys() {
            let text = match doc.extract_text(&[*page_number]) {
                Ok(text) => text,
                Err(e) => {
                    // A scanned page without a text layer is normal, not an
                    // extraction failure; it just yields no native text.
                    tracing::debug!(page = *page_number, error = %e, "no extractable text layer");
                    String::new()
                }
            };
            pages.push(PageText::new(*page_number, text));
        }

        Ok(pages)
    }
}

/// Validates that a payload is an openable, unencrypted PDF with at least
/// one page.
pub fn validate_pdf(bytes: &[u8]) -> ExtractResult<()> {
    open_document(bytes).map(|_| ())
}

/// Page count and protection status for a PDF payload. Unlike
/// [`validate_pdf`] this reports encryption instead of rejecting it.
pub fn document_info(bytes: &[u8]) -> ExtractResult<DocumentInfo> {
    let doc = load_document(bytes)?;
    Ok(DocumentInfo {
        page_count: doc.get_pages().len() as u32,
        encrypted: doc.trailer.get(b"Encrypt").is_ok(),
        file_size: bytes.len(),
    })
}

fn load_document(bytes: &[u8]) -> ExtractResult<Document> {
    if bytes.len() < MIN_PDF_BYTES {
        return Err(ExtractError::TooSmall(bytes.len()));
    }
    if !bytes.starts_with(b"%PDF-") {
        return Err(ExtractError::NotPdf);
    }
    Ok(Document::load_mem(bytes)?)
}

fn open_document(bytes: &[u8]) -> ExtractResult<Document> {
    let doc = load_document(bytes)?;

    if doc.trailer.get(b"Encrypt").is_ok() {
        return Err(ExtractError::Encrypted);
    }
    if doc.get_pages().is_empty() {
        return Err(ExtractError::NoPages);
    }

    Ok(doc)
}
