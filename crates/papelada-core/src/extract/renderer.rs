use pdfium_render::prelude::*;
use thiserror::Error;

use crate::document::{MediaType, RawDocument};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF rendering backend unavailable: {0}")]
    Backend(String),
    #[error("Falha ao abrir PDF para renderização: {0}")]
    LoadFailed(String),
    #[error("Falha ao renderizar página {page}: {message}")]
    PageFailed { page: u32, message: String },
    #[error("Falha ao codificar imagem da página {page}: {message}")]
    EncodeFailed { page: u32, message: String },
    #[error("Renderização não suportada para {0:?}")]
    UnsupportedMedia(MediaType),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// PDF user-space units per inch.
const PDF_POINTS_PER_INCH: f32 = 72.0;

/// One rasterized page, PNG-encoded, ready for the OCR collaborator.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub page: u32,
    pub png: Vec<u8>,
}

/// Rasterizes document pages when the native text layer is untrusted.
#[async_trait::async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render_pages(&self, document: &RawDocument, dpi: u32) -> RenderResult<Vec<PageImage>>;
}

/// Production renderer backed by pdfium.
pub struct PdfiumRenderer;

impl PdfiumRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Renders only the first page, at preview resolution.
    pub fn render_preview(&self, bytes: &[u8], dpi: u32) -> RenderResult<Vec<u8>> {
        let mut pages = render_range(bytes, dpi, Some(1))?;
        pages
            .pop()
            .map(|p| p.png)
            .ok_or_else(|| RenderError::LoadFailed("PDF não contém páginas".to_string()))
    }
}

impl Default for PdfiumRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PageRenderer for PdfiumRenderer {
    async fn render_pages(&self, document: &RawDocument, dpi: u32) -> RenderResult<Vec<PageImage>> {
        if document.media_type != MediaType::Pdf {
            return Err(RenderError::UnsupportedMedia(document.media_type));
        }
        render_range(&document.bytes, dpi, None)
    }
}

fn render_range(bytes: &[u8], dpi: u32, max_pages: Option<usize>) -> RenderResult<Vec<PageImage>> {
    let bindings =
        Pdfium::bind_to_system_library().map_err(|e| RenderError::Backend(e.to_string()))?;
    let pdfium = Pdfium::new(bindings);

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| RenderError::LoadFailed(e.to_string()))?;

    let scale = dpi as f32 / PDF_POINTS_PER_INCH;
    let config = PdfRenderConfig::new().scale_page_by_factor(scale);

    let mut images = Vec::new();
    for (index, page) in document.pages().iter().enumerate() {
        if let Some(max) = max_pages {
            if index >= max {
                break;
            }
        }
        let page_number = index as u32 + 1;

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| RenderError::PageFailed {
                page: page_number,
                message: e.to_string(),
            })?;

        let mut png = Vec::new();
        bitmap
            .as_image()
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| RenderError::EncodeFailed {
                page: page_number,
                message: e.to_string(),
            })?;

        images.push(PageImage {
            page: page_number,
            png,
        });
    }

    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_image_media() {
        let document = RawDocument::new(vec![0u8; 200], MediaType::Jpeg);
        let result = PdfiumRenderer::new().render_pages(&document, 400).await;
        assert!(matches!(result, Err(RenderError::UnsupportedMedia(_))));
    }
}
