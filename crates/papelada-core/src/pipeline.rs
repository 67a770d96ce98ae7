use std::time::Instant;

use crate::classify::DocumentClassifier;
use crate::config::PipelineConfig;
use crate::contract::ContractRegistry;
use crate::document::{ExtractionAttempt, RawDocument, TextSource};
use crate::envelope::{ProcessingResult, StructuringEnvelope};
use crate::extract::renderer::{PageRenderer, PdfiumRenderer};
use crate::extract::signal::{SignalAnalyzer, StrategyDecision, StrategyVerdict};
use crate::extract::text_layer::{validate_pdf, LopdfTextExtractor, TextExtractor};
use crate::extract::ExtractionOutcome;
use crate::ocr::OcrEngine;
use crate::score::ConfidenceScorer;
use crate::structure::model::ModelClient;
use crate::structure::StructuringEngine;

/// The full document pipeline: text layer → strategy decision → (render →
/// OCR) → classification → structuring → scoring → envelope. Strictly
/// sequential per document; collaborators are injected so tests can
/// substitute deterministic stubs. Holds no cross-request state.
pub struct DocumentPipeline {
    config: PipelineConfig,
    analyzer: SignalAnalyzer,
    text_extractor: Box<dyn TextExtractor>,
    renderer: Box<dyn PageRenderer>,
    ocr: Box<dyn OcrEngine>,
    classifier: DocumentClassifier,
    contracts: ContractRegistry,
    structuring: StructuringEngine,
    scorer: ConfidenceScorer,
}

impl DocumentPipeline {
    #[must_use]
    pub fn new(
        config: PipelineConfig,
        ocr: Box<dyn OcrEngine>,
        model: Box<dyn ModelClient>,
    ) -> Self {
        let analyzer = SignalAnalyzer::new(&config.signal);
        let classifier = DocumentClassifier::new(config.classifier.min_score);
        let scorer = ConfidenceScorer::new(&config.scoring);

        Self {
            analyzer,
            text_extractor: Box::new(LopdfTextExtractor::new()),
            renderer: Box::new(PdfiumRenderer::new()),
            ocr,
            classifier,
            contracts: ContractRegistry::new(),
            structuring: StructuringEngine::new(model),
            scorer,
            config,
        }
    }

    #[must_use]
    pub fn with_text_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        self.text_extractor = extractor;
        self
    }

    #[must_use]
    pub fn with_renderer(mut self, renderer: Box<dyn PageRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    #[must_use]
    pub fn with_contracts(mut self, contracts: ContractRegistry) -> Self {
        self.contracts = contracts;
        self
    }

    /// Runs one document through the pipeline. Never fails outright: every
    /// outcome, including every error path, is a well-formed envelope.
    pub async fn process(&self, document: &RawDocument, hint: Option<&str>) -> ProcessingResult {
        let start = Instant::now();
        tracing::info!(
            id = %document.id,
            media = ?document.media_type,
            bytes = document.len(),
            "processing document"
        );

        if document.is_empty() {
            return ProcessingResult::failure("Arquivo vazio", elapsed_ms(start));
        }

        let outcome = match self.extract(document).await {
            Ok(outcome) => outcome,
            Err(message) => {
                tracing::warn!(id = %document.id, %message, "extraction failed");
                return ProcessingResult::failure(message, elapsed_ms(start));
            }
        };

        let text = outcome.full_text();
        if text.trim().is_empty() {
            return ProcessingResult::failure(
                "Não foi possível extrair texto do documento",
                elapsed_ms(start),
            );
        }

        let classification = self.classifier.classify(&text, hint);
        tracing::info!(
            id = %document.id,
            doc_type = %classification.doc_type,
            hinted = classification.hinted,
            source = ?outcome.source,
            "document classified"
        );

        let contract = self.contracts.contract(classification.doc_type);
        let structuring = self
            .structuring
            .structure(&text, classification.doc_type, contract)
            .await;

        let confidence = self.scorer.score(
            &structuring.record,
            contract,
            outcome.degraded,
            structuring.certainty,
        );

        ProcessingResult::completed(
            "Documento processado com sucesso",
            classification.doc_type,
            StructuringEnvelope {
                success: structuring.success,
                data: structuring.record.fields,
                confidence,
            },
            elapsed_ms(start),
        )
    }

    /// Picks the extraction strategy and produces the document's final text.
    /// Errors here are terminal extraction failures; OCR trouble is not —
    /// it degrades to the native text instead.
    async fn extract(&self, document: &RawDocument) -> Result<ExtractionOutcome, String> {
        if document.media_type.is_image() {
            return match self.ocr.recognize(&document.bytes).await {
                Ok(text) => Ok(ExtractionOutcome::new(
                    vec![ExtractionAttempt {
                        page: 1,
                        source: TextSource::Ocr,
                        text,
                        dpi: None,
                    }],
                    TextSource::Ocr,
                    StrategyDecision::image_input(),
                )),
                Err(e) => Err(format!("Falha na extração de texto da imagem: {e}")),
            };
        }

        validate_pdf(&document.bytes).map_err(|e| format!("PDF inválido: {e}"))?;

        let pages = self
            .text_extractor
            .extract_pages(document)
            .await
            .map_err(|e| format!("Falha na extração de texto: {e}"))?;

        let native_concat = pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let decision = self.analyzer.decide(&native_concat);

        let native_attempts: Vec<ExtractionAttempt> = pages
            .iter()
            .map(|p| ExtractionAttempt::native(p.page, p.text.clone()))
            .collect();

        match decision.verdict {
            StrategyVerdict::UseNative => Ok(ExtractionOutcome::new(
                native_attempts,
                TextSource::Native,
                decision,
            )),
            StrategyVerdict::UseOcr => {
                tracing::info!(reason = ?decision.reason, "native text untrusted, applying OCR");
                match self.ocr_document(document).await {
                    Ok(attempts) => Ok(ExtractionOutcome::new(
                        attempts,
                        TextSource::Ocr,
                        decision,
                    )),
                    Err(e) => {
                        tracing::warn!(error = %e, "OCR attempt failed, falling back to native text");
                        Ok(ExtractionOutcome::new(native_attempts, TextSource::Native, decision)
                            .degraded())
                    }
                }
            }
        }
    }

    /// Rasterizes every page and OCRs them in order. Any page failure fails
    /// the whole attempt, keeping native and OCR text from mixing.
    async fn ocr_document(&self, document: &RawDocument) -> Result<Vec<ExtractionAttempt>, String> {
        let images = self
            .renderer
            .render_pages(document, self.config.ocr.dpi)
            .await
            .map_err(|e| e.to_string())?;

        let mut attempts = Vec::new();
        for image in images {
            let text = self
                .ocr
                .recognize(&image.png)
                .await
                .map_err(|e| e.to_string())?;
            attempts.push(ExtractionAttempt::ocr(image.page, text, self.config.ocr.dpi));
        }
        Ok(attempts)
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MediaType;
    use crate::ocr::{OcrError, OcrResult};
    use crate::structure::model::{ModelResponse, ModelResult};

    struct FixedOcr(String);

    #[async_trait::async_trait]
    impl crate::ocr::OcrEngine for FixedOcr {
        async fn recognize(&self, _image: &[u8]) -> OcrResult<String> {
            Ok(self.0.clone())
        }
    }

    struct FailingOcr;

    #[async_trait::async_trait]
    impl crate::ocr::OcrEngine for FailingOcr {
        async fn recognize(&self, _image: &[u8]) -> OcrResult<String> {
            Err(OcrError::Timeout)
        }
    }

    struct FixedModel(String);

    #[async_trait::async_trait]
    impl ModelClient for FixedModel {
        async fn complete(&self, _system: &str, _user: &str) -> ModelResult<ModelResponse> {
            Ok(ModelResponse::new(self.0.clone()))
        }
    }

    fn pipeline_with(ocr: Box<dyn OcrEngine>, model_json: &str) -> DocumentPipeline {
        DocumentPipeline::new(
            PipelineConfig::default(),
            ocr,
            Box::new(FixedModel(model_json.to_string())),
        )
    }

    #[tokio::test]
    async fn test_empty_document_fails_with_envelope() {
        let pipeline = pipeline_with(Box::new(FixedOcr(String::new())), "{}");
        let document = RawDocument::new(Vec::new(), MediaType::Pdf);

        let result = pipeline.process(&document, None).await;

        assert!(!result.success);
        assert_eq!(result.message, "Arquivo vazio");
        assert!(result.confidence().abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_garbage_pdf_fails_with_envelope() {
        let pipeline = pipeline_with(Box::new(FixedOcr(String::new())), "{}");
        let document = RawDocument::new(vec![b'x'; 500], MediaType::Pdf);

        let result = pipeline.process(&document, None).await;

        assert!(!result.success);
        assert!(result.message.starts_with("PDF inválido"));
    }

    #[tokio::test]
    async fn test_image_input_goes_straight_to_ocr() {
        let ocr_text = "Fatura de energia elétrica consumo 250 kWh leitura anterior 4521";
        let residence_json = r#"{
            "tipo_conta": "ENERGIA",
            "emissor": {"nome_empresa": "Celesc"},
            "fatura": {"valor_total": 250.0},
            "titular": {"nome": "Maria"},
            "endereco_instalacao": {"cidade": "Florianópolis"},
            "leituras": {"consumo": "250"}
        }"#;
        let pipeline = pipeline_with(Box::new(FixedOcr(ocr_text.into())), residence_json);
        let document = RawDocument::new(vec![0u8; 64], MediaType::Png);

        let result = pipeline.process(&document, None).await;

        assert!(result.success);
        assert_eq!(result.data.document_type.wire_name(), "CONTA_ENERGIA");
        assert!(result.data.data.success);
    }

    #[tokio::test]
    async fn test_image_ocr_failure_is_extraction_failure() {
        let pipeline = pipeline_with(Box::new(FailingOcr), "{}");
        let document = RawDocument::new(vec![0u8; 64], MediaType::Jpeg);

        let result = pipeline.process(&document, None).await;

        assert!(!result.success);
        assert!(result.message.contains("imagem"));
    }
}
