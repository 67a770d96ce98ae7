pub mod classify;
pub mod config;
pub mod contract;
pub mod document;
pub mod envelope;
pub mod extract;
pub mod ocr;
pub mod pipeline;
pub mod score;
pub mod structure;

pub use classify::{Classification, DocumentClassifier};
pub use config::{
    ClassifierConfig, ConfigError, ModelConfig, OcrConfig, PipelineConfig, ScoringConfig,
    SignalConfig,
};
pub use contract::{
    ContractRegistry, ContractViolation, DocumentType, FieldContract, FieldSpec,
};
pub use document::{ExtractionAttempt, MediaType, PageText, RawDocument, TextSource};
pub use envelope::{ProcessingResult, ResultData, StructuringEnvelope};
pub use extract::renderer::{PageImage, PageRenderer, PdfiumRenderer, RenderError, RenderResult};
pub use extract::signal::{SignalAnalyzer, StrategyDecision, StrategyVerdict, VerdictReason};
pub use extract::text_layer::{
    document_info, validate_pdf, DocumentInfo, ExtractError, ExtractResult, LopdfTextExtractor,
    TextExtractor,
};
pub use extract::ExtractionOutcome;
pub use ocr::{HttpOcrEngine, OcrEngine, OcrError, OcrResult};
pub use pipeline::DocumentPipeline;
pub use score::ConfidenceScorer;
pub use structure::model::{
    ModelClient, ModelError, ModelResponse, ModelResult, OpenAiModelClient, TokenUsage,
};
pub use structure::{StructuredRecord, StructuringEngine, StructuringOutcome};
