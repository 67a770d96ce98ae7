use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::contract::DocumentType;

/// The structuring stage's own result, nested inside the outer envelope.
/// Inner success reflects structuring viability only; the outer flag covers
/// extraction and classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuringEnvelope {
    pub success: bool,
    pub data: Map<String, Value>,
    pub confidence: f64,
}

impl StructuringEnvelope {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            success: false,
            data: Map::new(),
            confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultData {
    pub document_type: DocumentType,
    pub data: StructuringEnvelope,
    pub processing_time_ms: u64,
}

/// The complete response envelope. Every pipeline outcome — including every
/// failure path — takes this shape; callers never see an opaque error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub success: bool,
    pub message: String,
    pub data: ResultData,
}

impl ProcessingResult {
    /// A failed pipeline run: unknown type, empty record, zero confidence.
    #[must_use]
    pub fn failure(message: impl Into<String>, processing_time_ms: u64) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: ResultData {
                document_type: DocumentType::Unknown,
                data: StructuringEnvelope::empty(),
                processing_time_ms,
            },
        }
    }

    /// A run where extraction and classification succeeded. The structuring
    /// envelope may itself carry `success=false`.
    #[must_use]
    pub fn completed(
        message: impl Into<String>,
        document_type: DocumentType,
        structuring: StructuringEnvelope,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: ResultData {
                document_type,
                data: structuring,
                processing_time_ms,
            },
        }
    }

    pub fn confidence(&self) -> f64 {
        self.data.data.confidence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_envelope_invariants() {
        let result = ProcessingResult::failure("Não foi possível extrair texto", 12);

        assert!(!result.success);
        assert_eq!(result.data.document_type, DocumentType::Unknown);
        assert!(result.data.data.data.is_empty());
        assert!(result.confidence().abs() < f64::EPSILON);
        assert_eq!(result.data.processing_time_ms, 12);
    }

    #[test]
    fn test_envelope_wire_shape() {
        let mut fields = Map::new();
        fields.insert("nome".into(), Value::String("Maria".into()));

        let result = ProcessingResult::completed(
            "Documento processado com sucesso",
            DocumentType::Cnh,
            StructuringEnvelope {
                success: true,
                data: fields,
                confidence: 1.0,
            },
            87,
        );

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["document_type"], "CNH");
        assert_eq!(json["data"]["data"]["success"], true);
        assert_eq!(json["data"]["data"]["data"]["nome"], "Maria");
        assert_eq!(json["data"]["data"]["confidence"], 1.0);
        assert_eq!(json["data"]["processing_time_ms"], 87);
    }

    #[test]
    fn test_envelope_round_trips() {
        let result = ProcessingResult::failure("Arquivo vazio", 0);
        let json = serde_json::to_string(&result).unwrap();
        let parsed: ProcessingResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, parsed);
    }

    #[test]
    fn test_degraded_structuring_keeps_outer_success() {
        let result = ProcessingResult::completed(
            "Documento processado com sucesso",
            DocumentType::Cnpj,
            StructuringEnvelope::empty(),
            5,
        );

        assert!(result.success);
        assert!(!result.data.data.success);
    }
}
