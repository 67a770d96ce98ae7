use serde_json::Value;

use crate::config::ScoringConfig;
use crate::contract::FieldContract;
use crate::structure::StructuredRecord;

/// Completeness/quality score for a structured record relative to its
/// type's contract. Not a statistical probability.
pub struct ConfidenceScorer {
    fallback_penalty: f64,
    certainty_floor: f64,
}

impl ConfidenceScorer {
    #[must_use]
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            fallback_penalty: config.fallback_penalty,
            certainty_floor: config.certainty_floor,
        }
    }

    /// Base score is the fraction of required fields present and non-empty;
    /// a contract with no required fields scores on whether anything at all
    /// was extracted. A degraded extraction (native fallback after a failed
    /// OCR attempt) or a sub-floor model certainty scales the score down.
    pub fn score(
        &self,
        record: &StructuredRecord,
        contract: &FieldContract,
        degraded: bool,
        certainty: Option<f64>,
    ) -> f64 {
        let required_total = contract.required_count();

        let base = if required_total == 0 {
            let any_filled = record.fields.values().any(|v| !is_empty_value(v));
            if any_filled {
                1.0
            } else {
                0.0
            }
        } else {
            let present = contract
                .required_names()
                .filter(|name| {
                    record
                        .fields
                        .get(*name)
                        .is_some_and(|v| !is_empty_value(v))
                })
                .count();
            present as f64 / required_total as f64
        };

        let mut score = base;
        if degraded {
            score *= self.fallback_penalty;
        }
        if let Some(certainty) = certainty {
            if certainty < self.certainty_floor {
                score *= self.fallback_penalty;
            }
        }

        score.clamp(0.0, 1.0)
    }
}

/// Null, blank strings, and empty containers all count as "not extracted".
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ContractRegistry, DocumentType};
    use serde_json::json;

    fn record_with(doc_type: DocumentType, value: serde_json::Value) -> StructuredRecord {
        match value {
            Value::Object(fields) => StructuredRecord {
                document_type: doc_type,
                fields,
            },
            _ => panic!("expected object"),
        }
    }

    fn scorer() -> ConfidenceScorer {
        ConfidenceScorer::new(&ScoringConfig::default())
    }

    #[test]
    fn test_all_required_fields_present_scores_one() {
        let registry = ContractRegistry::new();
        let record = record_with(
            DocumentType::Cnh,
            json!({"nome": "Maria da Silva", "cpf": "123.456.789-00", "categoria": "AB"}),
        );

        let score = scorer().score(&record, registry.contract(DocumentType::Cnh), false, None);
        assert!((score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_score_is_monotonic_in_required_completeness() {
        let registry = ContractRegistry::new();
        let contract = registry.contract(DocumentType::Cnh);

        let none = record_with(DocumentType::Cnh, json!({}));
        let one = record_with(DocumentType::Cnh, json!({"nome": "Maria"}));
        let two = record_with(DocumentType::Cnh, json!({"nome": "Maria", "cpf": "123"}));
        let three = record_with(
            DocumentType::Cnh,
            json!({"nome": "Maria", "cpf": "123", "categoria": "B"}),
        );

        let scores: Vec<f64> = [none, one, two, three]
            .iter()
            .map(|r| scorer().score(r, contract, false, None))
            .collect();

        for pair in scores.windows(2) {
            assert!(pair[0] <= pair[1], "score decreased: {scores:?}");
        }
        assert!((scores[1] - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_values_do_not_count_as_present() {
        let registry = ContractRegistry::new();
        let record = record_with(
            DocumentType::Cnh,
            json!({"nome": "  ", "cpf": null, "categoria": "B"}),
        );

        let score = scorer().score(&record, registry.contract(DocumentType::Cnh), false, None);
        assert!((score - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_degraded_extraction_applies_penalty() {
        let registry = ContractRegistry::new();
        let record = record_with(
            DocumentType::Cnh,
            json!({"nome": "Maria", "cpf": "123", "categoria": "B"}),
        );

        let score = scorer().score(&record, registry.contract(DocumentType::Cnh), true, None);
        assert!((score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_low_certainty_applies_penalty() {
        let registry = ContractRegistry::new();
        let record = record_with(
            DocumentType::Cnh,
            json!({"nome": "Maria", "cpf": "123", "categoria": "B"}),
        );
        let contract = registry.contract(DocumentType::Cnh);

        let low = scorer().score(&record, contract, false, Some(0.3));
        assert!((low - 0.8).abs() < 1e-9);

        let high = scorer().score(&record, contract, false, Some(0.9));
        assert!((high - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_penalties_stack() {
        let registry = ContractRegistry::new();
        let record = record_with(
            DocumentType::Cnh,
            json!({"nome": "Maria", "cpf": "123", "categoria": "B"}),
        );

        let score = scorer().score(&record, registry.contract(DocumentType::Cnh), true, Some(0.1));
        assert!((score - 0.64).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_type_scores_on_any_extraction() {
        let registry = ContractRegistry::new();
        let contract = registry.contract(DocumentType::Unknown);

        let empty = record_with(DocumentType::Unknown, json!({"nome": null, "endereco": ""}));
        assert!(scorer().score(&empty, contract, false, None).abs() < f64::EPSILON);

        let filled = record_with(DocumentType::Unknown, json!({"nome": "Maria"}));
        assert!((scorer().score(&filled, contract, false, None) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_score_stays_in_unit_interval() {
        let registry = ContractRegistry::new();
        let record = record_with(
            DocumentType::Cnh,
            json!({"nome": "Maria", "cpf": "123", "categoria": "B"}),
        );

        let score = scorer().score(&record, registry.contract(DocumentType::Cnh), true, Some(0.0));
        assert!((0.0..=1.0).contains(&score));
    }
}
