pub mod model;
pub mod prompt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::contract::{ContractViolation, DocumentType, FieldContract};
use self::model::{ModelClient, ModelError};

/// Why one structuring attempt was rejected.
#[derive(Debug, Error)]
enum AttemptFailure {
    #[error("{0}")]
    Model(#[from] ModelError),
    #[error("Resposta do modelo não é JSON válido: {0}")]
    MalformedJson(String),
    #[error("Resposta do modelo não é um objeto JSON")]
    NotAnObject,
    #[error("{0}")]
    Contract(#[from] ContractViolation),
}

/// A record conforming to exactly one document type's field contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredRecord {
    pub document_type: DocumentType,
    pub fields: Map<String, Value>,
}

impl StructuredRecord {
    #[must_use]
    pub fn empty(document_type: DocumentType) -> Self {
        Self {
            document_type,
            fields: Map::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Result of the structuring stage. Failures stop here; they never raise
/// past this boundary.
#[derive(Debug, Clone)]
pub struct StructuringOutcome {
    pub success: bool,
    pub record: StructuredRecord,
    pub certainty: Option<f64>,
    pub attempts: usize,
    pub failure: Option<String>,
}

/// Maps free text into a type-specific contract via the language-model
/// collaborator, with a single bounded retry on malformed output.
pub struct StructuringEngine {
    model: Box<dyn ModelClient>,
    max_attempts: usize,
}

impl StructuringEngine {
    #[must_use]
    pub fn new(model: Box<dyn ModelClient>) -> Self {
        Self {
            model,
            max_attempts: 2,
        }
    }

    pub async fn structure(
        &self,
        text: &str,
        doc_type: DocumentType,
        contract: &FieldContract,
    ) -> StructuringOutcome {
        let user_prompt = prompt::prompt_for(doc_type, text);
        let mut last_failure = None;

        for attempt in 1..=self.max_attempts {
            match self.try_once(&user_prompt, contract).await {
                Ok((fields, certainty)) => {
                    tracing::debug!(%doc_type, attempt, "structuring succeeded");
                    return StructuringOutcome {
                        success: true,
                        record: StructuredRecord {
                            document_type: doc_type,
                            fields,
                        },
                        certainty,
                        attempts: attempt,
                        failure: None,
                    };
                }
                Err(failure) => {
                    tracing::warn!(%doc_type, attempt, error = %failure, "structuring attempt rejected");
                    last_failure = Some(failure.to_string());
                }
            }
        }

        StructuringOutcome {
            success: false,
            record: StructuredRecord::empty(doc_type),
            certainty: None,
            attempts: self.max_attempts,
            failure: last_failure,
        }
    }

    async fn try_once(
        &self,
        user_prompt: &str,
        contract: &FieldContract,
    ) -> Result<(Map<String, Value>, Option<f64>), AttemptFailure> {
        let response = self.model.complete(prompt::SYSTEM_PROMPT, user_prompt).await?;

        let cleaned = clean_json_response(&response.content);
        let value: Value = serde_json::from_str(&cleaned)
            .map_err(|e| AttemptFailure::MalformedJson(e.to_string()))?;

        let Value::Object(fields) = value else {
            return Err(AttemptFailure::NotAnObject);
        };

        contract.validate_keys(&fields)?;

        Ok((fields, response.certainty))
    }
}

/// Strips markdown fences and surrounding prose so only the JSON object
/// remains. Models occasionally wrap output despite the prompt rules.
fn clean_json_response(content: &str) -> String {
    let mut content = content.trim();

    if let Some(start) = content.find("```json") {
        let after = &content[start + 7..];
        if let Some(end) = after.find("```") {
            content = after[..end].trim();
        }
    } else if let Some(start) = content.find("```") {
        let after = &content[start + 3..];
        if let Some(end) = after.find("```") {
            content = after[..end].trim();
        }
    }

    match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if end > start => content[start..=end].to_string(),
        _ => content.to_string(),
    }
}
