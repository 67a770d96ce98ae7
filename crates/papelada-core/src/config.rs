use serde::{Deserialize, Serialize};
use url::Url;

/// Thresholds driving the extraction-strategy decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Minimum length of the concatenated native text before it is trusted.
    pub min_native_len: usize,
    /// Case-insensitive phrases that mark a placeholder-signature text layer
    /// (a "digitally signed" stub standing in for the visual content).
    pub placeholder_phrases: Vec<String>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            min_native_len: 50,
            placeholder_phrases: vec![
                "assinado digitalmente".to_string(),
                "assinado eletronicamente".to_string(),
                "documento assinado".to_string(),
                "verificador de autenticidade".to_string(),
            ],
        }
    }
}

/// OCR collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Endpoint receiving a rasterized page and returning recognized text.
    pub endpoint: String,
    /// Request timeout in seconds; a timeout is recoverable (native fallback).
    pub timeout_seconds: u32,
    /// Rasterization resolution. High enough that small print (plate
    /// numbers, CPF digits) stays legible to the OCR engine.
    pub dpi: u32,
    /// Largest page image the OCR collaborator accepts.
    pub max_image_bytes: usize,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8500/ocr".to_string(),
            timeout_seconds: 30,
            dpi: 400,
            max_image_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Language-model collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Chat-completions endpoint.
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Request timeout in seconds; a timeout consumes the bounded retry.
    pub timeout_seconds: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            max_tokens: 1500,
            temperature: 0.1,
            timeout_seconds: 30,
        }
    }
}

/// Classifier tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Minimum keyword score a type must reach; below it the document
    /// classifies as UNKNOWN.
    pub min_score: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { min_score: 2 }
    }
}

/// Confidence scoring tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Multiplier applied when extraction fell back from a failed OCR
    /// attempt to untrusted native text.
    pub fallback_penalty: f64,
    /// Model self-reported certainty below this floor applies the penalty.
    pub certainty_floor: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            fallback_penalty: 0.8,
            certainty_floor: 0.5,
        }
    }
}

/// Top-level pipeline configuration. No component mutates it during
/// processing; one instance serves any number of sequential documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub signal: SignalConfig,
    pub ocr: OcrConfig,
    pub model: ModelConfig,
    pub classifier: ClassifierConfig,
    pub scoring: ScoringConfig,
}

impl PipelineConfig {
    /// Reads collaborator settings from the environment, falling back to
    /// defaults. `OPENAI_API_KEY` carries the model credential.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                config.model.api_key = Some(key);
            }
        }
        if let Ok(endpoint) = std::env::var("PAPELADA_MODEL_URL") {
            config.model.endpoint = endpoint;
        }
        if let Ok(model) = std::env::var("PAPELADA_MODEL") {
            config.model.model = model;
        }
        if let Ok(endpoint) = std::env::var("PAPELADA_OCR_URL") {
            config.ocr.endpoint = endpoint;
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.ocr.endpoint).map_err(|source| ConfigError::InvalidEndpoint {
            which: "ocr",
            source,
        })?;
        Url::parse(&self.model.endpoint).map_err(|source| ConfigError::InvalidEndpoint {
            which: "model",
            source,
        })?;

        if self.signal.min_native_len == 0 {
            return Err(ConfigError::ZeroTrustThreshold);
        }
        if !(0.0..=1.0).contains(&self.scoring.fallback_penalty) {
            return Err(ConfigError::PenaltyOutOfRange(self.scoring.fallback_penalty));
        }
        if !(0.0..=1.0).contains(&self.scoring.certainty_floor) {
            return Err(ConfigError::PenaltyOutOfRange(self.scoring.certainty_floor));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {which} endpoint: {source}")]
    InvalidEndpoint {
        which: &'static str,
        source: url::ParseError,
    },
    #[error("Minimum trusted text length must be greater than zero")]
    ZeroTrustThreshold,
    #[error("Penalty factor out of [0, 1] range: {0}")]
    PenaltyOutOfRange(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.signal.min_native_len, 50);
        assert_eq!(config.ocr.dpi, 400);
        assert_eq!(config.model.max_tokens, 1500);
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let config = PipelineConfig {
            ocr: OcrConfig {
                endpoint: "not a url".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidEndpoint { which: "ocr", .. })
        ));
    }

    #[test]
    fn test_penalty_out_of_range_rejected() {
        let config = PipelineConfig {
            scoring: ScoringConfig {
                fallback_penalty: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PenaltyOutOfRange(_))
        ));
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let config = PipelineConfig {
            signal: SignalConfig {
                min_native_len: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTrustThreshold)));
    }

    #[test]
    fn test_config_serialization() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: PipelineConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.signal.min_native_len, parsed.signal.min_native_len);
        assert_eq!(config.ocr.endpoint, parsed.ocr.endpoint);
    }
}
