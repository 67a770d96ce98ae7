use serde::{Deserialize, Serialize};

use crate::config::SignalConfig;

/// Which extraction path the document takes. Per-document: one untrusted
/// page sends every page through OCR for consistency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyVerdict {
    UseNative,
    UseOcr,
}

/// Why the verdict came out the way it did, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum VerdictReason {
    Trusted,
    TooShort { length: usize },
    PlaceholderSignature { phrase: String },
    /// Image uploads have no text layer to judge.
    ImageInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyDecision {
    pub verdict: StrategyVerdict,
    pub reason: VerdictReason,
}

impl StrategyDecision {
    #[must_use]
    pub fn image_input() -> Self {
        Self {
            verdict: StrategyVerdict::UseOcr,
            reason: VerdictReason::ImageInput,
        }
    }
}

/// Decides whether the embedded text layer can be trusted or the document
/// must be rasterized and OCR'd. Native extraction is fast and free but a
/// certificate-stamped scan often embeds only a signature stub string.
#[derive(Debug, Clone)]
pub struct SignalAnalyzer {
    min_native_len: usize,
    phrases: Vec<String>,
}

impl SignalAnalyzer {
    #[must_use]
    pub fn new(config: &SignalConfig) -> Self {
        Self {
            min_native_len: config.min_native_len,
            phrases: config
                .placeholder_phrases
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
        }
    }

    /// Applies the decision rule in order: length check first, then the
    /// placeholder-signature scan, then trust.
    pub fn decide(&self, native_text: &str) -> StrategyDecision {
        let trimmed = native_text.trim();

        if trimmed.chars().count() < self.min_native_len {
            return StrategyDecision {
                verdict: StrategyVerdict::UseOcr,
                reason: VerdictReason::TooShort {
                    length: trimmed.chars().count(),
                },
            };
        }

        let lowered = trimmed.to_lowercase();
        if let Some(phrase) = self.phrases.iter().find(|p| lowered.contains(p.as_str())) {
            return StrategyDecision {
                verdict: StrategyVerdict::UseOcr,
                reason: VerdictReason::PlaceholderSignature {
                    phrase: phrase.clone(),
                },
            };
        }

        StrategyDecision {
            verdict: StrategyVerdict::UseNative,
            reason: VerdictReason::Trusted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> SignalAnalyzer {
        SignalAnalyzer::new(&SignalConfig::default())
    }

    fn long_clean_text() -> String {
        "CERTIFICADO DE REGISTRO NACIONAL DE TRANSPORTADORES RODOVIÁRIOS \
         RNTRC 12345678 RAZÃO SOCIAL TRANSPORTES EXEMPLO LTDA"
            .to_string()
    }

    #[test]
    fn test_short_text_is_untrusted() {
        let decision = analyzer().decide("CRLV");
        assert_eq!(decision.verdict, StrategyVerdict::UseOcr);
        assert_eq!(decision.reason, VerdictReason::TooShort { length: 4 });
    }

    #[test]
    fn test_empty_text_is_untrusted() {
        let decision = analyzer().decide("");
        assert_eq!(decision.verdict, StrategyVerdict::UseOcr);
    }

    #[test]
    fn test_placeholder_phrase_overrides_length() {
        let text = format!("{} Assinado digitalmente por DETRAN-SC", long_clean_text());
        assert!(text.len() > 50);

        let decision = analyzer().decide(&text);
        assert_eq!(decision.verdict, StrategyVerdict::UseOcr);
        assert_eq!(
            decision.reason,
            VerdictReason::PlaceholderSignature {
                phrase: "assinado digitalmente".into()
            }
        );
    }

    #[test]
    fn test_placeholder_match_is_case_insensitive() {
        let text = format!("{} DOCUMENTO ASSINADO ELETRONICAMENTE", long_clean_text());
        let decision = analyzer().decide(&text);
        assert_eq!(decision.verdict, StrategyVerdict::UseOcr);
    }

    #[test]
    fn test_length_check_runs_before_phrase_scan() {
        // Shorter than the threshold AND carrying a phrase: the length rule
        // wins because it is evaluated first.
        let decision = analyzer().decide("assinado digitalmente");
        assert!(matches!(decision.reason, VerdictReason::TooShort { .. }));
    }

    #[test]
    fn test_long_clean_text_is_trusted() {
        let decision = analyzer().decide(&long_clean_text());
        assert_eq!(decision.verdict, StrategyVerdict::UseNative);
        assert_eq!(decision.reason, VerdictReason::Trusted);
    }

    #[test]
    fn test_threshold_boundary() {
        let analyzer = SignalAnalyzer::new(&SignalConfig {
            min_native_len: 5,
            ..Default::default()
        });

        assert_eq!(analyzer.decide("abcd").verdict, StrategyVerdict::UseOcr);
        assert_eq!(analyzer.decide("abcde").verdict, StrategyVerdict::UseNative);
    }
}
