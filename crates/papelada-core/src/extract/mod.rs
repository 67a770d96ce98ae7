pub mod renderer;
pub mod signal;
pub mod text_layer;

use serde::{Deserialize, Serialize};

use crate::document::{ExtractionAttempt, TextSource};
use self::signal::StrategyDecision;

/// The text the pipeline settled on for one document, with the attempts
/// that produced it. Lives for a single processing invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub attempts: Vec<ExtractionAttempt>,
    pub source: TextSource,
    pub decision: StrategyDecision,
    /// Set when a failed OCR attempt forced a fallback to native text that
    /// the strategy had already rejected.
    pub degraded: bool,
}

impl ExtractionOutcome {
    #[must_use]
    pub fn new(attempts: Vec<ExtractionAttempt>, source: TextSource, decision: StrategyDecision) -> Self {
        Self {
            attempts,
            source,
            decision,
            degraded: false,
        }
    }

    #[must_use]
    pub fn degraded(mut self) -> Self {
        self.degraded = true;
        self
    }

    /// Concatenates page texts. Multi-page documents keep a page-boundary
    /// marker so downstream field extraction can disambiguate continuations.
    pub fn full_text(&self) -> String {
        if self.attempts.len() == 1 {
            return self.attempts[0].text.clone();
        }

        let mut parts = Vec::new();
        for attempt in &self.attempts {
            if !attempt.text.trim().is_empty() {
                parts.push(format!("=== PÁGINA {} ===\n{}\n", attempt.page, attempt.text));
            }
        }
        parts.join("\n")
    }

    pub fn page_count(&self) -> usize {
        self.attempts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::signal::{StrategyVerdict, VerdictReason};

    fn trusted() -> StrategyDecision {
        StrategyDecision {
            verdict: StrategyVerdict::UseNative,
            reason: VerdictReason::Trusted,
        }
    }

    #[test]
    fn test_single_page_text_has_no_marker() {
        let outcome = ExtractionOutcome::new(
            vec![ExtractionAttempt::native(1, "RNTRC 123456".into())],
            TextSource::Native,
            trusted(),
        );
        assert_eq!(outcome.full_text(), "RNTRC 123456");
    }

    #[test]
    fn test_multi_page_text_keeps_page_markers() {
        let outcome = ExtractionOutcome::new(
            vec![
                ExtractionAttempt::native(1, "Rua das Flores".into()),
                ExtractionAttempt::native(2, "Bairro Centro".into()),
            ],
            TextSource::Native,
            trusted(),
        );

        let text = outcome.full_text();
        assert!(text.contains("=== PÁGINA 1 ==="));
        assert!(text.contains("=== PÁGINA 2 ==="));
        assert!(text.contains("Rua das Flores"));
    }

    #[test]
    fn test_blank_pages_are_skipped_in_concatenation() {
        let outcome = ExtractionOutcome::new(
            vec![
                ExtractionAttempt::native(1, "conteúdo".into()),
                ExtractionAttempt::native(2, "   ".into()),
            ],
            TextSource::Native,
            trusted(),
        );

        let text = outcome.full_text();
        assert!(text.contains("=== PÁGINA 1 ==="));
        assert!(!text.contains("=== PÁGINA 2 ==="));
    }

    #[test]
    fn test_degraded_flag() {
        let outcome = ExtractionOutcome::new(vec![], TextSource::Native, trusted()).degraded();
        assert!(outcome.degraded);
    }
}
