//! # LLaMAid Core
//!
//! Rule-based annotation and structuring of assistant responses for ambulance crews.
//!
//! This crate contains two pure components:
//! - the span annotator, which tags urgency keywords line by line (`annotate`)
//! - the scenario classifier, which reshapes a response into an SBAR case summary (`classify`)
//!
//! **No I/O concerns**: talking to the assistant, HTTP/gRPC servers and rendering belong in
//! `llamaid-assistant`, `api-rest`, `api-grpc` and `llamaid-cli`.

pub mod annotate;
pub mod config;
pub mod constants;
pub mod error;
pub mod keywords;
pub mod query;
pub mod sbar;
pub mod scenario;

pub use annotate::{annotate, AnnotatedLine, Annotator, OverlapPolicy, Segment};
pub use config::CoreConfig;
pub use constants::{FALLBACK_RESPONSE, PRESET_QUERIES};
pub use error::{CoreError, CoreResult};
pub use keywords::{KeywordTables, UrgencyCategory};
pub use sbar::CaseSummary;
pub use scenario::{classify, classify_with_scenario, Scenario};

/// Annotation and classification configured once at startup.
///
/// Cheap to clone and safe to share between request handlers; it holds no mutable state.
#[derive(Clone, Debug, Default)]
pub struct TextEngine {
    annotator: Annotator,
}

impl TextEngine {
    /// Build an engine from resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidPattern` if a configured keyword cannot be compiled.
    pub fn new(cfg: &CoreConfig) -> CoreResult<Self> {
        let annotator = Annotator::new(cfg.keyword_tables(), cfg.overlap_policy())?;
        tracing::debug!(
            "text engine ready (overlap policy: {})",
            cfg.overlap_policy().as_str()
        );
        Ok(Self { annotator })
    }

    pub fn annotate(&self, text: &str) -> Vec<AnnotatedLine> {
        self.annotator.annotate(text)
    }

    pub fn classify(&self, text: &str) -> (Scenario, CaseSummary) {
        let (scenario, summary) = classify_with_scenario(text);
        tracing::debug!("classified response as {}", scenario);
        (scenario, summary)
    }

    /// Classify `text` and render the summary in the SBAR export format.
    pub fn export_summary(&self, text: &str) -> String {
        self.classify(text).1.export()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_engine_matches_free_functions() {
        let engine = TextEngine::default();
        let text = "Patient has cardiac symptoms, monitor vitals.";
        assert_eq!(engine.annotate(text), annotate(text));
        assert_eq!(engine.classify(text).1, classify(text));
    }

    #[test]
    fn engine_honours_configured_tables() {
        let tables = KeywordTables {
            critical: vec!["stat".into()],
            caution: vec![],
            action: vec![],
        };
        let engine = TextEngine::new(&CoreConfig::new(OverlapPolicy::default(), tables)).unwrap();
        let lines = engine.annotate("Give it stat, monitor after.");
        let tagged: Vec<_> = lines[0].tagged().collect();
        assert_eq!(tagged, vec![("stat", UrgencyCategory::Critical)]);
    }

    #[test]
    fn export_summary_for_empty_text_is_generic() {
        let engine = TextEngine::default();
        let exported = engine.export_summary("");
        assert!(exported.starts_with(
            "SITUATION:\nPatient presenting with unspecified symptoms requiring assessment.\n\n"
        ));
        assert!(exported.contains("\n\nRECOMMENDATION:\nMonitor vital signs"));
    }
}
