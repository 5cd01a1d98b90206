//! Typed errors that callers branch on. Everything else travels as `anyhow::Error`.

use std::fmt;
use thiserror::Error;

/// Pipeline stage that can abort a single comment's analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Translation,
    Sentiment,
    Emotion,
    Keywords,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Translation => "translation",
            Stage::Sentiment => "sentiment",
            Stage::Emotion => "emotion",
            Stage::Keywords => "keywords",
        };
        f.write_str(name)
    }
}

/// One comment could not be analyzed. The comment stays unprocessed and is retried on the next run.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct AnalysisFailure {
    pub stage: Stage,
    #[source]
    pub source: anyhow::Error,
}

impl AnalysisFailure {
    pub fn new(stage: Stage, source: anyhow::Error) -> Self {
        Self { stage, source }
    }
}

/// Startup configuration problems. Never retried.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_names_the_stage() {
        let err = AnalysisFailure::new(Stage::Emotion, anyhow::anyhow!("model offline"));
        assert_eq!(err.to_string(), "emotion stage failed: model offline");
    }
}
