use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LdaError, Result};

/// Settings for a topic model run.
///
/// Keys deserialize in camelCase, so a settings object such as
/// `{"numberTopics": 5, "sweeps": 200, "stem": true}` loads directly.
/// Missing keys fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LdaConfig {
    pub number_topics: usize,
    pub sweeps: usize,
    pub language: String,
    pub stem: bool,
    pub displaying_stop_words: bool,
    pub document_topic_smoothing: f64,  // alpha
    pub topic_word_smoothing: f64,      // beta
    pub doc_sort_smoothing: f64,
    pub seed: Option<u64>,
}

impl Default for LdaConfig {
    fn default() -> Self {
        LdaConfig {
            number_topics: 10,
            sweeps: 500,
            language: "en".to_string(),
            stem: false,
            displaying_stop_words: false,
            document_topic_smoothing: 0.1,
            topic_word_smoothing: 0.01,
            doc_sort_smoothing: 10.0,
            seed: None,
        }
    }
}

impl LdaConfig {
    /// Create a configuration with the given number of topics
    pub fn new(number_topics: usize) -> Self {
        Self {
            number_topics,
            ..Default::default()
        }
    }

    pub fn sweeps(mut self, sweeps: usize) -> Self {
        self.sweeps = sweeps;
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn stem(mut self, stem: bool) -> Self {
        self.stem = stem;
        self
    }

    pub fn displaying_stop_words(mut self, show: bool) -> Self {
        self.displaying_stop_words = show;
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.document_topic_smoothing = alpha;
        self
    }

    pub fn beta(mut self, beta: f64) -> Self {
        self.topic_word_smoothing = beta;
        self
    }

    pub fn doc_sort_smoothing(mut self, smoothing: f64) -> Self {
        self.doc_sort_smoothing = smoothing;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Reject settings the sampler cannot run with.
    ///
    /// Zero sweeps is allowed: the model then summarizes its random
    /// initialization straight away.
    pub fn validate(&self) -> Result<()> {
        if self.number_topics == 0 {
            return Err(LdaError::InvalidTopicCount);
        }
        let smoothing = [
            ("documentTopicSmoothing", self.document_topic_smoothing),
            ("topicWordSmoothing", self.topic_word_smoothing),
            ("docSortSmoothing", self.doc_sort_smoothing),
        ];
        for (name, value) in smoothing {
            if !(value.is_finite() && value > 0.0) {
                return Err(LdaError::InvalidParameter(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LdaConfig::default();
        assert_eq!(config.number_topics, 10);
        assert_eq!(config.sweeps, 500);
        assert_eq!(config.language, "en");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_camel_case_settings() {
        let config = LdaConfig::from_json_str(
            r#"{"numberTopics": 3, "sweeps": 20, "stem": true, "displayingStopWords": true}"#,
        )
        .unwrap();
        assert_eq!(config.number_topics, 3);
        assert_eq!(config.sweeps, 20);
        assert!(config.stem);
        assert!(config.displaying_stop_words);
        assert_eq!(config.topic_word_smoothing, 0.01);
    }

    #[test]
    fn test_negative_sweeps_rejected_by_parser() {
        assert!(LdaConfig::from_json_str(r#"{"sweeps": -1}"#).is_err());
    }

    #[test]
    fn test_validate() {
        assert!(matches!(
            LdaConfig::new(0).validate(),
            Err(LdaError::InvalidTopicCount)
        ));
        assert!(matches!(
            LdaConfig::new(2).beta(0.0).validate(),
            Err(LdaError::InvalidParameter(_))
        ));
        assert!(matches!(
            LdaConfig::new(2).alpha(f64::NAN).validate(),
            Err(LdaError::InvalidParameter(_))
        ));
        assert!(LdaConfig::new(2).sweeps(0).validate().is_ok());
    }
}
