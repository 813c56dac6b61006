use thiserror::Error;

/// Errors that can occur while building, sampling or summarizing a topic model
#[derive(Error, Debug)]
pub enum LdaError {
    #[error("Number of topics must be positive")]
    InvalidTopicCount,

    #[error("Invalid hyperparameter: {0}")]
    InvalidParameter(String),

    #[error("No stemmer available for language '{0}'")]
    UnsupportedLanguage(String),

    #[error("Entropy is undefined for an all-zero count vector")]
    DegenerateEntropy,

    #[error("Topic {topic} is out of range for a model with {num_topics} topics")]
    TopicOutOfRange { topic: usize, num_topics: usize },

    #[error("Topic summaries are not available before sampling has converged")]
    NotConverged,

    #[error("Count invariant violated: {0}")]
    InvariantViolation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LdaError>;
