use thiserror::Error;

/// Errors raised by the estimators themselves.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimatorError {
    #[error("window of {needed} samples requested but only {available} available")]
    InsufficientSamples { needed: usize, available: usize },
}

/// Errors raised while fetching or decoding run records.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Query service returned status {0}")]
    Status(u16),

    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
