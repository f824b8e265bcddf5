use thiserror::Error;

use crate::PiiSpan;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Span [{start}, {end}) out of bounds for text of length {len}")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },

    #[error("Overlapping spans: {first} and {second}")]
    OverlappingSpans { first: PiiSpan, second: PiiSpan },

    #[error("Unsupported redaction strategy: {0}")]
    UnsupportedStrategy(String),

    #[error("PII detection failed: {0}")]
    DetectionFailure(String),

    #[error("Connector failure: {0}")]
    ConnectorFailure(String),

    #[error("Unknown source: {0}")]
    UnknownSource(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
