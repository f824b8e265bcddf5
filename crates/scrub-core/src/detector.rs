//! Detector seam
//!
//! Detectors are opaque and unreliable: callers must treat every error as
//! scoped to the text that was passed in.

use async_trait::async_trait;

use crate::{Candidate, PiiSpan, Result};

/// What a detector found in a body of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// Spans with offsets into the text that was passed to `detect`
    Spans(Vec<PiiSpan>),
    /// Literal snippets that still need to be located in the text
    Candidates(Vec<Candidate>),
}

impl Detection {
    pub fn is_empty(&self) -> bool {
        match self {
            Detection::Spans(spans) => spans.is_empty(),
            Detection::Candidates(candidates) => candidates.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Detection::Spans(spans) => spans.len(),
            Detection::Candidates(candidates) => candidates.len(),
        }
    }
}

/// Trait for anything that proposes PII in free text
#[async_trait]
pub trait PiiDetector: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Propose PII found in `text`
    async fn detect(&self, text: &str) -> Result<Detection>;
}
