use serde::{Deserialize, Serialize};
use std::fmt;

/// A labelled region of text identified as PII.
///
/// Offsets count chars (Unicode scalar values), are 0-based and end-exclusive,
/// and are only meaningful against the exact text they were computed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PiiSpan {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

impl PiiSpan {
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    /// Number of chars covered by the span
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the two half-open ranges share at least one char
    pub fn overlaps(&self, other: &PiiSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for PiiSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}, {})", self.label, self.start, self.end)
    }
}

/// A literal snippet proposed by a detector, not yet located in the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub label: String,
    #[serde(default)]
    pub text: String,
}

impl Candidate {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}
