//! Span locator: turns detector snippets into absolute spans

use regex::Regex;
use scrub_core::{Candidate, CoreError, PiiSpan, Result};

use crate::char_boundaries;

/// Find every literal occurrence of each candidate snippet in `text`.
///
/// Matching is exact and case-sensitive; occurrences of one snippet never
/// overlap each other. Candidates with an empty snippet are skipped. Spans
/// come out in candidate order, then occurrence order, and may overlap
/// across candidates.
pub fn locate(text: &str, candidates: &[Candidate]) -> Result<Vec<PiiSpan>> {
    let boundaries = char_boundaries(text);
    let mut spans = Vec::new();

    for candidate in candidates {
        if candidate.text.is_empty() {
            continue;
        }
        if candidate.label.trim().is_empty() {
            return Err(CoreError::InvalidInput(format!(
                "candidate {:?} has an empty label",
                candidate.text
            )));
        }

        let pattern = Regex::new(&regex::escape(&candidate.text)).map_err(|e| {
            CoreError::InvalidInput(format!("cannot match snippet {:?}: {}", candidate.text, e))
        })?;

        for m in pattern.find_iter(text) {
            spans.push(PiiSpan::new(
                char_index(&boundaries, m.start()),
                char_index(&boundaries, m.end()),
                candidate.label.clone(),
            ));
        }
    }

    Ok(spans)
}

/// Like [`locate`], but takes the candidate list as raw JSON.
///
/// The payload must be an array of `{"label": .., "text": ..}` objects.
pub fn locate_json(text: &str, candidates: &serde_json::Value) -> Result<Vec<PiiSpan>> {
    if !candidates.is_array() {
        return Err(CoreError::InvalidInput(
            "candidates must be a JSON array".to_string(),
        ));
    }

    let candidates: Vec<Candidate> = serde_json::from_value(candidates.clone())
        .map_err(|e| CoreError::InvalidInput(format!("malformed candidate list: {}", e)))?;

    locate(text, &candidates)
}

// Matches always start and end on char boundaries.
fn char_index(boundaries: &[usize], byte_offset: usize) -> usize {
    boundaries
        .binary_search(&byte_offset)
        .unwrap_or_else(|insert_at| insert_at)
}
