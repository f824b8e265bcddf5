//! Span-based redaction engine
//!
//! Spans are validated against the untouched input, then spliced from the
//! highest start offset to the lowest, so a replacement never shifts the
//! offsets of a span that has not been processed yet.

use scrub_core::{CoreError, PiiSpan, Result, Strategy};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::char_boundaries;

/// What to do when two spans cover the same chars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Keep the longest span of each overlapping group, drop the rest
    #[default]
    KeepLongest,
    /// Fail the whole call with `OverlappingSpans`
    Reject,
}

/// Output of one redaction call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redaction {
    /// The rewritten text
    #[serde(rename = "body")]
    pub text: String,
    /// Spans that were applied, in original-text offsets, ascending by start
    #[serde(rename = "entities")]
    pub applied: Vec<PiiSpan>,
}

#[derive(Debug, Clone, Default)]
pub struct RedactionEngine {
    overlap: OverlapPolicy,
}

impl RedactionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overlap_policy(overlap: OverlapPolicy) -> Self {
        Self { overlap }
    }

    pub fn overlap_policy(&self) -> OverlapPolicy {
        self.overlap
    }

    /// Rewrite every span of `text` according to `strategy`
    pub fn redact(&self, text: &str, spans: &[PiiSpan], strategy: Strategy) -> Result<Redaction> {
        let boundaries = char_boundaries(text);
        let len = boundaries.len() - 1;

        for span in spans {
            if span.start >= span.end || span.end > len {
                return Err(CoreError::SpanOutOfBounds {
                    start: span.start,
                    end: span.end,
                    len,
                });
            }
        }

        let applied = self.resolve_overlaps(spans)?;

        let mut result = text.to_string();
        for span in applied.iter().rev() {
            let (from, to) = (boundaries[span.start], boundaries[span.end]);
            let replacement = replacement(strategy, &span.label, &result[from..to]);
            result.replace_range(from..to, &replacement);
        }

        Ok(Redaction {
            text: result,
            applied,
        })
    }

    /// Sort, dedupe and de-overlap spans into ascending, disjoint order
    fn resolve_overlaps(&self, spans: &[PiiSpan]) -> Result<Vec<PiiSpan>> {
        let mut ordered: Vec<PiiSpan> = spans.to_vec();
        ordered.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then(b.end.cmp(&a.end))
                .then(a.label.cmp(&b.label))
        });
        ordered.dedup();

        match self.overlap {
            OverlapPolicy::Reject => {
                for pair in ordered.windows(2) {
                    if pair[0].overlaps(&pair[1]) {
                        return Err(CoreError::OverlappingSpans {
                            first: pair[0].clone(),
                            second: pair[1].clone(),
                        });
                    }
                }
                Ok(ordered)
            }
            OverlapPolicy::KeepLongest => {
                // Longest first; earlier start wins between equal lengths.
                let mut by_length: Vec<&PiiSpan> = ordered.iter().collect();
                by_length.sort_by(|a, b| b.len().cmp(&a.len()).then(a.start.cmp(&b.start)));

                let mut kept: Vec<PiiSpan> = Vec::with_capacity(ordered.len());
                for span in by_length {
                    if let Some(winner) = kept.iter().find(|k| k.overlaps(span)) {
                        tracing::debug!("Dropping span {} overlapped by {}", span, winner);
                        continue;
                    }
                    kept.push(span.clone());
                }

                kept.sort_by(|a, b| a.start.cmp(&b.start));
                Ok(kept)
            }
        }
    }
}

fn replacement(strategy: Strategy, label: &str, matched: &str) -> String {
    match strategy {
        Strategy::Mask => "*".repeat(matched.chars().count()),
        Strategy::Tokenize => format!("{{{{{}:{}}}}}", label, token(matched)),
        Strategy::Hash => format!("{{{{{}:{}}}}}", label, digest(matched)),
    }
}

/// First 8 hex chars of the SHA-1 of `matched`
pub fn token(matched: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(matched.as_bytes());
    let mut hex = hex::encode(hasher.finalize());
    hex.truncate(8);
    hex
}

/// Full hex SHA-256 of `matched`
pub fn digest(matched: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(matched.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> RedactionEngine {
        RedactionEngine::new()
    }

    #[test]
    fn test_mask_phone() {
        let result = engine()
            .redact("call 555-1234", &[PiiSpan::new(5, 13, "phone")], Strategy::Mask)
            .unwrap();

        assert_eq!(result.text, "call ********");
        assert_eq!(result.applied, vec![PiiSpan::new(5, 13, "phone")]);
    }

    #[test]
    fn test_tokenize_is_deterministic() {
        let spans = [PiiSpan::new(0, 7, "email")];

        let first = engine().redact("a@b.com", &spans, Strategy::Tokenize).unwrap();
        let second = engine().redact("a@b.com", &spans, Strategy::Tokenize).unwrap();

        assert_eq!(first.text, "{{email:1022b0c3}}");
        assert_eq!(first.text, format!("{{{{email:{}}}}}", token("a@b.com")));
        assert_eq!(first, second);
    }

    #[test]
    fn test_hash_uses_full_sha256() {
        let result = engine()
            .redact("a@b.com", &[PiiSpan::new(0, 7, "email")], Strategy::Hash)
            .unwrap();

        assert_eq!(
            result.text,
            "{{email:fb98d44ad7501a959f3f4f4a3f004fe2d9e581ea6207e218c4b02c08a4d75adf}}"
        );
    }

    #[test]
    fn test_multiple_spans_keep_original_offsets() {
        let text = "Contact John Smith at john.smith@example.com.";
        let spans = [PiiSpan::new(8, 18, "name"), PiiSpan::new(22, 44, "email")];

        let result = engine().redact(text, &spans, Strategy::Tokenize).unwrap();

        assert_eq!(
            result.text,
            format!(
                "Contact {{{{name:{}}}}} at {{{{email:fda41864}}}}.",
                token("John Smith")
            )
        );
        assert_eq!(result.applied, spans.to_vec());
    }

    #[test]
    fn test_mask_preserves_length() {
        let text = "Name: Emily Johnson\nEmail: emily.j@example.co.uk\nDOB: 1988-11-02";
        let spans = [
            PiiSpan::new(6, 19, "name"),
            PiiSpan::new(27, 48, "email"),
            PiiSpan::new(54, 64, "date_of_birth"),
        ];

        let result = engine().redact(text, &spans, Strategy::Mask).unwrap();

        assert_eq!(result.text.chars().count(), text.chars().count());
        assert_eq!(
            result.text,
            "Name: *************\nEmail: *********************\nDOB: **********"
        );
    }

    #[test]
    fn test_span_order_does_not_matter() {
        let text = "Alice (alice@example.com) called +1-202-555-0183";
        let spans = vec![
            PiiSpan::new(0, 5, "name"),
            PiiSpan::new(7, 24, "email"),
            PiiSpan::new(33, 48, "phone_number"),
        ];
        let mut shuffled = spans.clone();
        shuffled.reverse();
        shuffled.swap(0, 1);

        let a = engine().redact(text, &spans, Strategy::Hash).unwrap();
        let b = engine().redact(text, &shuffled, Strategy::Hash).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let err = engine()
            .redact("short", &[PiiSpan::new(2, 9, "name")], Strategy::Mask)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::SpanOutOfBounds {
                start: 2,
                end: 9,
                len: 5
            }
        ));
    }

    #[test]
    fn test_empty_or_inverted_span_rejected() {
        for span in [PiiSpan::new(3, 3, "x"), PiiSpan::new(4, 2, "x")] {
            let err = engine().redact("abcdef", &[span], Strategy::Mask).unwrap_err();
            assert!(matches!(err, CoreError::SpanOutOfBounds { .. }));
        }
    }

    #[test]
    fn test_multibyte_offsets() {
        let text = "Zoë à zoe@x.io";
        let result = engine()
            .redact(
                text,
                &[PiiSpan::new(0, 3, "name"), PiiSpan::new(6, 14, "email")],
                Strategy::Mask,
            )
            .unwrap();

        assert_eq!(result.text, "*** à ********");
    }

    #[test]
    fn test_no_spans_returns_input() {
        let result = engine().redact("nothing here", &[], Strategy::Hash).unwrap();
        assert_eq!(result.text, "nothing here");
        assert!(result.applied.is_empty());
    }

    #[test]
    fn test_duplicate_spans_collapse() {
        let span = PiiSpan::new(0, 3, "name");
        let result = engine()
            .redact("Bob here", &[span.clone(), span.clone()], Strategy::Tokenize)
            .unwrap();

        assert_eq!(result.applied, vec![span]);
        assert_eq!(result.text, format!("{{{{name:{}}}}} here", token("Bob")));
    }

    #[test]
    fn test_keep_longest_drops_nested_span() {
        let text = "Ship to John Doe, 742 Evergreen Terrace";
        let spans = [
            PiiSpan::new(8, 16, "name"),
            PiiSpan::new(8, 39, "full_address"),
            PiiSpan::new(18, 21, "street_number"),
        ];

        let result = engine().redact(text, &spans, Strategy::Tokenize).unwrap();

        assert_eq!(result.applied, vec![PiiSpan::new(8, 39, "full_address")]);
        assert_eq!(
            result.text,
            format!("Ship to {{{{full_address:{}}}}}", token(&text[8..39]))
        );
    }

    #[test]
    fn test_keep_longest_partial_overlap() {
        let spans = [PiiSpan::new(0, 4, "a"), PiiSpan::new(2, 10, "b")];
        let result = engine().redact("0123456789xy", &spans, Strategy::Mask).unwrap();

        assert_eq!(result.applied, vec![PiiSpan::new(2, 10, "b")]);
        assert_eq!(result.text, "01********xy");
    }

    #[test]
    fn test_reject_policy() {
        let engine = RedactionEngine::with_overlap_policy(OverlapPolicy::Reject);
        let spans = [PiiSpan::new(0, 8, "name"), PiiSpan::new(4, 8, "surname")];

        let err = engine.redact("John Doe", &spans, Strategy::Mask).unwrap_err();
        assert!(matches!(err, CoreError::OverlappingSpans { .. }));

        // Adjacent spans do not overlap
        let ok = engine
            .redact(
                "John Doe",
                &[PiiSpan::new(0, 4, "first"), PiiSpan::new(4, 8, "rest")],
                Strategy::Mask,
            )
            .unwrap();
        assert_eq!(ok.text, "********");
    }

    #[test]
    fn test_redaction_json_field_names() {
        let result = engine()
            .redact("call 555-1234", &[PiiSpan::new(5, 13, "phone")], Strategy::Mask)
            .unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["body"], "call ********");
        assert_eq!(json["entities"][0]["label"], "phone");
    }
}
