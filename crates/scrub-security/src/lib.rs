//! Span location and span-based redaction
//!
//! Both halves work in char offsets; byte offsets never leave this crate.

pub mod locator;
pub mod redactor;

pub use locator::{locate, locate_json};
pub use redactor::{OverlapPolicy, Redaction, RedactionEngine};

/// Byte offset of every char boundary in `text`, including the end.
///
/// `boundaries[i]` is the byte offset of char `i`, so the returned vector
/// has `text.chars().count() + 1` entries.
pub fn char_boundaries(text: &str) -> Vec<usize> {
    let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    boundaries.push(text.len());
    boundaries
}
