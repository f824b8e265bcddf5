use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use scrub_core::{Detection, PiiDetector, PiiSpan, Result};
use scrub_security::char_boundaries;

lazy_static! {
    // Every pattern runs; overlapping hits are resolved by the redaction engine
    static ref BUILTIN_PATTERNS: Vec<(&'static str, Regex)> = vec![
        (
            "email",
            Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap(),
        ),
        (
            "social_security_number",
            Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap(),
        ),
        (
            "credit_card_number",
            Regex::new(r"\b(?:\d{4}[ -]?){3}\d{4}\b").unwrap(),
        ),
        (
            "ip_address",
            Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").unwrap(),
        ),
        (
            "phone_number",
            Regex::new(r"(?:\+\d{1,3}[ -]?)?(?:\(\d{3}\)|\b\d{3})[ -]\d{3}-\d{4}\b").unwrap(),
        ),
    ];
}

/// Regex-based detector for well-formed identifiers.
///
/// Finds structured PII only (emails, phone numbers, SSNs, card numbers,
/// IPv4 addresses); names and addresses need an [`crate::LlmDetector`].
pub struct PatternDetector {
    patterns: Vec<(String, Regex)>,
}

impl PatternDetector {
    pub fn new() -> Self {
        Self {
            patterns: BUILTIN_PATTERNS
                .iter()
                .map(|(label, re)| (label.to_string(), re.clone()))
                .collect(),
        }
    }

    /// Add a custom pattern after the built-in ones
    pub fn with_pattern(mut self, label: impl Into<String>, pattern: Regex) -> Self {
        self.patterns.push((label.into(), pattern));
        self
    }

    /// Synchronous core of [`PiiDetector::detect`]
    pub fn find(&self, text: &str) -> Vec<PiiSpan> {
        let boundaries = char_boundaries(text);
        let to_char = |byte: usize| boundaries.binary_search(&byte).unwrap_or_else(|i| i);

        let mut spans = Vec::new();
        for (label, pattern) in &self.patterns {
            for m in pattern.find_iter(text) {
                spans.push(PiiSpan::new(to_char(m.start()), to_char(m.end()), label.clone()));
            }
        }
        spans
    }
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PiiDetector for PatternDetector {
    fn name(&self) -> &str {
        "pattern"
    }

    async fn detect(&self, text: &str) -> Result<Detection> {
        Ok(Detection::Spans(self.find(text)))
    }
}
