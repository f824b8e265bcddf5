use async_trait::async_trait;
use scrub_core::{Candidate, CoreError, Detection, PiiDetector, PiiSpan, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::fence::strip_code_fence;

const DETECTION_PROMPT: &str = r#"You are a data privacy assistant. Identify all personally identifiable information (PII) in the user's text.

PII includes full names, email addresses, phone numbers, social security numbers, dates of birth, postal addresses, financial account and card numbers, IP addresses, and government-issued IDs (passport, driver's license).

Do NOT report: first names on their own, company or product names, dates that are not dates of birth.

Answer with a JSON array only, no prose:
[{"label": "email", "text": "john.smith@example.com"}]

- `label` is lowercase with underscores (email, phone_number, social_security_number, ...).
- `text` is the exact span as it appears in the input, including casing and spacing.
- Report every distinct span once; do not report overlapping spans."#;

/// Options for building an [`LlmDetector`]
#[derive(Debug, Clone)]
pub struct LlmDetectorOptions {
    /// OpenAI-compatible chat completions URL
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

/// Detector backed by a chat-completions model.
///
/// The model is asked for `{label, text}` snippets; offsets are resolved
/// later by the span locator. Replies carrying `{start, end, label}` objects
/// are accepted as spans.
pub struct LlmDetector {
    client: reqwest::Client,
    options: LlmDetectorOptions,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DetectedItem {
    Span(PiiSpan),
    Candidate(Candidate),
}

impl LlmDetector {
    pub fn new(options: LlmDetectorOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("scrub/1.0 (pii redaction)")
            .timeout(options.timeout)
            .build()
            .map_err(|e| {
                CoreError::DetectionFailure(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, options })
    }

    async fn complete(&self, text: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.options.model,
            "temperature": 0,
            "messages": [
                {"role": "system", "content": DETECTION_PROMPT},
                {"role": "user", "content": text},
            ],
        });

        let mut request = self.client.post(&self.options.endpoint).json(&body);
        if let Some(key) = &self.options.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CoreError::DetectionFailure(format!("model request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(CoreError::DetectionFailure(format!(
                "model endpoint returned HTTP {}",
                response.status().as_u16()
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| CoreError::DetectionFailure(format!("unreadable model reply: {}", e)))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| CoreError::DetectionFailure("model returned no content".to_string()))
    }
}

#[async_trait]
impl PiiDetector for LlmDetector {
    fn name(&self) -> &str {
        "llm"
    }

    async fn detect(&self, text: &str) -> Result<Detection> {
        debug!(
            "Asking {} for PII in {} chars",
            self.options.model,
            text.chars().count()
        );
        let reply = self.complete(text).await?;
        let detection = parse_detection(&reply)?;
        debug!("Model proposed {} items", detection.len());
        Ok(detection)
    }
}

/// Parse a model reply into a [`Detection`].
///
/// Accepts a JSON array (optionally inside a markdown code fence) of either
/// `{label, text}` snippets or `{start, end, label}` spans, not a mix.
pub fn parse_detection(reply: &str) -> Result<Detection> {
    let cleaned = strip_code_fence(reply);
    let items: Vec<DetectedItem> = serde_json::from_str(&cleaned).map_err(|e| {
        CoreError::DetectionFailure(format!("model output is not a PII list: {}", e))
    })?;

    let mut spans = Vec::new();
    let mut candidates = Vec::new();
    for item in items {
        match item {
            DetectedItem::Span(span) => spans.push(span),
            DetectedItem::Candidate(candidate) => candidates.push(candidate),
        }
    }

    match (spans.is_empty(), candidates.is_empty()) {
        (_, true) => Ok(Detection::Spans(spans)),
        (true, false) => Ok(Detection::Candidates(candidates)),
        (false, false) => Err(CoreError::DetectionFailure(
            "model output mixes spans and snippets".to_string(),
        )),
    }
}
