//! PII detectors
//!
//! - `PatternDetector`: offline regex detector, returns offsets
//! - `LlmDetector`: chat-completions model, returns literal snippets

pub mod fence;
pub mod llm;
pub mod pattern;

pub use fence::strip_code_fence;
pub use llm::{LlmDetector, LlmDetectorOptions, parse_detection};
pub use pattern::PatternDetector;
