use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref FENCE: Regex = Regex::new(r"^```(?:json)?\s*|\s*```$").unwrap();
}

/// Remove a markdown code fence wrapped around a model reply.
///
/// Models often answer with ```` ```json ... ``` ```` even when told not to.
pub fn strip_code_fence(text: &str) -> String {
    FENCE.replace_all(text.trim(), "").to_string()
}
