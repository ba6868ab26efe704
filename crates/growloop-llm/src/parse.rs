//! Helpers for structured (JSON) completions.
//!
//! Models frequently wrap JSON in a markdown code fence even when asked not
//! to; both fenced and bare payloads must parse identically.

use serde::de::DeserializeOwned;

use crate::LlmError;

/// Strip a leading/trailing markdown code fence (```json ... ```), if present.
#[must_use]
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json") up to the first newline.
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };

    body.trim_end().trim_end_matches("```").trim()
}

/// Parse a completion into a typed value, tolerating a code fence.
///
/// # Errors
///
/// Returns [`LlmError::Parse`] when the payload is not valid JSON for `T`.
pub fn parse_json_response<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let payload = strip_code_fence(text);
    serde_json::from_str(payload).map_err(|e| LlmError::Parse(e.to_string()))
}
