//! Prompt construction and structured-output parsing.
//!
//! The system instruction is fixed for every call; the user message
//! embeds the model name, field name, and sampled values as JSON. The
//! classifier is instructed to answer with a single JSON object matching
//! `{pattern: string|null, format?: <closed set>, description: string}`.

use serde_json::json;

use super::error::{ClassifierError, ClassifierResult};
use crate::models::PatternInference;

/// Fixed system instruction sent with every classification request.
pub const SYSTEM_INSTRUCTION: &str = "\
You are a data pattern analyst. You are given sample values from one \
column of a relational database together with its model and field name. \
Determine whether the values follow a recognizable format or a common \
regular expression pattern.

Respond with a single JSON object and nothing else, using this shape:
{\"pattern\": <regex string or null>, \"format\": <optional, one of: \
email, uuid, cuid, url, ipv4, ipv6, date, datetime, phone, hex>, \
\"description\": <one short sentence>}

Rules:
- \"pattern\" must be a valid regular expression that matches every \
sample value, or null if no meaningful pattern exists.
- Omit \"format\" unless the values clearly match one of the listed \
formats.
- Do not invent constraints the samples do not support.";

/// Builds the user message embedding the field sample.
pub fn build_user_message(model_name: &str, field_name: &str, values: &[String]) -> String {
    json!({
        "model": model_name,
        "field": field_name,
        "values": values,
    })
    .to_string()
}

/// Parses raw classifier output into a [`PatternInference`].
///
/// Tolerates a fenced code block around the JSON object, since chat
/// models frequently wrap structured output that way. Anything that does
/// not deserialize against the expected shape is a parse error; the
/// closed `format` set is enforced during deserialization.
pub fn parse_response(raw: &str) -> ClassifierResult<PatternInference> {
    let text = strip_code_fences(raw);
    if text.is_empty() {
        return Err(ClassifierError::Parse("empty response".to_string()));
    }

    let inference: PatternInference = serde_json::from_str(text)?;
    Ok(inference)
}

/// Removes a surrounding Markdown code fence, if present.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the fence line
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_end()
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}
