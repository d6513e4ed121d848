//! Extraction of the JSON object from a raw model response.
//!
//! Handles the usual ways a chat model wraps or mangles JSON: markdown code
//! fences, prose before/after the object, curly quotes and trailing commas.
//! Anything beyond that is reported as a parse error.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::RepairError;

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```(?:json)?\s*(.*?)\s*```").expect("valid fence regex"));

static TRAILING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("valid trailing-comma regex"));

/// Extract, repair and parse the JSON object in `raw`.
pub fn extract_value(raw: &str) -> Result<Value, RepairError> {
    if raw.trim().is_empty() {
        return Err(RepairError::EmptyInput);
    }

    let body = match FENCE_RE.captures(raw).and_then(|c| c.get(1)) {
        Some(fenced) => fenced.as_str(),
        None => raw,
    };

    let (Some(open), Some(close)) = (body.find('{'), body.rfind('}')) else {
        return Err(RepairError::NoJsonObjectFound);
    };
    if close < open {
        return Err(RepairError::NoJsonObjectFound);
    }

    let candidate = body[open..=close].replace(['\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'], "\"");
    let candidate = TRAILING_COMMA_RE.replace_all(&candidate, "$1");

    Ok(serde_json::from_str(&candidate)?)
}

/// As [`extract_value`], returning the canonical compact serialization.
pub fn extract_and_repair(raw: &str) -> Result<String, RepairError> {
    extract_value(raw).map(|v| v.to_string())
}
