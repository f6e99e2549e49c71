//! Model Output Extractor
//!
//! Gets a JSON object out of the chat completion text. Tries a direct parse,
//! then a parse of the sanitized text, then one regex fallback that pulls the
//! outermost `{...}` span out of whatever surrounds it.

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

use super::sanitize::sanitize_response;
use crate::error::{InvoiceError, InvoiceResult};

/// Which stage produced the parsed value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExtractionMethod {
    Direct,
    Sanitized,
    Fallback,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Sanitized => "sanitized",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub value: Value,
    pub method: ExtractionMethod,
}

fn object_span() -> &'static Regex {
    static OBJECT_SPAN: OnceLock<Regex> = OnceLock::new();
    OBJECT_SPAN.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("object span regex is valid"))
}

fn trailing_comma() -> &'static Regex {
    static TRAILING_COMMA: OnceLock<Regex> = OnceLock::new();
    TRAILING_COMMA.get_or_init(|| Regex::new(r",(\s*[}\]])").expect("trailing comma regex is valid"))
}

/// Parse the model's reply into a JSON object.
pub fn parse_model_output(raw: &str) -> InvoiceResult<ExtractionOutcome> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InvoiceError::model_output("Model returned an empty response", raw));
    }

    if let Some(value) = parse_object(trimmed) {
        return Ok(ExtractionOutcome {
            value,
            method: ExtractionMethod::Direct,
        });
    }

    let sanitized = sanitize_response(trimmed);
    if let Some(value) = parse_object(&sanitized) {
        debug!("Model output parsed after sanitizing");
        return Ok(ExtractionOutcome {
            value,
            method: ExtractionMethod::Sanitized,
        });
    }

    let span = object_span()
        .find(&sanitized)
        .ok_or_else(|| InvoiceError::model_output("No JSON object found in model output", raw))?
        .as_str();

    if let Some(value) = parse_object(span) {
        debug!("Model output parsed from embedded object span");
        return Ok(ExtractionOutcome {
            value,
            method: ExtractionMethod::Fallback,
        });
    }

    let without_trailing_commas = trailing_comma().replace_all(span, "$1");
    match serde_json::from_str::<Value>(&without_trailing_commas) {
        Ok(value) if value.is_object() => Ok(ExtractionOutcome {
            value,
            method: ExtractionMethod::Fallback,
        }),
        Ok(_) => Err(InvoiceError::model_output("Model output is not a JSON object", raw)),
        Err(e) => Err(InvoiceError::model_output(
            format!("Model output is not valid JSON: {}", e),
            raw,
        )),
    }
}

fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(Value::is_object)
}
