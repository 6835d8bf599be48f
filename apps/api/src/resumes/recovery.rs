//! Best-effort coercion of a model response into `ParsedResume`.
//!
//! Strategies run in order and the first success wins. When all of them fail the
//! untouched response is kept so it can be stored for manual inspection.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::llm_client::strip_json_fences;
use crate::models::resume::{scalar_to_string, ContactInfo, ParsedResume};

#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// The response matched the schema as-is.
    Structured(ParsedResume),
    /// A JSON object was salvaged and coerced field by field.
    Recovered(ParsedResume),
    /// Nothing usable; carries the raw response.
    Unrecoverable(String),
}

type Strategy = fn(&str) -> Option<ParseOutcome>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("schema", parse_schema),
    ("brace_span", parse_brace_span),
    ("whole_response", parse_whole_response),
];

pub fn recover_resume(raw: &str) -> ParseOutcome {
    for (name, strategy) in STRATEGIES {
        if let Some(outcome) = strategy(raw) {
            debug!(strategy = name, "LLM output parsed");
            return outcome;
        }
        debug!(strategy = name, "Parse strategy failed");
    }

    warn!("All parse strategies failed, keeping raw output");
    ParseOutcome::Unrecoverable(raw.to_string())
}

fn parse_schema(raw: &str) -> Option<ParseOutcome> {
    serde_json::from_str::<ParsedResume>(strip_json_fences(raw))
        .map(ParseOutcome::Structured)
        .ok()
}

fn parse_brace_span(raw: &str) -> Option<ParseOutcome> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    parse_object(&raw[start..=end])
}

fn parse_whole_response(raw: &str) -> Option<ParseOutcome> {
    parse_object(raw)
}

fn parse_object(text: &str) -> Option<ParseOutcome> {
    match serde_json::from_str::<Value>(text).ok()? {
        Value::Object(map) => Some(ParseOutcome::Recovered(coerce_fields(&map))),
        _ => None,
    }
}

/// Shape mismatches degrade to defaults per field instead of failing the whole object.
fn coerce_fields(map: &Map<String, Value>) -> ParsedResume {
    ParsedResume {
        contact: map
            .get("contact")
            .filter(|v| v.is_object())
            .and_then(|v| from_value::<ContactInfo>(v, "contact")),
        summary: map.get("summary").and_then(scalar_to_string),
        experience: list_field(map, "experience"),
        education: list_field(map, "education"),
        skills: string_list(map, "skills"),
        certifications: string_list(map, "certifications"),
    }
}

fn from_value<T: DeserializeOwned>(value: &Value, field: &str) -> Option<T> {
    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(field, "Dropping malformed value: {e}");
            None
        }
    }
}

fn list_field<T: DeserializeOwned>(map: &Map<String, Value>, field: &str) -> Vec<T> {
    match map.get(field) {
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| item.is_object())
            .filter_map(|item| from_value(item, field))
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(_) => {
            warn!(field, "Expected a list, defaulting to empty");
            Vec::new()
        }
    }
}

fn string_list(map: &Map<String, Value>, field: &str) -> Vec<String> {
    match map.get(field) {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(_) => {
            warn!(field, "Expected a list, defaulting to empty");
            Vec::new()
        }
    }
}
