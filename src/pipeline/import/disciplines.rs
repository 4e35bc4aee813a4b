//! Disciplines are stored as a JSON array string. These helpers convert
//! between the stored form, delimited spreadsheet text and plain lists.

use serde::Deserialize;
use serde_json::Value;

/// Split delimited text ("Physio/OT, SLP") into trimmed, non-empty names,
/// keeping their order. Runs of `/`, `,` and `;` act as one separator.
pub fn parse_disciplines(raw: &str) -> Vec<String> {
    raw.split(['/', ',', ';'])
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(String::from)
        .collect()
}

/// Serialize a list to the stored JSON array form.
pub fn disciplines_json(list: &[String]) -> String {
    Value::from(list.to_vec()).to_string()
}

/// Input accepted when writing disciplines from outside the spreadsheet path:
/// a JSON list of names or a single raw string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DisciplinesInput {
    List(Vec<String>),
    Raw(String),
}

/// Stored form of `input`. A raw string that is already valid JSON is kept
/// as-is; any other raw string becomes a one-element list.
pub fn disciplines_to_json(input: &DisciplinesInput) -> String {
    match input {
        DisciplinesInput::List(list) => disciplines_json(list),
        DisciplinesInput::Raw(raw) => {
            if serde_json::from_str::<Value>(raw).is_ok() {
                raw.clone()
            } else {
                disciplines_json(std::slice::from_ref(raw))
            }
        }
    }
}

/// Decode a stored value leniently: empty means none, a JSON scalar is a
/// single discipline, and text that is not JSON at all is taken verbatim.
pub fn disciplines_from_json(stored: &str) -> Vec<String> {
    if stored.is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Value>(stored) {
        Ok(Value::Array(items)) => items.into_iter().map(value_to_name).collect(),
        Ok(Value::Null) => Vec::new(),
        Ok(scalar) => vec![value_to_name(scalar)],
        Err(_) => vec![stored.to_string()],
    }
}

fn value_to_name(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
