//! Model output parsing
//!
//! raw text → strip code fence → first balanced {...} → JSON object →
//! StructuredAnswer. Each stage has its own named failure.

use serde_json::{Map, Value};
use thiserror::Error;

use super::types::{ComplianceStatus, Evidence, StructuredAnswer};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty model output")]
    Empty,
    #[error("no JSON object found in model output")]
    NoObject,
    #[error("unbalanced JSON object starting at byte {0}")]
    Unbalanced(usize),
    #[error("invalid JSON after extraction: {0}")]
    InvalidJson(String),
    #[error("parsed JSON is not an object")]
    NotAnObject,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAnswer {
    /// Object text as extracted, fences removed
    pub extracted_json: String,
    pub answer: StructuredAnswer,
}

/// Remove a leading ```lang line and a trailing ``` if present
pub fn strip_code_fence(text: &str) -> &str {
    let s = text.trim();
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let rest = rest.trim_start();
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// First balanced `{...}`, ignoring braces inside JSON strings
pub fn extract_first_object(text: &str) -> Result<&str, ParseError> {
    let start = text.find('{').ok_or(ParseError::NoObject)?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + c.len_utf8();
                    return Ok(&text[start..end]);
                }
            }
            _ => {}
        }
    }

    Err(ParseError::Unbalanced(start))
}

pub fn parse_answer(raw: &str) -> Result<ParsedAnswer, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let body = strip_code_fence(raw);
    let extracted = extract_first_object(body)?;

    let value: Value = serde_json::from_str(extracted).map_err(|e| ParseError::InvalidJson(e.to_string()))?;
    let Value::Object(object) = value else {
        return Err(ParseError::NotAnObject);
    };

    Ok(ParsedAnswer {
        extracted_json: extracted.to_string(),
        answer: to_structured(&object),
    })
}

// ============================================================================
// OBJECT → STRUCTURED ANSWER
// ============================================================================

fn to_structured(object: &Map<String, Value>) -> StructuredAnswer {
    let compliance_status = object
        .get("compliance_status")
        .and_then(Value::as_str)
        .map(ComplianceStatus::parse_lenient)
        .unwrap_or_default();

    StructuredAnswer {
        compliance_status,
        explanation: string_list(object.get("explanation")),
        evidence: evidence_list(object.get("evidence")),
        recommended_mitigation: string_list(object.get("recommended_mitigation")),
        missing_information: string_list(object.get("missing_information")),
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Missing → empty; a lone string → one item
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(value_text).collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn evidence_list(value: Option<&Value>) -> Vec<Evidence> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let quote = item.get("quote").and_then(value_text)?;
            let citation = item.get("citation").and_then(value_text).unwrap_or_default();
            Some(Evidence { quote, citation })
        })
        .collect()
}
