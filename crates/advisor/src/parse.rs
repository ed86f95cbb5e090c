//! Extraction of structured advice from free-form generated text.
//!
//! Every failure here is an [`AdvisorError::MalformedOutput`], which the
//! responder answers with the fallback synthesizer.

use knowledge::{ServiceRecommendation, Severity};
use serde::Deserialize;
use serde_json::{Deserializer, Map, Value};

use crate::types::{Advice, Confidence};
use crate::AdvisorError;

/// Finds the first well-formed JSON object in `text`.
///
/// Each `{` is tried as a start position in order; the first one that opens a
/// complete object wins. Prose or code fences around the object are ignored.
pub fn extract_first_json_object(text: &str) -> Option<Map<String, Value>> {
    text.match_indices('{').find_map(|(start, _)| {
        let mut stream = Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(map))) => Some(map),
            _ => None,
        }
    })
}

/// Loosely typed view of the generated object. Every field is optional so
/// that a missing field is reported by name instead of as a serde error.
#[derive(Debug, Default, Deserialize)]
struct RawAdvice {
    summary: Option<String>,
    what_we_found: Option<String>,
    immediate_steps: Option<Vec<String>>,
    home_care_tips: Option<Vec<String>>,
    when_to_see_vet: Option<String>,
    urgency_level: Option<String>,
    service_recommendation: Option<String>,
    confidence: Option<String>,
    additional_notes: Option<String>,
}

/// Parses generated text into [`Advice`], rejecting anything outside the
/// response contract.
pub fn parse_advice(text: &str) -> Result<Advice, AdvisorError> {
    let object = extract_first_json_object(text)
        .ok_or_else(|| AdvisorError::MalformedOutput("no JSON object found".into()))?;
    let raw: RawAdvice = serde_json::from_value(Value::Object(object))
        .map_err(|e| AdvisorError::MalformedOutput(format!("unexpected field type: {e}")))?;

    Ok(Advice {
        summary: required_text("summary", raw.summary)?,
        what_we_found: required_text("what_we_found", raw.what_we_found)?,
        immediate_steps: required_list("immediate_steps", raw.immediate_steps)?,
        home_care_tips: required_list("home_care_tips", raw.home_care_tips)?,
        when_to_see_vet: required_text("when_to_see_vet", raw.when_to_see_vet)?,
        urgency_level: required_enum::<Severity>("urgency_level", raw.urgency_level)?,
        service_recommendation: required_enum::<ServiceRecommendation>(
            "service_recommendation",
            raw.service_recommendation,
        )?,
        confidence: required_enum::<Confidence>("confidence", raw.confidence)?,
        additional_notes: raw
            .additional_notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
    })
}

fn missing(field: &str) -> AdvisorError {
    AdvisorError::MalformedOutput(format!("missing required field `{field}`"))
}

fn required_text(field: &str, value: Option<String>) -> Result<String, AdvisorError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| missing(field))
}

fn required_list(field: &str, value: Option<Vec<String>>) -> Result<Vec<String>, AdvisorError> {
    let items: Vec<String> = value
        .ok_or_else(|| missing(field))?
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();
    if items.is_empty() {
        return Err(AdvisorError::MalformedOutput(format!("`{field}` is empty")));
    }
    Ok(items)
}

fn required_enum<T>(field: &str, value: Option<String>) -> Result<T, AdvisorError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let value = value.ok_or_else(|| missing(field))?;
    value
        .parse::<T>()
        .map_err(|e| AdvisorError::MalformedOutput(e.to_string()))
}
