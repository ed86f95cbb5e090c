use knowledge::Severity;

use crate::types::AnalysisResult;
use crate::AdvisorError;

/// Final gate on every outgoing [`AnalysisResult`].
///
/// Enumerated fields are closed types, so a value outside its domain cannot
/// reach this point; what remains to check is presence, non-emptiness, and
/// that an emergency flag is reflected in the urgency level.
pub fn validate_result(result: &AnalysisResult) -> Result<(), AdvisorError> {
    let mut problems = Vec::new();

    for (field, value) in [
        ("pet_name", &result.pet_name),
        ("summary", &result.summary),
        ("what_we_found", &result.what_we_found),
        ("when_to_see_vet", &result.when_to_see_vet),
    ] {
        if value.trim().is_empty() {
            problems.push(format!("{field} is empty"));
        }
    }

    for (field, items) in [
        ("immediate_steps", &result.immediate_steps),
        ("home_care_tips", &result.home_care_tips),
    ] {
        if items.is_empty() {
            problems.push(format!("{field} has no items"));
        } else if items.iter().any(|i| i.trim().is_empty()) {
            problems.push(format!("{field} contains a blank item"));
        }
    }

    let meta = &result.query_metadata;
    if !meta.top_match_score.is_finite() || meta.top_match_score < 0.0 {
        problems.push("query_metadata.top_match_score must be a non-negative number".into());
    }
    if chrono::DateTime::parse_from_rfc3339(&meta.timestamp).is_err() {
        problems.push("query_metadata.timestamp is not RFC 3339".into());
    }
    if meta.is_emergency && result.urgency_level != Severity::Emergency {
        problems.push("emergency query must have emergency urgency".into());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(AdvisorError::Validation(problems))
    }
}
