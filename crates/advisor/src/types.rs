//! The advisory response contract.

use std::fmt;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use knowledge::{ParseEnumError, ServiceRecommendation, Severity};
use serde::{Deserialize, Serialize};

/// How sure the advisory is of its own reading of the symptoms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Confidence::High),
            "medium" => Ok(Confidence::Medium),
            "low" => Ok(Confidence::Low),
            _ => Err(ParseEnumError {
                field: "confidence",
                value: s.to_string(),
            }),
        }
    }
}

/// Which path produced an advisory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Generated,
    Fallback,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Generated => "generated",
            ResponseSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryMetadata {
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub num_matches: usize,
    pub is_emergency: bool,
    /// Boosted score of the best match, 0.0 without matches.
    pub top_match_score: f32,
    pub source: ResponseSource,
}

impl QueryMetadata {
    pub fn now(
        num_matches: usize,
        is_emergency: bool,
        top_match_score: f32,
        source: ResponseSource,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            num_matches,
            is_emergency,
            top_match_score,
            source,
        }
    }
}

/// Advisory fields produced by either generation or fallback, before
/// metadata is attached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Advice {
    pub summary: String,
    pub what_we_found: String,
    pub immediate_steps: Vec<String>,
    pub home_care_tips: Vec<String>,
    pub when_to_see_vet: String,
    pub urgency_level: Severity,
    pub service_recommendation: ServiceRecommendation,
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
}

/// The validated response handed back to the caller. Never mutated after
/// validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub pet_name: String,
    pub summary: String,
    pub what_we_found: String,
    pub immediate_steps: Vec<String>,
    pub home_care_tips: Vec<String>,
    pub when_to_see_vet: String,
    pub urgency_level: Severity,
    pub service_recommendation: ServiceRecommendation,
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
    pub query_metadata: QueryMetadata,
}

impl AnalysisResult {
    pub fn from_advice(pet_name: impl Into<String>, advice: Advice, metadata: QueryMetadata) -> Self {
        Self {
            pet_name: pet_name.into(),
            summary: advice.summary,
            what_we_found: advice.what_we_found,
            immediate_steps: advice.immediate_steps,
            home_care_tips: advice.home_care_tips,
            when_to_see_vet: advice.when_to_see_vet,
            urgency_level: advice.urgency_level,
            service_recommendation: advice.service_recommendation,
            confidence: advice.confidence,
            additional_notes: advice.additional_notes,
            query_metadata: metadata,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.query_metadata.source == ResponseSource::Fallback
    }
}
