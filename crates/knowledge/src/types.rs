//! Core data model: knowledge entries, their enumerated attributes, and the
//! per-request subject profile.
//!
//! All enumerations are closed. Parsing from free text is case-insensitive and
//! either yields a recognized variant or fails; nothing is coerced into a
//! default value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Criticality of a knowledge entry. Also used as the urgency level of an
/// advisory response.
///
/// Variants are declared from least to most critical so that the derived
/// `Ord` places `Emergency` highest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Routine,
    Urgent,
    Emergency,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Emergency, Severity::Urgent, Severity::Routine];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Emergency => "emergency",
            Severity::Urgent => "urgent",
            Severity::Routine => "routine",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "emergency" => Ok(Severity::Emergency),
            "urgent" => Ok(Severity::Urgent),
            "routine" => Ok(Severity::Routine),
            _ => Err(ParseEnumError::new("severity", s)),
        }
    }
}

/// Normalized species of a subject. Unknown species are represented as
/// `Option::<Species>::None` rather than a variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Dogs,
    Cats,
}

impl Species {
    /// Maps a free-text species string onto a known species.
    ///
    /// Any text containing "dog" is a dog, any text containing "cat" is a cat,
    /// everything else is unknown. Never fails.
    ///
    /// ```rust
    /// use knowledge::Species;
    ///
    /// assert_eq!(Species::normalize("Dog"), Some(Species::Dogs));
    /// assert_eq!(Species::normalize("Persian cat"), Some(Species::Cats));
    /// assert_eq!(Species::normalize("rabbit"), None);
    /// ```
    pub fn normalize(raw: &str) -> Option<Species> {
        let lowered = raw.to_lowercase();
        if lowered.contains("dog") {
            Some(Species::Dogs)
        } else if lowered.contains("cat") {
            Some(Species::Cats)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Dogs => "dogs",
            Species::Cats => "cats",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which species a knowledge entry applies to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SpeciesScope {
    Dogs,
    Cats,
    Both,
}

impl SpeciesScope {
    /// Returns true when an entry with this scope may be shown for `species`.
    /// An unknown species admits every scope.
    pub fn admits(&self, species: Option<Species>) -> bool {
        match (self, species) {
            (_, None) | (SpeciesScope::Both, _) => true,
            (SpeciesScope::Dogs, Some(Species::Dogs)) => true,
            (SpeciesScope::Cats, Some(Species::Cats)) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpeciesScope::Dogs => "dogs",
            SpeciesScope::Cats => "cats",
            SpeciesScope::Both => "both",
        }
    }
}

impl fmt::Display for SpeciesScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpeciesScope {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dogs" | "dog" => Ok(SpeciesScope::Dogs),
            "cats" | "cat" => Ok(SpeciesScope::Cats),
            "both" | "all" => Ok(SpeciesScope::Both),
            _ => Err(ParseEnumError::new("species_scope", s)),
        }
    }
}

/// Kind of veterinary service recommended for a condition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ServiceRecommendation {
    InClinic,
    VideoConsult,
}

impl ServiceRecommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceRecommendation::InClinic => "in_clinic",
            ServiceRecommendation::VideoConsult => "video_consult",
        }
    }

    /// Default service for a severity when nothing more specific is known.
    pub fn for_severity(severity: Severity) -> Self {
        match severity {
            Severity::Emergency | Severity::Urgent => ServiceRecommendation::InClinic,
            Severity::Routine => ServiceRecommendation::VideoConsult,
        }
    }
}

impl fmt::Display for ServiceRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceRecommendation {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();
        match key.as_str() {
            "in_clinic" | "clinic" => Ok(ServiceRecommendation::InClinic),
            "video_consult" | "video" | "video_consultation" => {
                Ok(ServiceRecommendation::VideoConsult)
            }
            _ => Err(ParseEnumError::new("service_recommendation", s)),
        }
    }
}

/// Failure to map free text onto one of the closed enumerations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {field} value: {value:?}")]
pub struct ParseEnumError {
    pub field: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}

/// A validated unit of veterinary knowledge.
///
/// Immutable once built. Embeddings live alongside entries in the corpus
/// store rather than on the entry itself, so the same entry can be re-embedded
/// on reload without copying its text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeEntry {
    pub symptom_title: String,
    pub description: String,
    pub severity: Severity,
    pub species_scope: SpeciesScope,
    pub home_care_advice: String,
    pub vet_escalation_criteria: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_recommendation: Option<ServiceRecommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub climate_notes: Option<String>,
    pub category: String,
}

impl KnowledgeEntry {
    /// Text fed to the embedding service for this entry.
    pub fn embedding_text(&self) -> String {
        format!("{}. {}", self.symptom_title, self.description)
    }
}

/// The animal a request is about. Owned by the caller, read-only to the
/// pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubjectProfile {
    pub name: String,
    pub species: String,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub vaccination_summary: Option<String>,
    #[serde(default)]
    pub medical_history: Option<String>,
}

impl SubjectProfile {
    pub fn new(name: impl Into<String>, species: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            species: species.into(),
            ..Default::default()
        }
    }

    pub fn with_breed(mut self, breed: impl Into<String>) -> Self {
        self.breed = Some(breed.into());
        self
    }

    pub fn with_age(mut self, age: impl Into<String>) -> Self {
        self.age = Some(age.into());
        self
    }

    pub fn with_weight(mut self, weight: impl Into<String>) -> Self {
        self.weight = Some(weight.into());
        self
    }

    pub fn with_sex(mut self, sex: impl Into<String>) -> Self {
        self.sex = Some(sex.into());
        self
    }

    pub fn with_vaccination_summary(mut self, summary: impl Into<String>) -> Self {
        self.vaccination_summary = Some(summary.into());
        self
    }

    pub fn with_medical_history(mut self, history: impl Into<String>) -> Self {
        self.medical_history = Some(history.into());
        self
    }

    pub fn normalized_species(&self) -> Option<Species> {
        Species::normalize(&self.species)
    }
}
