//! Context assembly: the bounded block of match and pet details handed to
//! the generation step.

use std::fmt::Write as _;

use knowledge::SubjectProfile;
use matcher::MatchResult;
use serde::{Deserialize, Serialize};

use crate::AdvisorError;

pub(crate) const NOT_PROVIDED: &str = "Not provided";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextConfig {
    /// Matches rendered into the context. Capped at 3 regardless of this value.
    #[serde(default = "ContextConfig::default_max_matches")]
    pub max_matches: usize,
    /// Longest rendering of any single field, in characters.
    #[serde(default = "ContextConfig::default_max_field_chars")]
    pub max_field_chars: usize,
}

impl ContextConfig {
    pub const MATCH_CAP: usize = 3;

    pub(crate) fn default_max_matches() -> usize {
        Self::MATCH_CAP
    }

    pub(crate) fn default_max_field_chars() -> usize {
        800
    }

    pub fn with_max_matches(mut self, max: usize) -> Self {
        self.max_matches = max;
        self
    }

    pub fn with_max_field_chars(mut self, max: usize) -> Self {
        self.max_field_chars = max;
        self
    }

    /// Effective match limit.
    pub fn match_limit(&self) -> usize {
        self.max_matches.min(Self::MATCH_CAP)
    }

    pub fn validate(&self) -> Result<(), AdvisorError> {
        if self.max_field_chars < 16 {
            return Err(AdvisorError::Validation(vec![
                "context.max_field_chars must be at least 16".into(),
            ]));
        }
        Ok(())
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_matches: Self::default_max_matches(),
            max_field_chars: Self::default_max_field_chars(),
        }
    }
}

/// Rendered context for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledContext {
    pub pet_details: String,
    pub matches: String,
    pub match_count: usize,
    pub is_emergency: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ContextAssembler {
    config: ContextConfig,
}

impl ContextAssembler {
    pub fn new(config: ContextConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Pure formatting; no filtering beyond the match cap.
    pub fn assemble(
        &self,
        matches: &[MatchResult],
        profile: &SubjectProfile,
        is_emergency: bool,
    ) -> AssembledContext {
        let selected = &matches[..matches.len().min(self.config.match_limit())];

        let mut rendered = String::new();
        for (i, m) in selected.iter().enumerate() {
            let entry = &m.entry;
            let _ = writeln!(rendered, "Match {}:", i + 1);
            let _ = writeln!(rendered, "  Symptom: {}", self.field(Some(&entry.symptom_title)));
            let _ = writeln!(rendered, "  Description: {}", self.field(Some(&entry.description)));
            let _ = writeln!(rendered, "  Severity: {}", entry.severity);
            let _ = writeln!(rendered, "  Home Care: {}", self.field(Some(&entry.home_care_advice)));
            let _ = writeln!(
                rendered,
                "  When to See Vet: {}",
                self.field(Some(&entry.vet_escalation_criteria))
            );
            if let Some(notes) = entry.climate_notes.as_deref() {
                let _ = writeln!(rendered, "  Climate Notes: {}", self.field(Some(notes)));
            }
            rendered.push('\n');
        }
        if selected.is_empty() {
            rendered.push_str("No closely matching entries were found in the knowledge base.\n");
        }

        AssembledContext {
            pet_details: self.render_profile(profile),
            matches: rendered,
            match_count: selected.len(),
            is_emergency,
        }
    }

    fn render_profile(&self, profile: &SubjectProfile) -> String {
        let rows = [
            ("Pet Name", Some(profile.name.as_str())),
            ("Species", Some(profile.species.as_str())),
            ("Breed", profile.breed.as_deref()),
            ("Age", profile.age.as_deref()),
            ("Weight", profile.weight.as_deref()),
            ("Sex", profile.sex.as_deref()),
            ("Vaccination Status", profile.vaccination_summary.as_deref()),
            ("Medical History", profile.medical_history.as_deref()),
        ];
        let mut out = String::new();
        for (label, value) in rows {
            let _ = writeln!(out, "{label}: {}", self.field(value));
        }
        out
    }

    /// Blank and absent values both render as "Not provided".
    fn field(&self, value: Option<&str>) -> String {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => truncate_chars(v, self.config.max_field_chars),
            None => NOT_PROVIDED.to_string(),
        }
    }
}

pub(crate) fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max_chars).collect();
    format!("{truncated}…")
}

#[cfg(test)]
mod tests {
    use super::*;
    use knowledge::{KnowledgeEntry, Severity, SpeciesScope};
    use std::sync::Arc;

    fn match_result(title: &str) -> MatchResult {
        MatchResult {
            entry: Arc::new(KnowledgeEntry {
                symptom_title: title.into(),
                description: format!("{title} details"),
                severity: Severity::Urgent,
                species_scope: SpeciesScope::Both,
                home_care_advice: "Offer water".into(),
                vet_escalation_criteria: "If it lasts a day".into(),
                service_recommendation: None,
                climate_notes: None,
                category: "test".into(),
            }),
            raw_similarity: 0.5,
            boosted_score: 0.6,
            severity_multiplier: 1.2,
            candidate_rank: 0,
        }
    }

    #[test]
    fn caps_at_three_matches() {
        let matches: Vec<_> = (0..5).map(|i| match_result(&format!("m{i}"))).collect();
        let ctx = ContextAssembler::new(ContextConfig::default().with_max_matches(10))
            .assemble(&matches, &SubjectProfile::new("Bruno", "dog"), false);
        assert_eq!(ctx.match_count, 3);
        assert!(ctx.matches.contains("Match 3:"));
        assert!(!ctx.matches.contains("Match 4:"));
        assert!(ctx.matches.contains("Severity: urgent"));
        assert!(ctx.matches.contains("When to See Vet: If it lasts a day"));
    }

    #[test]
    fn absent_profile_fields_render_not_provided() {
        let profile = SubjectProfile::new("Milo", "cat").with_age("2 years").with_breed("  ");
        let ctx = ContextAssembler::default().assemble(&[], &profile, true);
        assert!(ctx.pet_details.contains("Pet Name: Milo"));
        assert!(ctx.pet_details.contains("Age: 2 years"));
        assert!(ctx.pet_details.contains("Breed: Not provided"));
        assert!(ctx.pet_details.contains("Medical History: Not provided"));
        assert_eq!(ctx.match_count, 0);
        assert!(ctx.is_emergency);
        assert!(ctx.matches.contains("No closely matching entries"));
    }

    #[test]
    fn long_fields_are_truncated() {
        let profile = SubjectProfile::new("Rex", "dog").with_medical_history("x".repeat(100));
        let ctx = ContextAssembler::new(ContextConfig::default().with_max_field_chars(20))
            .assemble(&[], &profile, false);
        assert!(ctx.pet_details.contains(&format!("Medical History: {}…", "x".repeat(20))));
    }

    #[test]
    fn config_validation() {
        assert!(ContextConfig::default().validate().is_ok());
        assert!(ContextConfig::default().with_max_field_chars(4).validate().is_err());
        assert_eq!(ContextConfig::default().with_max_matches(1).match_limit(), 1);
    }
}
