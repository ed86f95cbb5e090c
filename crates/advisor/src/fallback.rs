use knowledge::{ServiceRecommendation, Severity};
use matcher::MatchResult;

use crate::types::{Advice, Confidence};

pub const EMERGENCY_STEP: &str = "Contact an emergency veterinarian immediately";
pub const CONSULT_STEP: &str = "Consult a veterinarian for a professional assessment";

const MAX_TIPS: usize = 5;

const NO_MATCH_STEPS: [&str; 3] = [
    "Monitor your pet closely",
    "Note any changes in behavior or symptoms",
    "Keep your pet comfortable",
];

const GENERIC_TIPS: [&str; 3] = [
    "Ensure fresh water is available",
    "Keep in a cool, comfortable place",
    "Don't force food if not eating",
];

/// Deterministic, non-generative advice built from the best match.
///
/// Never fails and never calls out. Confidence is always `low`; every
/// response recommends a veterinarian; an emergency flag forces
/// `emergency` urgency and an in-clinic visit.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackSynthesizer;

impl FallbackSynthesizer {
    pub fn synthesize(&self, matches: &[MatchResult], is_emergency: bool) -> Advice {
        let mut advice = match matches.first() {
            Some(top) => Self::from_match(top),
            None => Self::without_match(),
        };

        if is_emergency {
            advice.urgency_level = Severity::Emergency;
            advice.service_recommendation = ServiceRecommendation::InClinic;
            advice.summary = format!(
                "Your description includes signs of a possible emergency. {}",
                advice.summary
            );
            advice.immediate_steps.retain(|s| s != EMERGENCY_STEP);
            advice.immediate_steps.insert(0, EMERGENCY_STEP.to_string());
        }
        advice
    }

    fn without_match() -> Advice {
        let mut steps: Vec<String> = NO_MATCH_STEPS.iter().map(|s| s.to_string()).collect();
        steps.push(CONSULT_STEP.to_string());
        Advice {
            summary: "We couldn't find specific information for these symptoms.".into(),
            what_we_found: "The symptoms you described don't closely match our knowledge base. \
                            This doesn't mean they aren't serious."
                .into(),
            immediate_steps: steps,
            home_care_tips: GENERIC_TIPS.iter().map(|s| s.to_string()).collect(),
            when_to_see_vet: "Given the uncertainty, we recommend consulting a veterinarian soon."
                .into(),
            urgency_level: Severity::Routine,
            service_recommendation: ServiceRecommendation::VideoConsult,
            confidence: Confidence::Low,
            additional_notes: Some(
                "Without clear symptom matches, professional veterinary assessment is recommended."
                    .into(),
            ),
        }
    }

    fn from_match(top: &MatchResult) -> Advice {
        let entry = &top.entry;
        let care = sentences(&entry.home_care_advice);

        let mut steps: Vec<String> = care.iter().take(2).cloned().collect();
        if steps.is_empty() {
            steps.push("Follow the home care guidance below".into());
        }
        steps.push("Monitor symptoms closely and note any worsening".into());
        steps.push(CONSULT_STEP.to_string());

        let tips: Vec<String> = if care.is_empty() {
            GENERIC_TIPS.iter().map(|s| s.to_string()).collect()
        } else {
            care.into_iter().take(MAX_TIPS).collect()
        };

        Advice {
            summary: format!(
                "Based on the symptoms, this appears to be related to {}.",
                non_blank(&entry.symptom_title).unwrap_or("a known condition")
            ),
            what_we_found: non_blank(&entry.description)
                .unwrap_or("We found a related condition in our knowledge base.")
                .to_string(),
            immediate_steps: steps,
            home_care_tips: tips,
            when_to_see_vet: non_blank(&entry.vet_escalation_criteria)
                .unwrap_or("If symptoms persist or worsen, see a veterinarian.")
                .to_string(),
            urgency_level: entry.severity,
            service_recommendation: entry
                .service_recommendation
                .unwrap_or_else(|| ServiceRecommendation::for_severity(entry.severity)),
            confidence: Confidence::Low,
            additional_notes: entry
                .climate_notes
                .as_deref()
                .and_then(non_blank)
                .map(str::to_string),
        }
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

/// Splits free-text advice into trimmed sentences or list items.
///
/// Items break on `;` and newlines. A period breaks only when followed by
/// whitespace and a word that does not start lowercase, so decimals like
/// `2.5 ml` and abbreviations like `e.g. rice` survive.
fn sentences(text: &str) -> Vec<String> {
    text.split([';', '\n'])
        .flat_map(split_sentences)
        .map(|s| {
            s.trim()
                .trim_start_matches(['-', '*', '•'])
                .trim_end_matches('.')
                .trim()
        })
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_sentences(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '.' {
            continue;
        }
        let Some(&(_, next)) = chars.peek() else {
            break;
        };
        if !next.is_whitespace() {
            continue;
        }
        let rest = &text[i + 1..];
        let starts_lowercase = rest
            .trim_start()
            .chars()
            .next()
            .is_some_and(char::is_lowercase);
        if !starts_lowercase {
            parts.push(&text[start..=i]);
            start = i + 1;
        }
    }
    parts.push(&text[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use knowledge::{KnowledgeEntry, SpeciesScope};
    use std::sync::Arc;

    fn top(severity: Severity, service: Option<ServiceRecommendation>) -> MatchResult {
        MatchResult {
            entry: Arc::new(KnowledgeEntry {
                symptom_title: "Vomiting".into(),
                description: "Repeated vomiting can lead to dehydration.".into(),
                severity,
                species_scope: SpeciesScope::Dogs,
                home_care_advice: "Withhold food for 6 hours. Offer ORS in small sips; Feed boiled rice after".into(),
                vet_escalation_criteria: "Blood in vomit or more than 3 episodes".into(),
                service_recommendation: service,
                climate_notes: Some("Dehydration risk is higher in summer heat".into()),
                category: "digestive".into(),
            }),
            raw_similarity: 0.7,
            boosted_score: 0.84,
            severity_multiplier: 1.2,
            candidate_rank: 0,
        }
    }

    #[test]
    fn no_match_no_emergency() {
        let advice = FallbackSynthesizer.synthesize(&[], false);
        assert_eq!(advice.urgency_level, Severity::Routine);
        assert_eq!(advice.confidence, Confidence::Low);
        assert_eq!(advice.service_recommendation, ServiceRecommendation::VideoConsult);
        assert!(!advice.immediate_steps.is_empty());
        assert!(advice.immediate_steps.iter().any(|s| s == CONSULT_STEP));
        assert_eq!(advice.home_care_tips.len(), 3);
    }

    #[test]
    fn no_match_with_emergency() {
        let advice = FallbackSynthesizer.synthesize(&[], true);
        assert_eq!(advice.urgency_level, Severity::Emergency);
        assert_eq!(advice.service_recommendation, ServiceRecommendation::InClinic);
        assert_eq!(advice.immediate_steps[0], EMERGENCY_STEP);
    }

    #[test]
    fn top_match_drives_content() {
        let advice = FallbackSynthesizer.synthesize(&[top(Severity::Urgent, None)], false);
        assert_eq!(
            advice.summary,
            "Based on the symptoms, this appears to be related to Vomiting."
        );
        assert_eq!(advice.what_we_found, "Repeated vomiting can lead to dehydration.");
        assert_eq!(advice.when_to_see_vet, "Blood in vomit or more than 3 episodes");
        assert_eq!(advice.urgency_level, Severity::Urgent);
        assert_eq!(advice.service_recommendation, ServiceRecommendation::InClinic);
        assert_eq!(advice.confidence, Confidence::Low);
        assert_eq!(
            advice.home_care_tips,
            vec!["Withhold food for 6 hours", "Offer ORS in small sips", "Feed boiled rice after"]
        );
        assert_eq!(advice.immediate_steps[0], "Withhold food for 6 hours");
        assert_eq!(advice.immediate_steps.last().map(String::as_str), Some(CONSULT_STEP));
        assert_eq!(
            advice.additional_notes.as_deref(),
            Some("Dehydration risk is higher in summer heat")
        );
    }

    #[test]
    fn entry_service_recommendation_wins_unless_emergency() {
        let m = top(Severity::Urgent, Some(ServiceRecommendation::VideoConsult));
        let advice = FallbackSynthesizer.synthesize(std::slice::from_ref(&m), false);
        assert_eq!(advice.service_recommendation, ServiceRecommendation::VideoConsult);

        let advice = FallbackSynthesizer.synthesize(&[m], true);
        assert_eq!(advice.service_recommendation, ServiceRecommendation::InClinic);
        assert_eq!(advice.urgency_level, Severity::Emergency);
        assert_eq!(advice.immediate_steps[0], EMERGENCY_STEP);
        assert_eq!(
            advice
                .immediate_steps
                .iter()
                .filter(|s| *s == EMERGENCY_STEP)
                .count(),
            1
        );
    }

    #[test]
    fn decimals_and_abbreviations_stay_in_one_tip() {
        assert_eq!(
            sentences("Give 2.5 ml ORS every hour. Feed bland food, e.g. rice; keep calm.\n- Rest"),
            vec![
                "Give 2.5 ml ORS every hour",
                "Feed bland food, e.g. rice",
                "keep calm",
                "Rest",
            ]
        );
    }

    #[test]
    fn blank_entry_fields_get_generic_text() {
        let mut m = top(Severity::Routine, None);
        let entry = Arc::make_mut(&mut m.entry);
        entry.home_care_advice = "  ".into();
        entry.vet_escalation_criteria = String::new();
        entry.climate_notes = Some(" ".into());

        let advice = FallbackSynthesizer.synthesize(&[m], false);
        assert_eq!(advice.home_care_tips.len(), 3);
        assert!(!advice.when_to_see_vet.is_empty());
        assert_eq!(advice.additional_notes, None);
        assert_eq!(advice.service_recommendation, ServiceRecommendation::VideoConsult);
    }
}
