use std::fmt::Write as _;

use crate::context::AssembledContext;

const PREAMBLE: &str = "You are a veterinary triage assistant for SNOUTIQ, a pet health \
platform serving pet parents in India. You explain symptoms in plain, caring language, \
you never claim to diagnose, and you always point the pet parent to a veterinarian when \
there is any doubt.";

const RESPONSE_SCHEMA: &str = r#"{
  "summary": "Brief 1-2 sentence summary of the situation",
  "what_we_found": "Explanation based on the symptoms and the pet's history (3-4 sentences)",
  "immediate_steps": ["What to do right now", "How to monitor", "What to avoid"],
  "home_care_tips": ["Specific care advice", "What to watch for", "How to keep the pet comfortable"],
  "when_to_see_vet": "Clear criteria for when veterinary care is needed",
  "urgency_level": "emergency | urgent | routine",
  "service_recommendation": "in_clinic | video_consult",
  "confidence": "high | medium | low",
  "additional_notes": "Breed, age, or climate considerations (optional)"
}"#;

const GUIDANCE: &[&str] = &[
    "Use simple, empathetic language.",
    "Consider India's climate: heat, humidity and the monsoon season affect hydration, skin and parasites.",
    "Take the pet's age, breed and medical history into account.",
    "If this is an emergency, tell the pet parent to see a vet immediately.",
    "Use only the enumerated values shown for urgency_level, service_recommendation and confidence.",
    "Return ONLY the JSON object, with no extra text.",
];

/// Builds the full generation prompt for one request.
pub fn build_prompt(context: &AssembledContext, query: &str) -> String {
    let emergency_line = if context.is_emergency {
        "YES - URGENT ATTENTION NEEDED"
    } else {
        "No immediate emergency detected"
    };

    let mut prompt = String::with_capacity(
        PREAMBLE.len() + context.pet_details.len() + context.matches.len() + query.len() + 1024,
    );
    let _ = writeln!(prompt, "{PREAMBLE}\n");
    let _ = writeln!(prompt, "PET DETAILS:\n{}", context.pet_details);
    let _ = writeln!(prompt, "PET PARENT'S QUERY:\n{}\n", query.trim());
    let _ = writeln!(prompt, "RELEVANT MEDICAL INFORMATION:\n{}", context.matches);
    let _ = writeln!(prompt, "EMERGENCY STATUS: {emergency_line}\n");
    let _ = writeln!(
        prompt,
        "INSTRUCTIONS:\nRespond with a single JSON object in exactly this format:\n{RESPONSE_SCHEMA}\n"
    );
    prompt.push_str("IMPORTANT:\n");
    for line in GUIDANCE {
        let _ = writeln!(prompt, "- {line}");
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(is_emergency: bool) -> AssembledContext {
        AssembledContext {
            pet_details: "Pet Name: Bruno\nSpecies: dog\n".into(),
            matches: "Match 1:\n  Symptom: Vomiting\n".into(),
            match_count: 1,
            is_emergency,
        }
    }

    #[test]
    fn prompt_contains_every_section() {
        let prompt = build_prompt(&context(false), "  my dog is vomiting  ");
        assert!(prompt.contains("PET DETAILS:\nPet Name: Bruno"));
        assert!(prompt.contains("PET PARENT'S QUERY:\nmy dog is vomiting\n"));
        assert!(prompt.contains("Symptom: Vomiting"));
        assert!(prompt.contains("EMERGENCY STATUS: No immediate emergency detected"));
        assert!(prompt.contains("\"urgency_level\""));
        assert!(prompt.contains("monsoon"));
    }

    #[test]
    fn emergency_flag_is_foregrounded() {
        let prompt = build_prompt(&context(true), "bleeding");
        assert!(prompt.contains("EMERGENCY STATUS: YES - URGENT ATTENTION NEEDED"));
    }
}
