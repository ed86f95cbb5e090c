mod common;

use common::{
    entry, generating_pipeline, offline_pipeline, sample_corpus, write_dataset, GENERATED_ROUTINE,
};
use snoutiq::{
    Confidence, ResponseSource, ServiceRecommendation, Severity, SpeciesScope, SubjectProfile,
};

const EMERGENCY_STEP: &str = "Contact an emergency veterinarian immediately";

fn dog() -> SubjectProfile {
    SubjectProfile::new("Bruno", "Dog")
        .with_breed("Indie")
        .with_age("4 years")
}

#[tokio::test]
async fn vomiting_blood_is_an_emergency_even_for_an_urgent_match() {
    let pipeline = offline_pipeline();
    pipeline
        .load_entries(vec![entry(
            "Vomiting",
            "Repeated vomiting of food or bile",
            Severity::Urgent,
            SpeciesScope::Dogs,
        )])
        .await
        .unwrap();

    let result = pipeline.analyze(&dog(), "dog vomiting blood").await.unwrap();

    assert_eq!(result.query_metadata.num_matches, 1);
    assert!(result.query_metadata.is_emergency);
    assert_eq!(result.urgency_level, Severity::Emergency);
    assert_eq!(result.service_recommendation, ServiceRecommendation::InClinic);
    assert_eq!(result.immediate_steps[0], EMERGENCY_STEP);
    assert_eq!(result.query_metadata.source, ResponseSource::Fallback);
    assert_eq!(result.pet_name, "Bruno");
}

#[tokio::test]
async fn emergency_overrides_generated_routine_advice() {
    let pipeline = generating_pipeline(GENERATED_ROUTINE);
    pipeline
        .load_entries(vec![entry(
            "Vomiting",
            "Repeated vomiting of food or bile",
            Severity::Urgent,
            SpeciesScope::Dogs,
        )])
        .await
        .unwrap();

    let advisory = pipeline.advise(&dog(), "dog vomiting blood").await.unwrap();

    assert_eq!(advisory.fallback_reason, None);
    let result = advisory.result;
    assert_eq!(result.query_metadata.source, ResponseSource::Generated);
    assert_eq!(result.urgency_level, Severity::Emergency);
    assert_eq!(result.service_recommendation, ServiceRecommendation::InClinic);
    assert_eq!(result.confidence, Confidence::High);
    assert_eq!(result.summary, "Probably a mild stomach upset.");
}

#[tokio::test]
async fn cat_against_dog_only_corpus_gets_low_confidence_fallback() {
    let pipeline = offline_pipeline();
    pipeline
        .load_entries(vec![
            entry("Vomiting", "Repeated vomiting", Severity::Urgent, SpeciesScope::Dogs),
            entry("Ear mites", "Scratching ears", Severity::Routine, SpeciesScope::Dogs),
        ])
        .await
        .unwrap();

    let cat = SubjectProfile::new("Mittens", "cat");
    let result = pipeline.analyze(&cat, "cat vomiting after meals").await.unwrap();

    assert_eq!(result.query_metadata.num_matches, 0);
    assert_eq!(result.query_metadata.top_match_score, 0.0);
    assert_eq!(result.confidence, Confidence::Low);
    assert_eq!(result.urgency_level, Severity::Routine);
    assert!(result.is_fallback());
    assert!(!result.immediate_steps.is_empty());
}

#[tokio::test]
async fn emergency_entry_is_boosted_by_one_and_a_half() {
    let pipeline = offline_pipeline();
    pipeline
        .load_entries(vec![entry(
            "Bleeding",
            "Dog bleeding from a deep cut on the leg",
            Severity::Emergency,
            SpeciesScope::Dogs,
        )])
        .await
        .unwrap();

    let vector = pipeline.embedder().embed("dog bleeding").await.unwrap();
    let corpus = pipeline.corpus().snapshot();
    let candidates = corpus.search(&vector, 10).unwrap();
    let matches = pipeline
        .ranker()
        .rank(&candidates, dog().normalized_species(), "dog bleeding");

    assert_eq!(matches.len(), 1);
    let top = &matches[0];
    assert!(top.raw_similarity > 0.0);
    assert!(top.boosted_score >= 1.5 * top.raw_similarity - 1e-6);

    let result = pipeline.analyze(&dog(), "dog bleeding").await.unwrap();
    assert_eq!(result.urgency_level, Severity::Emergency);
    assert!((result.query_metadata.top_match_score - top.boosted_score).abs() < 1e-6);
}

#[tokio::test]
async fn species_filter_keeps_shared_and_matching_entries() {
    let pipeline = offline_pipeline();
    pipeline.load_entries(sample_corpus()).await.unwrap();

    let for_dog = pipeline
        .analyze(&dog(), "my pet is limping and scratching")
        .await
        .unwrap();
    assert_eq!(for_dog.query_metadata.num_matches, 4);

    let for_cat = pipeline
        .analyze(
            &SubjectProfile::new("Mittens", "Persian cat"),
            "my pet is limping and scratching",
        )
        .await
        .unwrap();
    assert_eq!(for_cat.query_metadata.num_matches, 3);

    let unknown = pipeline
        .analyze(
            &SubjectProfile::new("Polly", "parrot"),
            "my pet is limping and scratching",
        )
        .await
        .unwrap();
    assert_eq!(unknown.query_metadata.num_matches, 5);
}

#[tokio::test]
async fn top_match_drives_fallback_summary() {
    let pipeline = offline_pipeline();
    pipeline.load_entries(sample_corpus()).await.unwrap();

    let result = pipeline
        .analyze(&dog(), "my dog keeps vomiting up his food")
        .await
        .unwrap();
    assert!(!result.query_metadata.is_emergency);
    assert_eq!(
        result.summary,
        "Based on the symptoms, this appears to be related to Vomiting."
    );
}

#[tokio::test]
async fn dataset_directory_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(
        dir.path(),
        "digestive",
        r#"{"entries": [
            {"symptom": "Vomiting", "description": "Repeated vomiting", "severity": "Urgent",
             "species": "dogs", "home_care_india": ["Offer ORS", "Feed curd rice"],
             "vet_triggers": "Blood in vomit", "indian_climate_factors": "Worse in summer heat"},
            {"symptom": "Hairballs", "description": "Cat coughing up hair", "severity": "routine",
             "species": "cats"},
            {"symptom": "Mystery", "description": "Unknown", "severity": "critical", "species": "dogs"}
        ]}"#,
    );
    write_dataset(
        dir.path(),
        "skin",
        r#"[{"symptom_title": "Hot spots", "description": "Moist red patches on skin",
             "severity": "routine", "species_scope": "all"}]"#,
    );
    write_dataset(dir.path(), "broken", "{not json");
    std::fs::write(dir.path().join("notes.json"), "[]").unwrap();

    let pipeline = offline_pipeline();
    let summary = pipeline.load_dataset_dir(dir.path()).await.unwrap();

    assert_eq!(summary.entries, 3);
    assert_eq!(
        summary.categories,
        vec![("digestive".to_string(), 2), ("skin".to_string(), 1)]
    );
    assert_eq!(summary.rejected.len(), 1);
    assert_eq!(summary.skipped_files.len(), 1);
    assert!(pipeline.is_ready());

    let result = pipeline.analyze(&dog(), "dog vomiting since morning").await.unwrap();
    assert_eq!(result.query_metadata.num_matches, 2);
    assert_eq!(result.additional_notes.as_deref(), Some("Worse in summer heat"));
}
