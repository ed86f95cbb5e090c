mod common;

use std::sync::Arc;

use common::{
    entry, generating_pipeline, offline_pipeline, pipeline_with, sample_corpus, write_dataset,
    FailingEmbedder, StalledEmbedder, StalledGenerator,
};
use snoutiq::{
    build_embedder, Confidence, CorpusStore, DisabledGenerator, EmergencyDetector,
    FallbackReason, KnowledgeError, Pipeline, PipelineConfig, PipelineError, Severity,
    SpeciesScope, SubjectProfile, TimeoutConfig,
};

fn dog() -> SubjectProfile {
    SubjectProfile::new("Bruno", "dog")
}

fn short_timeouts() -> PipelineConfig {
    PipelineConfig {
        timeouts: TimeoutConfig {
            embed_ms: 50,
            generation_ms: 50,
        },
        ..PipelineConfig::default()
    }
}

/// A one-entry store with a hand-made embedding, for pipelines whose
/// embedder cannot build one.
fn tiny_store() -> CorpusStore {
    CorpusStore::build(
        vec![entry("Vomiting", "Repeated vomiting", Severity::Urgent, SpeciesScope::Dogs)],
        vec![vec![1.0, 0.0, 0.0]],
    )
    .unwrap()
}

#[tokio::test]
async fn query_before_load_is_empty_corpus() {
    let pipeline = offline_pipeline();
    let err = pipeline.analyze(&dog(), "dog vomiting twice").await.unwrap_err();
    assert_eq!(err, PipelineError::EmptyCorpus);
}

#[tokio::test]
async fn embedding_failure_is_service_unavailable() {
    let config = PipelineConfig::default();
    let pipeline = pipeline_with(&config, Arc::new(FailingEmbedder), Arc::new(DisabledGenerator));
    pipeline.corpus().publish(tiny_store());

    let err = pipeline.analyze(&dog(), "dog vomiting twice").await.unwrap_err();
    assert!(matches!(err, PipelineError::ServiceUnavailable(msg) if msg.contains("refused")));
}

#[tokio::test]
async fn embedding_timeout_is_service_unavailable() {
    let pipeline = pipeline_with(
        &short_timeouts(),
        Arc::new(StalledEmbedder),
        Arc::new(DisabledGenerator),
    );
    pipeline.corpus().publish(tiny_store());

    let err = pipeline.analyze(&dog(), "dog vomiting twice").await.unwrap_err();
    assert!(matches!(err, PipelineError::ServiceUnavailable(msg) if msg.contains("timed out")));
}

#[tokio::test]
async fn generation_timeout_falls_back() {
    let config = short_timeouts();
    let embedder = build_embedder(&config.semantic).unwrap();
    let pipeline = pipeline_with(&config, embedder, Arc::new(StalledGenerator));
    pipeline.load_entries(sample_corpus()).await.unwrap();

    let advisory = pipeline.advise(&dog(), "dog vomiting twice").await.unwrap();
    assert_eq!(advisory.fallback_reason, Some(FallbackReason::Timeout));
    assert!(advisory.result.is_fallback());
}

#[tokio::test]
async fn unparseable_generation_falls_back() {
    let pipeline = generating_pipeline("Sorry, I can't help with that.");
    pipeline.load_entries(sample_corpus()).await.unwrap();

    let advisory = pipeline.advise(&dog(), "dog vomiting twice").await.unwrap();
    assert_eq!(advisory.fallback_reason, Some(FallbackReason::MalformedOutput));
}

#[tokio::test]
async fn out_of_domain_generation_falls_back() {
    let reply = r#"{"summary": "s", "what_we_found": "w", "immediate_steps": ["a"],
        "home_care_tips": ["b"], "when_to_see_vet": "v", "urgency_level": "critical",
        "service_recommendation": "in_clinic", "confidence": "high"}"#;
    let pipeline = generating_pipeline(reply);
    pipeline.load_entries(sample_corpus()).await.unwrap();

    let advisory = pipeline.advise(&dog(), "dog vomiting twice").await.unwrap();
    assert_eq!(advisory.fallback_reason, Some(FallbackReason::MalformedOutput));
    assert_ne!(advisory.result.urgency_level.as_str(), "critical");
}

#[tokio::test]
async fn symbol_only_query_gets_a_no_match_fallback() {
    let pipeline = offline_pipeline();
    pipeline.load_entries(sample_corpus()).await.unwrap();

    let result = pipeline.analyze(&dog(), "🩸🩸🩸 !!! ???").await.unwrap();
    assert!(result.is_fallback());
    assert_eq!(result.query_metadata.num_matches, 0);
    assert_eq!(result.query_metadata.top_match_score, 0.0);
    assert_eq!(result.urgency_level, Severity::Routine);
    assert_eq!(result.confidence, Confidence::Low);
    assert!(!result.immediate_steps.is_empty());
}

#[tokio::test]
async fn symbol_only_emergency_query_stays_an_emergency() {
    let config = PipelineConfig::default();
    let embedder = build_embedder(&config.semantic).unwrap();
    let detector = EmergencyDetector::with_keywords(["🩸"]);
    let pipeline =
        pipeline_with(&config, embedder, Arc::new(DisabledGenerator)).with_detector(detector);
    pipeline.load_entries(sample_corpus()).await.unwrap();

    let result = pipeline.analyze(&dog(), "🩸🩸🩸 !!! ???").await.unwrap();
    assert_eq!(result.query_metadata.num_matches, 0);
    assert!(result.query_metadata.is_emergency);
    assert_eq!(result.urgency_level, Severity::Emergency);
    assert_eq!(result.confidence, Confidence::Low);
}

#[tokio::test]
async fn embedding_dimension_change_is_service_unavailable() {
    let config = PipelineConfig::default();
    let embedder = build_embedder(&config.semantic).unwrap();
    let pipeline = pipeline_with(&config, embedder, Arc::new(DisabledGenerator));
    // Corpus vectors have 3 dimensions; the embedder produces 384.
    pipeline.corpus().publish(tiny_store());

    let err = pipeline.analyze(&dog(), "dog vomiting twice").await.unwrap_err();
    assert!(matches!(err, PipelineError::ServiceUnavailable(msg) if msg.contains("dimensions")));
}

#[tokio::test]
async fn failed_reload_keeps_the_live_corpus() {
    let config = PipelineConfig::default();
    let pipeline = pipeline_with(&config, Arc::new(FailingEmbedder), Arc::new(DisabledGenerator));
    pipeline.corpus().publish(tiny_store());

    let err = pipeline.load_entries(sample_corpus()).await.unwrap_err();
    assert!(matches!(err, PipelineError::ServiceUnavailable(_)));
    assert_eq!(pipeline.corpus().snapshot().len(), 1);
}

#[tokio::test]
async fn missing_dataset_directory() {
    let pipeline = offline_pipeline();
    let err = pipeline
        .load_dataset_dir("/definitely/not/here")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Knowledge(KnowledgeError::DirectoryNotFound(_))
    ));
    assert!(!pipeline.is_ready());
}

#[tokio::test]
async fn dataset_with_only_invalid_records_is_empty_corpus() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(
        dir.path(),
        "general",
        r#"[{"symptom": "", "description": "x", "severity": "urgent", "species": "dogs"},
            {"symptom": "Cough", "description": "Dry cough", "severity": "mild", "species": "dogs"}]"#,
    );

    let pipeline = offline_pipeline();
    let err = pipeline.load_dataset_dir(dir.path()).await.unwrap_err();
    assert_eq!(err, PipelineError::EmptyCorpus);
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = PipelineConfig::default();
    config.generation.provider = "openai".into();
    assert!(matches!(
        Pipeline::from_config(&config),
        Err(PipelineError::Config(_))
    ));
}

#[test]
fn config_without_api_key_disables_generation() {
    let pipeline = Pipeline::from_config(&PipelineConfig::default()).unwrap();
    assert_eq!(pipeline.generator().model_name(), "disabled");
}
