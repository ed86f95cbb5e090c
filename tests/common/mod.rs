#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use snoutiq::{
    build_embedder, DisabledGenerator, Embedder, GenerationError, GenerationService,
    KnowledgeEntry, Pipeline, PipelineConfig, SemanticError, Severity, SpeciesScope,
};

pub fn entry(
    title: &str,
    description: &str,
    severity: Severity,
    scope: SpeciesScope,
) -> KnowledgeEntry {
    KnowledgeEntry {
        symptom_title: title.into(),
        description: description.into(),
        severity,
        species_scope: scope,
        home_care_advice: "Keep your pet calm and hydrated. Offer small amounts of water".into(),
        vet_escalation_criteria: "If symptoms persist beyond a day or worsen".into(),
        service_recommendation: None,
        climate_notes: None,
        category: "general".into(),
    }
}

/// A small mixed corpus covering both species.
pub fn sample_corpus() -> Vec<KnowledgeEntry> {
    vec![
        entry(
            "Vomiting",
            "Dog vomiting food or bile repeatedly",
            Severity::Urgent,
            SpeciesScope::Dogs,
        ),
        entry(
            "Ear scratching",
            "Dog scratching ears and shaking head",
            Severity::Routine,
            SpeciesScope::Dogs,
        ),
        entry(
            "Sneezing",
            "Cat sneezing with watery eyes",
            Severity::Routine,
            SpeciesScope::Cats,
        ),
        entry(
            "Heavy bleeding",
            "Active bleeding from a wound that does not stop",
            Severity::Emergency,
            SpeciesScope::Both,
        ),
        entry(
            "Limping",
            "Limping or not putting weight on a leg",
            Severity::Urgent,
            SpeciesScope::Both,
        ),
    ]
}

pub fn pipeline_with(
    config: &PipelineConfig,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn GenerationService>,
) -> Pipeline {
    Pipeline::with_services(config, embedder, generator).expect("valid pipeline config")
}

/// Fast local embedder, generation disabled.
pub fn offline_pipeline() -> Pipeline {
    let config = PipelineConfig::default();
    let embedder = build_embedder(&config.semantic).expect("fast embedder");
    pipeline_with(&config, embedder, Arc::new(DisabledGenerator))
}

pub fn generating_pipeline(reply: &str) -> Pipeline {
    let config = PipelineConfig::default();
    let embedder = build_embedder(&config.semantic).expect("fast embedder");
    pipeline_with(&config, embedder, Arc::new(CannedGenerator(reply.to_string())))
}

pub fn write_dataset(dir: &Path, category: &str, json: &str) {
    std::fs::write(dir.join(format!("master_{category}_dataset.json")), json)
        .expect("write dataset file");
}

pub const GENERATED_ROUTINE: &str = r#"```json
{"summary": "Probably a mild stomach upset.",
 "what_we_found": "Vomiting once is often dietary.",
 "immediate_steps": ["Withhold food for a few hours", "Offer small sips of water"],
 "home_care_tips": ["Feed plain boiled rice once vomiting stops"],
 "when_to_see_vet": "If vomiting repeats or you see blood.",
 "urgency_level": "routine",
 "service_recommendation": "video_consult",
 "confidence": "high"}
```"#;

pub struct CannedGenerator(pub String);

#[async_trait]
impl GenerationService for CannedGenerator {
    fn model_name(&self) -> &str {
        "canned"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Ok(self.0.clone())
    }
}

pub struct StalledGenerator;

#[async_trait]
impl GenerationService for StalledGenerator {
    fn model_name(&self) -> &str {
        "stalled"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(GenerationError::EmptyResponse)
    }
}

/// Fails every call, like an unreachable provider.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    fn model_name(&self) -> &str {
        "failing"
    }

    fn dimension(&self) -> Option<usize> {
        None
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, SemanticError> {
        Err(SemanticError::Http("connection refused".into()))
    }
}

pub struct StalledEmbedder;

#[async_trait]
impl Embedder for StalledEmbedder {
    fn model_name(&self) -> &str {
        "stalled"
    }

    fn dimension(&self) -> Option<usize> {
        None
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, SemanticError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(SemanticError::Inference("unreachable".into()))
    }
}
