use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use advisor::{build_generator, AnalysisResult, Advisory, GenerationService, Responder};
use index::{CorpusHandle, CorpusStore, IndexError};
use knowledge::{KnowledgeEntry, SubjectProfile};
use matcher::Ranker;
use query::{EmergencyDetector, QueryExpander};
use semantic::{build_embedder, Embedder, SemanticError};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::metrics::{MetricsSpan, PipelineMetrics};
use crate::PipelineError;

/// What a corpus load published.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorpusSummary {
    pub entries: usize,
    /// Entry counts per category, in load order.
    pub categories: Vec<(String, usize)>,
    /// One message per record the loader rejected.
    pub rejected: Vec<String>,
    /// One message per dataset file that could not be read or parsed.
    pub skipped_files: Vec<String>,
}

/// The end-to-end query path: expand, detect, embed, search, rank, respond.
///
/// A `Pipeline` is built once and shared (usually behind an `Arc`) by every
/// request. The corpus lives in a [`CorpusHandle`], so a reload swaps in a
/// fully built store while in-flight queries finish on the one they started
/// with.
pub struct Pipeline {
    embedder: Arc<dyn Embedder>,
    corpus: CorpusHandle,
    expander: QueryExpander,
    detector: EmergencyDetector,
    ranker: Ranker,
    responder: Responder,
    embed_timeout: Duration,
    metrics: Option<Arc<dyn PipelineMetrics>>,
}

impl Pipeline {
    /// Builds the embedder and generator `config` describes.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        config
            .validate()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        let embedder =
            build_embedder(&config.semantic).map_err(|e| PipelineError::Config(e.to_string()))?;
        let generator = build_generator(&config.generation)
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        Self::with_services(config, embedder, generator)
    }

    /// Uses the given services instead of building them from config.
    pub fn with_services(
        config: &PipelineConfig,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn GenerationService>,
    ) -> Result<Self, PipelineError> {
        config
            .validate()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        let ranker =
            Ranker::new(config.ranking.clone()).map_err(|e| PipelineError::Config(e.to_string()))?;

        Ok(Self {
            embedder,
            corpus: CorpusHandle::default(),
            expander: QueryExpander::default(),
            detector: EmergencyDetector::default(),
            ranker,
            responder: Responder::new(
                generator,
                config.context.clone(),
                config.timeouts.generation(),
            ),
            embed_timeout: config.timeouts.embed(),
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn PipelineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_expander(mut self, expander: QueryExpander) -> Self {
        self.expander = expander;
        self
    }

    pub fn with_detector(mut self, detector: EmergencyDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn corpus(&self) -> &CorpusHandle {
        &self.corpus
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    pub fn generator(&self) -> &dyn GenerationService {
        self.responder.generator()
    }

    pub fn ranker(&self) -> &Ranker {
        &self.ranker
    }

    /// True once a non-empty corpus has been published.
    pub fn is_ready(&self) -> bool {
        self.corpus.is_loaded()
    }

    /// Embeds `entries` and publishes them as the new corpus.
    ///
    /// The previous corpus stays live until the new one is fully built, and
    /// stays live for good if this fails. An empty list is refused.
    pub async fn load_entries(
        &self,
        entries: Vec<KnowledgeEntry>,
    ) -> Result<CorpusSummary, PipelineError> {
        if entries.is_empty() {
            return Err(PipelineError::EmptyCorpus);
        }
        let store = CorpusStore::embed_and_build(entries, self.embedder.as_ref()).await?;
        let summary = CorpusSummary {
            entries: store.len(),
            categories: store.categories(),
            ..CorpusSummary::default()
        };
        self.corpus.publish(store);
        Ok(summary)
    }

    /// Loads every dataset file in `dir` and publishes the result.
    ///
    /// Rejected records and skipped files are reported, not fatal. A
    /// directory that yields no valid entries is [`PipelineError::EmptyCorpus`].
    pub async fn load_dataset_dir(
        &self,
        dir: impl AsRef<Path>,
    ) -> Result<CorpusSummary, PipelineError> {
        let dir: PathBuf = dir.as_ref().to_path_buf();
        let report = tokio::task::spawn_blocking(move || knowledge::load_dataset_dir(dir))
            .await
            .map_err(|e| PipelineError::Internal(format!("dataset loader panicked: {e}")))??;

        let rejected: Vec<String> = report.rejected.iter().map(ToString::to_string).collect();
        let skipped_files: Vec<String> =
            report.skipped_files.iter().map(ToString::to_string).collect();

        let summary = self.load_entries(report.entries).await?;
        info!(
            entries = summary.entries,
            categories = summary.categories.len(),
            rejected = rejected.len(),
            skipped_files = skipped_files.len(),
            "corpus_loaded"
        );
        Ok(CorpusSummary {
            rejected,
            skipped_files,
            ..summary
        })
    }

    /// Runs one query and returns the validated result.
    pub async fn analyze(
        &self,
        profile: &SubjectProfile,
        query: &str,
    ) -> Result<AnalysisResult, PipelineError> {
        self.advise(profile, query).await.map(|a| a.result)
    }

    /// Like [`Pipeline::analyze`], but also says whether the fallback
    /// produced the answer and why.
    pub async fn advise(
        &self,
        profile: &SubjectProfile,
        query: &str,
    ) -> Result<Advisory, PipelineError> {
        let span = MetricsSpan::start(self.metrics.as_ref());
        let outcome = self.run(profile, query).await;
        if let Some(span) = span {
            span.record_analysis(outcome.as_ref());
        }
        if let Err(err) = &outcome {
            warn!(error = %err, kind = err.kind(), "analysis_failed");
        }
        outcome
    }

    async fn run(&self, profile: &SubjectProfile, query: &str) -> Result<Advisory, PipelineError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PipelineError::InvalidQuery("query is empty".into()));
        }
        let corpus = self.corpus.snapshot();
        if corpus.is_empty() {
            return Err(PipelineError::EmptyCorpus);
        }

        let expanded = self.expander.expand(query);
        let is_emergency = self.detector.detect(query);
        let species = profile.normalized_species();
        debug!(
            expanded_chars = expanded.chars().count(),
            is_emergency,
            species = species.map(|s| s.as_str()).unwrap_or("unknown"),
            "query_prepared"
        );

        let matches = match self.embed_query(&expanded).await? {
            Some(vector) => {
                let span = MetricsSpan::start(self.metrics.as_ref());
                let candidates = corpus
                    .search(&vector, self.ranker.config().candidate_count())
                    .map_err(search_error)?;
                let matches = self.ranker.rank(&candidates, species, query);
                if let Some(span) = span {
                    span.record_retrieval(candidates.len(), matches.len());
                }
                matches
            }
            None => {
                debug!("query_not_embeddable");
                Vec::new()
            }
        };

        let span = MetricsSpan::start(self.metrics.as_ref());
        let advisory = self
            .responder
            .respond(profile, query, &matches, is_emergency)
            .await;
        if let Some(span) = span {
            span.record_advice(advisory.fallback_reason);
        }

        info!(
            matches = matches.len(),
            is_emergency,
            urgency = %advisory.result.urgency_level,
            fallback = advisory.fallback_reason.map(|r| r.as_str()).unwrap_or("none"),
            "analysis_complete"
        );
        Ok(advisory)
    }

    /// `Ok(None)` when the query has no text the embedder can use; the
    /// request then continues with no matches.
    async fn embed_query(&self, text: &str) -> Result<Option<Vec<f32>>, PipelineError> {
        let span = MetricsSpan::start(self.metrics.as_ref());
        let result = match tokio::time::timeout(self.embed_timeout, self.embedder.embed(text)).await
        {
            Ok(Ok(vector)) => Ok(Some(vector)),
            Ok(Err(SemanticError::EmptyInput)) => Ok(None),
            Ok(Err(err)) => Err(PipelineError::ServiceUnavailable(format!(
                "embedding failed: {err}"
            ))),
            Err(_) => Err(PipelineError::ServiceUnavailable(format!(
                "embedding timed out after {} ms",
                self.embed_timeout.as_millis()
            ))),
        };
        if let Some(span) = span {
            span.record_embedding(result.as_ref().map(|_| ()));
        }
        result
    }
}

/// A query vector whose length differs from the corpus means the embedding
/// service changed shape under a loaded corpus.
fn search_error(err: IndexError) -> PipelineError {
    match err {
        IndexError::DimensionMismatch { expected, actual } => {
            PipelineError::ServiceUnavailable(format!(
                "embedding service returned {actual} dimensions, corpus expects {expected}"
            ))
        }
        other => other.into(),
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("embedder", &self.embedder.model_name())
            .field("generator", &self.responder.generator().model_name())
            .field("corpus_entries", &self.corpus.snapshot().len())
            .field("ranker", &self.ranker)
            .field("embed_timeout", &self.embed_timeout)
            .finish()
    }
}
