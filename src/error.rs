use index::IndexError;
use knowledge::KnowledgeError;
use thiserror::Error;

/// Errors that abort a pipeline call.
///
/// Only two conditions stop a query outright: an empty corpus and an
/// unavailable embedding service. Generation problems never show up here;
/// the responder turns them into a fallback answer.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PipelineError {
    /// No knowledge entries are loaded, or a load produced none.
    #[error("corpus is empty; no knowledge entries are loaded")]
    EmptyCorpus,

    /// The embedding service failed or timed out.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The query is blank.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("dataset load failed: {0}")]
    Knowledge(#[from] KnowledgeError),

    #[error("index failure: {0}")]
    Index(#[source] IndexError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<IndexError> for PipelineError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::EmptyCorpus => PipelineError::EmptyCorpus,
            IndexError::Embedding(e) => {
                PipelineError::ServiceUnavailable(format!("embedding failed: {e}"))
            }
            other => PipelineError::Index(other),
        }
    }
}

impl PipelineError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::EmptyCorpus => "empty_corpus",
            PipelineError::ServiceUnavailable(_) => "service_unavailable",
            PipelineError::InvalidQuery(_) => "invalid_query",
            PipelineError::Config(_) => "config",
            PipelineError::Knowledge(_) => "knowledge",
            PipelineError::Index(_) => "index",
            PipelineError::Internal(_) => "internal",
        }
    }
}
