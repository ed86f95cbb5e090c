use std::sync::Arc;
use std::time::{Duration, Instant};

use advisor::{Advisory, FallbackReason};

use crate::PipelineError;

/// Observer for pipeline stage latency and outcomes.
///
/// Passed to [`Pipeline::with_metrics`](crate::Pipeline::with_metrics); the
/// server backs it with Prometheus counters, tests with plain atomics.
pub trait PipelineMetrics: Send + Sync {
    fn record_embedding(&self, latency: Duration, result: Result<(), &PipelineError>);
    fn record_retrieval(&self, latency: Duration, candidates: usize, matches: usize);
    fn record_advice(&self, latency: Duration, fallback: Option<FallbackReason>);
    fn record_analysis(&self, latency: Duration, result: Result<&Advisory, &PipelineError>);
}

/// Times one stage against an optional recorder.
pub(crate) struct MetricsSpan<'a> {
    recorder: &'a dyn PipelineMetrics,
    start: Instant,
}

impl<'a> MetricsSpan<'a> {
    pub(crate) fn start(recorder: Option<&'a Arc<dyn PipelineMetrics>>) -> Option<Self> {
        recorder.map(|recorder| Self {
            recorder: recorder.as_ref(),
            start: Instant::now(),
        })
    }

    pub(crate) fn record_embedding(self, result: Result<(), &PipelineError>) {
        self.recorder
            .record_embedding(self.start.elapsed(), result);
    }

    pub(crate) fn record_retrieval(self, candidates: usize, matches: usize) {
        self.recorder
            .record_retrieval(self.start.elapsed(), candidates, matches);
    }

    pub(crate) fn record_advice(self, fallback: Option<FallbackReason>) {
        self.recorder.record_advice(self.start.elapsed(), fallback);
    }

    pub(crate) fn record_analysis(self, result: Result<&Advisory, &PipelineError>) {
        self.recorder.record_analysis(self.start.elapsed(), result);
    }
}
