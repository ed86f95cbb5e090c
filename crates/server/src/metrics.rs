//! Prometheus-backed pipeline metrics.

use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use snoutiq::{Advisory, FallbackReason, PipelineError, PipelineMetrics};

/// Installs the global Prometheus recorder. Call once, from the binary.
pub fn install_prometheus() -> anyhow::Result<PrometheusHandle> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

/// [`PipelineMetrics`] over the `metrics` facade.
///
/// Without an installed recorder every call is a no-op, so tests can use it
/// freely.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrometheusMetrics;

impl PipelineMetrics for PrometheusMetrics {
    fn record_embedding(&self, latency: Duration, result: Result<(), &PipelineError>) {
        histogram!("snoutiq_embedding_duration_seconds").record(latency.as_secs_f64());
        if let Err(err) = result {
            counter!("snoutiq_embedding_failures_total", "kind" => err.kind()).increment(1);
        }
    }

    fn record_retrieval(&self, latency: Duration, candidates: usize, matches: usize) {
        histogram!("snoutiq_retrieval_duration_seconds").record(latency.as_secs_f64());
        histogram!("snoutiq_retrieval_candidates").record(candidates as f64);
        histogram!("snoutiq_retrieval_matches").record(matches as f64);
    }

    fn record_advice(&self, latency: Duration, fallback: Option<FallbackReason>) {
        histogram!("snoutiq_advice_duration_seconds").record(latency.as_secs_f64());
        if let Some(reason) = fallback {
            counter!("snoutiq_fallback_total", "reason" => reason.as_str()).increment(1);
        }
    }

    fn record_analysis(&self, latency: Duration, result: Result<&Advisory, &PipelineError>) {
        histogram!("snoutiq_query_duration_seconds").record(latency.as_secs_f64());
        match result {
            Ok(advisory) => {
                counter!("snoutiq_queries_total", "outcome" => "ok").increment(1);
                if advisory.result.query_metadata.is_emergency {
                    counter!("snoutiq_emergency_total").increment(1);
                }
            }
            Err(err) => {
                counter!("snoutiq_queries_total", "outcome" => err.kind()).increment(1);
            }
        }
    }
}

/// Per-request HTTP counters, recorded by the logging middleware.
pub fn record_request(method: &str, route: &str, status: u16, latency: Duration) {
    counter!(
        "snoutiq_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("snoutiq_request_duration_seconds", "route" => route.to_string())
        .record(latency.as_secs_f64());
}
