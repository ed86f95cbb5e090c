//! Snoutiq Server - HTTP API for pet symptom analysis
//!
//! Wraps one [`snoutiq::Pipeline`] in an axum router. The pipeline is built
//! and loaded at startup, then shared by every handler through
//! [`ServerState`].
//!
//! # Endpoints
//!
//! Public:
//!
//! - `GET /` - service banner
//! - `GET /health` - liveness, with corpus size
//! - `GET /ready` - 200 once a corpus is loaded, 503 before
//! - `GET /metrics` - Prometheus text
//! - `POST /query` - alias of `POST /api/v1/query`
//!
//! API key required when keys are configured:
//!
//! - `POST /api/v1/query` - analyze symptoms
//! - `GET /api/v1/datasets/info` - corpus size, categories and models
//! - `POST /api/v1/datasets/reload` - rebuild the corpus from disk
//!
//! Errors are `{"success": false, "error": {"code", "message"}}`; see
//! [`ServerError`] for the status mapping.

pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use crate::config::ServerConfig;
pub use crate::error::{ServerError, ServerResult};
pub use crate::metrics::PrometheusMetrics;
pub use crate::server::{build_router, init_tracing, start_server};
pub use crate::state::ServerState;
