//! Metrics and Monitoring Adapters
//!
//! Provides Prometheus metrics and the health/board endpoints
//! (/live, /ready, /board, /metrics) via axum 0.7.

pub mod health;
pub mod prometheus;

pub use health::{HealthServer, HealthState};
pub use prometheus::MetricsRegistry;
