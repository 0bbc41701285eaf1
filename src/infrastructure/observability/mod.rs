//! Prometheus observability for rustcast
//!
//! Metrics are kept in a private registry and rendered on demand by the `/metrics` route.

pub mod latency_tracker;
pub mod metrics;

pub use latency_tracker::LatencyGuard;
pub use metrics::Metrics;
