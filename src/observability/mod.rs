//! # Observability
//!
//! Prometheus metrics for the controller. Structured logging is configured
//! in `main` via `tracing_subscriber`.

pub mod metrics;
