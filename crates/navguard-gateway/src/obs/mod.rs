//! Lightweight in-process metrics, rendered by the `/metrics` handler in
//! Prometheus text format.

pub mod metrics;
