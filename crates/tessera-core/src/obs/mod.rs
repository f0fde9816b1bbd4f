//! Observability: model telemetry (metrics) and sink abstractions.
//!
//! Counters are thread-local. Diagnostic text goes through `tracing`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{ModelReport, ModelTotals, OwnerCounters};
pub use sink::{ModelEvent, ModelSink, model_report, model_reset_all, with_model_sink};
