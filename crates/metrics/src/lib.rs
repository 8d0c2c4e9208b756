//! Metrics and tracing for wallet action orchestration
//!
//! Counters and histograms are registered in the default Prometheus registry
//! and rendered on demand with [`MetricsCollector::export_metrics`]. Tracing
//! setup installs a JSON formatter plus a layer that counts error events per
//! action.
//!
//! # Example
//!
//! ```no_run
//! use wallet_actions_metrics::{init_tracing_with_metrics, MetricsCollector};
//! use std::sync::Arc;
//!
//! let collector = Arc::new(MetricsCollector::new());
//! init_tracing_with_metrics(collector.clone(), None).unwrap();
//! println!("{}", collector.export_metrics().unwrap());
//! ```

pub mod collector;
pub mod metrics;
pub mod tracing;

pub use collector::{ActionOutcome, ChainSwitchOutcome, MetricsCollector, MetricsError};
pub use tracing::{
    init_tracing, init_tracing_with_metrics, ActionSpan, CorrelationId, MetricsLayer, TracingError,
    DEFAULT_FILTER,
};
