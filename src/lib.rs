//! Wallet action orchestration
//!
//! Sequences a connected wallet session through chain preconditions,
//! signing, transactions, atomic call batches and multi-step swaps.
//!
//! The member crates are re-exported here:
//!
//! - [`types`]: shared data model, signing payloads and signature recovery
//! - [`session`]: the wallet session capability set and test doubles
//! - [`router`]: route planning and router multicall execution
//! - [`orchestrator`]: guard, executors, swap flow and the action controller
//! - [`config`]: configuration loading and validation
//! - [`metrics`]: prometheus metrics and tracing setup

use std::sync::Arc;

pub use wallet_actions_config as config;
pub use wallet_actions_metrics as metrics;
pub use wallet_actions_orchestrator as orchestrator;
pub use wallet_actions_router as router;
pub use wallet_actions_session as session;
pub use wallet_actions_types as types;

pub use wallet_actions_orchestrator::{
    ActionController, ActionControllerBuilder, OrchestratorConfig, SlotState, SwapParams,
};
pub use wallet_actions_types::{ActionError, ActionErrorKind, ActionKind, ActionResult};

/// Install tracing as configured under `network`
///
/// `log_level` becomes the default filter (`RUST_LOG` still wins). With
/// `metrics_enabled` the error-counting layer is added and its collector is
/// returned for exporting.
pub fn init_observability(
    config: &config::AppConfig,
) -> Result<Option<Arc<metrics::MetricsCollector>>, metrics::TracingError> {
    let filter = config.network.log_level.to_lowercase();
    if !config.network.metrics_enabled {
        metrics::init_tracing(Some(&filter))?;
        return Ok(None);
    }

    let collector = Arc::new(metrics::MetricsCollector::new());
    metrics::init_tracing_with_metrics(collector.clone(), Some(&filter))?;
    Ok(Some(collector))
}
