use std::sync::Arc;
use tracing::{field::Visit, Event, Level, Subscriber};
use tracing_subscriber::{
    fmt,
    layer::{Context, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};
use wallet_actions_types::ActionKind;

use crate::collector::MetricsCollector;

pub const DEFAULT_FILTER: &str = "info,wallet_actions=debug";

fn env_filter(default_filter: Option<&str>) -> Result<EnvFilter, TracingError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter.unwrap_or(DEFAULT_FILTER)))
        .map_err(|e| TracingError::InitError(e.to_string()))
}

/// Initialize JSON tracing without the metrics layer
pub fn init_tracing(default_filter: Option<&str>) -> Result<(), TracingError> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .json();

    tracing_subscriber::registry()
        .with(env_filter(default_filter)?)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| TracingError::InitError(e.to_string()))
}

/// Initialize tracing with metrics integration
///
/// `RUST_LOG` takes precedence; otherwise `default_filter` (or
/// [`DEFAULT_FILTER`]) applies.
pub fn init_tracing_with_metrics(
    collector: Arc<MetricsCollector>,
    default_filter: Option<&str>,
) -> Result<(), TracingError> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .json();

    let metrics_layer = MetricsLayer::new(collector);

    tracing_subscriber::registry()
        .with(env_filter(default_filter)?)
        .with(fmt_layer)
        .with(metrics_layer)
        .try_init()
        .map_err(|e| TracingError::InitError(e.to_string()))?;

    Ok(())
}

/// Tracing layer that counts error events per action and error kind
pub struct MetricsLayer {
    collector: Arc<MetricsCollector>,
}

impl MetricsLayer {
    pub fn new(collector: Arc<MetricsCollector>) -> Self {
        Self { collector }
    }
}

impl<S> Layer<S> for MetricsLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::ERROR {
            return;
        }

        let mut visitor = MetricsVisitor::default();
        event.record(&mut visitor);

        if let (Some(action), Some(kind)) = (visitor.action, visitor.error_kind) {
            self.collector.record_action_error(&action, &kind);
        }
    }
}

/// Visitor to extract metrics-relevant fields from events
#[derive(Default)]
struct MetricsVisitor {
    action: Option<String>,
    error_kind: Option<String>,
}

impl MetricsVisitor {
    fn set(&mut self, name: &str, value: String) {
        match name {
            "action" => self.action = Some(value),
            "error_kind" => self.error_kind = Some(value),
            _ => {}
        }
    }
}

impl Visit for MetricsVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.set(field.name(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.set(field.name(), value.to_string());
    }
}

/// Correlation ID for tracking one action invocation across components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationId(uuid::Uuid);

impl CorrelationId {
    /// Generate a new correlation ID
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Get the correlation ID as a string
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Span context for one action invocation
#[derive(Debug, Clone)]
pub struct ActionSpan {
    pub correlation_id: CorrelationId,
    pub action: ActionKind,
    pub invocation_id: u64,
}

impl ActionSpan {
    pub fn new(action: ActionKind, invocation_id: u64) -> Self {
        Self {
            correlation_id: CorrelationId::new(),
            action,
            invocation_id,
        }
    }

    /// Tracing span to instrument the invocation future with
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "action",
            correlation_id = %self.correlation_id,
            action = %self.action,
            invocation_id = self.invocation_id,
        )
    }
}

/// Tracing error types
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("tracing initialization error: {0}")]
    InitError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_id_generation() {
        let id1 = CorrelationId::new();
        let id2 = CorrelationId::new();

        assert_ne!(id1, id2);
        assert_eq!(id1.as_str().len(), 36);
    }

    #[test]
    fn test_action_span_creation() {
        let span = ActionSpan::new(ActionKind::Swap, 7);

        assert_eq!(span.action, ActionKind::Swap);
        assert_eq!(span.invocation_id, 7);
    }

    #[test]
    fn test_metrics_visitor_picks_action_fields() {
        let mut visitor = MetricsVisitor::default();
        visitor.set("action", "swap".to_string());
        visitor.set("error_kind", "planning_error".to_string());
        visitor.set("message", "ignored".to_string());

        assert_eq!(visitor.action.as_deref(), Some("swap"));
        assert_eq!(visitor.error_kind.as_deref(), Some("planning_error"));
    }
}
