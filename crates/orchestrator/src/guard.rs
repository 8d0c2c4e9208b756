use std::sync::Arc;
use tracing::{debug, info, warn};
use wallet_actions_metrics::{ChainSwitchOutcome, MetricsCollector};
use wallet_actions_session::{SessionError, WalletSession};
use wallet_actions_types::ChainId;

use crate::ChainSwitchError;

/// Result of a chain precondition check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainCheck {
    /// The session was already on the required chain; nothing was sent
    AlreadyActive,
    /// The wallet switched from `from`
    Switched { from: ChainId },
}

impl ChainCheck {
    pub fn switched(&self) -> bool {
        matches!(self, ChainCheck::Switched { .. })
    }
}

/// Ensures the session is on a required chain before an action proceeds
pub struct ChainGuard {
    session: Arc<dyn WalletSession>,
    metrics: MetricsCollector,
}

impl ChainGuard {
    pub fn new(session: Arc<dyn WalletSession>) -> Self {
        Self {
            session,
            metrics: MetricsCollector::new(),
        }
    }

    /// Switch to `required` unless the session is already there
    ///
    /// The snapshot is re-read after the switch; a wallet that accepts the
    /// request but stays on another chain is treated as a failed switch.
    pub async fn ensure_chain(&self, required: ChainId) -> Result<ChainCheck, ChainSwitchError> {
        let snapshot = self.session.snapshot().await;
        if !snapshot.is_connected() {
            self.metrics.record_chain_check(ChainSwitchOutcome::Failed);
            return Err(ChainSwitchError {
                target: required,
                cause: SessionError::Unavailable,
            });
        }

        let from = snapshot.active_chain_id;
        if from == required {
            debug!(chain_id = required, "Already on required chain");
            self.metrics.record_chain_check(ChainSwitchOutcome::Skipped);
            return Ok(ChainCheck::AlreadyActive);
        }

        info!(from, chain_id = required, "Requesting chain switch");
        if let Err(cause) = self.session.switch_chain(required).await {
            warn!(chain_id = required, error = %cause, "Chain switch failed");
            self.metrics.record_chain_check(ChainSwitchOutcome::Failed);
            return Err(ChainSwitchError {
                target: required,
                cause,
            });
        }

        let active = self.session.snapshot().await.active_chain_id;
        if active != required {
            warn!(chain_id = required, active, "Wallet did not move to required chain");
            self.metrics.record_chain_check(ChainSwitchOutcome::Failed);
            return Err(ChainSwitchError {
                target: required,
                cause: SessionError::Transport(format!("wallet remained on chain {active}")),
            });
        }

        self.metrics.record_chain_check(ChainSwitchOutcome::Requested);
        Ok(ChainCheck::Switched { from })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallet_actions_session::{MockBehavior, MockWallet, WalletCall};

    const KEY: [u8; 32] = [0x42; 32];

    #[tokio::test]
    async fn test_fast_path_issues_no_switch() {
        let wallet = Arc::new(MockWallet::new(KEY, 8453).unwrap());
        let guard = ChainGuard::new(wallet.clone());

        let check = guard.ensure_chain(8453).await.unwrap();

        assert_eq!(check, ChainCheck::AlreadyActive);
        assert!(wallet.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_switches_when_on_other_chain() {
        let wallet = Arc::new(MockWallet::new(KEY, 1).unwrap());
        let guard = ChainGuard::new(wallet.clone());

        let check = guard.ensure_chain(8453).await.unwrap();

        assert_eq!(check, ChainCheck::Switched { from: 1 });
        assert_eq!(wallet.calls().await, vec![WalletCall::SwitchChain(8453)]);

        // second call takes the fast path
        assert_eq!(
            guard.ensure_chain(8453).await.unwrap(),
            ChainCheck::AlreadyActive
        );
        assert_eq!(wallet.calls().await.len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_switch_carries_cause() {
        let wallet = Arc::new(MockWallet::new(KEY, 1).unwrap());
        wallet
            .set_behavior(MockBehavior {
                switch_error: Some(SessionError::UserRejected),
                ..Default::default()
            })
            .await;
        let guard = ChainGuard::new(wallet.clone());

        let err = guard.ensure_chain(8453).await.unwrap_err();

        assert_eq!(err.target, 8453);
        assert_eq!(err.cause, SessionError::UserRejected);
    }

    #[tokio::test]
    async fn test_ignored_switch_is_failure() {
        let wallet = Arc::new(MockWallet::new(KEY, 1).unwrap());
        wallet
            .set_behavior(MockBehavior {
                ignore_switch: true,
                ..Default::default()
            })
            .await;
        let guard = ChainGuard::new(wallet.clone());

        let err = guard.ensure_chain(8453).await.unwrap_err();
        assert!(matches!(err.cause, SessionError::Transport(_)));
    }

    #[tokio::test]
    async fn test_disconnected_session_fails() {
        let wallet = Arc::new(MockWallet::disconnected(KEY, 1).unwrap());
        let guard = ChainGuard::new(wallet.clone());

        let err = guard.ensure_chain(8453).await.unwrap_err();
        assert_eq!(err.cause, SessionError::Unavailable);
        assert!(wallet.calls().await.is_empty());
    }
}
