use tokio::sync::RwLock;
use tracing::{debug, warn};
use wallet_actions_types::{
    Address, Capability, ChainId, SessionCapabilities, SessionSnapshot, SessionStatus,
};

use crate::SessionError;

/// Session state held by a wallet transport
///
/// Mutated only by connect, disconnect and chain switch handling. Readers get
/// cloned snapshots.
pub struct SessionState {
    inner: RwLock<SessionSnapshot>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(SessionSnapshot::disconnected()),
        }
    }

    pub fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        Self {
            inner: RwLock::new(snapshot),
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.read().await.clone()
    }

    pub async fn status(&self) -> SessionStatus {
        self.inner.read().await.status
    }

    pub async fn active_chain_id(&self) -> ChainId {
        self.inner.read().await.active_chain_id
    }

    pub async fn primary_address(&self) -> Option<Address> {
        self.inner.read().await.primary_address()
    }

    pub async fn mark_connecting(&self) {
        let mut state = self.inner.write().await;
        state.status = if state.status == SessionStatus::Connected {
            SessionStatus::Reconnecting
        } else {
            SessionStatus::Connecting
        };
    }

    pub async fn mark_connected(
        &self,
        addresses: Vec<Address>,
        chain_id: ChainId,
        capabilities: SessionCapabilities,
    ) {
        let mut state = self.inner.write().await;
        debug!(chain_id, accounts = addresses.len(), "Wallet session connected");
        *state = SessionSnapshot::connected(addresses, chain_id).with_capabilities(capabilities);
    }

    pub async fn mark_disconnected(&self) {
        *self.inner.write().await = SessionSnapshot::disconnected();
    }

    pub async fn mark_error(&self, reason: &str) {
        warn!(reason = %reason, "Wallet session error");
        let mut state = self.inner.write().await;
        state.status = SessionStatus::Error;
    }

    /// Record the chain the wallet reports after a switch
    pub async fn set_active_chain(&self, chain_id: ChainId) {
        let mut state = self.inner.write().await;
        debug!(from = state.active_chain_id, to = chain_id, "Active chain changed");
        state.active_chain_id = chain_id;
    }

    /// Connected account, or `Unavailable` when there is none
    pub async fn require_address(&self) -> Result<Address, SessionError> {
        let state = self.inner.read().await;
        if !state.is_connected() {
            return Err(SessionError::Unavailable);
        }
        state.primary_address().ok_or(SessionError::Unavailable)
    }

    pub async fn require(&self, capability: Capability) -> Result<(), SessionError> {
        if self.inner.read().await.supports(capability) {
            Ok(())
        } else {
            Err(SessionError::Unsupported(format!("{capability:?}")))
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
