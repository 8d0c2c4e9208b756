use serde::{Deserialize, Serialize};

use crate::{Address, ChainId};

/// Connection status of a wallet session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    Error,
}

/// Optional wallet capabilities the orchestrator checks before relying on them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capability {
    /// Wallet accepts call batches flagged as atomic
    AtomicBatch,
    /// Wallet can block until a batch reaches a final status
    BatchStatusWait,
    /// Wallet supports the sign-in extension of `connect`
    SignIn,
}

/// Capability flags reported by the wallet on connect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCapabilities {
    pub atomic_batch: bool,
    pub batch_status_wait: bool,
    pub sign_in: bool,
}

impl Default for SessionCapabilities {
    fn default() -> Self {
        Self {
            atomic_batch: true,
            batch_status_wait: true,
            sign_in: false,
        }
    }
}

/// Point-in-time view of a wallet session
///
/// Owned by the wallet transport. The orchestrator reads a fresh snapshot per
/// invocation and never caches it beyond that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub addresses: Vec<Address>,
    pub active_chain_id: ChainId,
    pub capabilities: SessionCapabilities,
}

impl SessionSnapshot {
    pub fn disconnected() -> Self {
        Self {
            status: SessionStatus::Disconnected,
            addresses: Vec::new(),
            active_chain_id: 0,
            capabilities: SessionCapabilities::default(),
        }
    }

    pub fn connected(addresses: Vec<Address>, active_chain_id: ChainId) -> Self {
        Self {
            status: SessionStatus::Connected,
            addresses,
            active_chain_id,
            capabilities: SessionCapabilities::default(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: SessionCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn is_connected(&self) -> bool {
        self.status == SessionStatus::Connected
    }

    /// The account that signs and submits on behalf of the user
    pub fn primary_address(&self) -> Option<Address> {
        self.addresses.first().copied()
    }

    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::AtomicBatch => self.capabilities.atomic_batch,
            Capability::BatchStatusWait => self.capabilities.batch_status_wait,
            Capability::SignIn => self.capabilities.sign_in,
        }
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::disconnected()
    }
}
