//! Core configuration structures for the wallet action orchestrator

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use wallet_actions_types::{ApprovalPolicy, ChainId, InFlightPolicy, BASE_CHAIN_ID};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Network configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// Known chains by name
    #[serde(default)]
    pub chains: HashMap<String, ChainConfig>,

    /// Chain required by chain-dependent actions
    #[serde(default = "default_chain")]
    pub default_chain: ChainId,

    /// Swap configuration
    #[serde(default)]
    pub swap: SwapConfig,

    /// Atomic batch configuration
    #[serde(default)]
    pub batch: BatchConfig,

    /// Action controller configuration
    #[serde(default)]
    pub controller: ControllerConfig,
}

/// Logging and metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable metrics collection
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

/// Configuration for an EVM chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Numeric chain id
    pub chain_id: ChainId,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,
}

/// Swap configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapConfig {
    /// Router contract address (hex)
    #[serde(default)]
    pub router: Option<String>,

    /// Seconds from request time until a swap leg expires
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,

    /// Handling of route plans that need token approvals
    #[serde(default)]
    pub approval_policy: ApprovalPolicy,
}

/// Atomic batch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Require the wallet to execute batches atomically
    #[serde(default = "default_true")]
    pub force_atomic: bool,
}

/// Action controller configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// What to do when an action is triggered while already running
    #[serde(default)]
    pub in_flight_policy: InFlightPolicy,
}

impl AppConfig {
    /// Look up a configured chain by its numeric id
    pub fn chain_by_id(&self, chain_id: ChainId) -> Option<(&str, &ChainConfig)> {
        self.chains
            .iter()
            .find(|(_, chain)| chain.chain_id == chain_id)
            .map(|(name, chain)| (name.as_str(), chain))
    }

    /// Ids of every configured chain, ascending
    pub fn chain_ids(&self) -> Vec<ChainId> {
        let mut ids: Vec<ChainId> = self.chains.values().map(|c| c.chain_id).collect();
        ids.sort_unstable();
        ids
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_chain() -> ChainId {
    BASE_CHAIN_ID
}

fn default_deadline_secs() -> u64 {
    600 // 10 minutes
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            chains: HashMap::new(),
            default_chain: default_chain(),
            swap: SwapConfig::default(),
            batch: BatchConfig::default(),
            controller: ControllerConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            metrics_enabled: default_true(),
        }
    }
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            router: None,
            deadline_secs: default_deadline_secs(),
            approval_policy: ApprovalPolicy::default(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            force_atomic: default_true(),
        }
    }
}
