use wallet_actions_config::{validate_address, validate_config, AppConfig, ConfigError};
use wallet_actions_types::{ChainId, InFlightPolicy, BASE_CHAIN_ID};

use crate::SwapSettings;

/// Runtime settings for the action controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Chain that chain-dependent actions require
    pub default_chain: ChainId,
    /// Chains actions may target; empty allows any positive id
    pub known_chains: Vec<ChainId>,
    /// Refuse batches the wallet cannot execute atomically
    pub force_atomic: bool,
    pub in_flight_policy: InFlightPolicy,
    pub swap: SwapSettings,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            default_chain: BASE_CHAIN_ID,
            known_chains: Vec::new(),
            force_atomic: true,
            in_flight_policy: InFlightPolicy::Queue,
            swap: SwapSettings::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Whether actions may target `chain_id`
    pub fn allows_chain(&self, chain_id: ChainId) -> bool {
        chain_id != 0 && (self.known_chains.is_empty() || self.known_chains.contains(&chain_id))
    }

    /// Validate a loaded config and convert it to runtime settings
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ConfigError> {
        validate_config(config)?;

        let router = config
            .swap
            .router
            .as_deref()
            .map(validate_address)
            .transpose()
            .map_err(|e| ConfigError::ValidationError(format!("swap.router: {e}")))?;

        Ok(Self {
            default_chain: config.default_chain,
            known_chains: config.chain_ids(),
            force_atomic: config.batch.force_atomic,
            in_flight_policy: config.controller.in_flight_policy,
            swap: SwapSettings {
                router,
                deadline_secs: config.swap.deadline_secs,
                approval_policy: config.swap.approval_policy,
            },
        })
    }
}
