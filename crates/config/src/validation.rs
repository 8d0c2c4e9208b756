//! Configuration validation

use crate::{AppConfig, ChainConfig, ConfigError, Result};
use std::collections::HashMap;
use wallet_actions_types::Address;

/// Validation error details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate the entire application configuration
///
/// Collects every problem before failing.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let mut errors = Vec::new();

    // Validate network config
    if let Err(e) = validate_log_level(&config.network.log_level) {
        errors.push(e);
    }

    // Validate chains
    let mut seen: HashMap<u64, &str> = HashMap::new();
    for (chain_name, chain_config) in &config.chains {
        if let Err(e) = validate_chain_config(chain_config) {
            errors.push(ValidationError::new(format!("chains.{chain_name}"), e));
        }

        if let Some(other) = seen.insert(chain_config.chain_id, chain_name.as_str()) {
            errors.push(ValidationError::new(
                format!("chains.{chain_name}.chain_id"),
                format!(
                    "chain id {} already used by '{other}'",
                    chain_config.chain_id
                ),
            ));
        }
    }

    if config.default_chain == 0 {
        errors.push(ValidationError::new(
            "default_chain",
            "must be greater than 0",
        ));
    } else if !config.chains.is_empty() && config.chain_by_id(config.default_chain).is_none() {
        errors.push(ValidationError::new(
            "default_chain",
            format!(
                "chain {} not found in chains config",
                config.default_chain
            ),
        ));
    }

    // Validate swap config
    if let Some(router) = &config.swap.router {
        if let Err(e) = validate_address(router) {
            errors.push(ValidationError::new("swap.router", e));
        }
    }

    if config.swap.deadline_secs == 0 {
        errors.push(ValidationError::new(
            "swap.deadline_secs",
            "must be greater than 0",
        ));
    }

    // Return all errors if any were found
    if !errors.is_empty() {
        let error_msg = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ConfigError::ValidationError(error_msg));
    }

    Ok(())
}

/// Validate a chain configuration
pub fn validate_chain_config(chain: &ChainConfig) -> std::result::Result<(), String> {
    if chain.chain_id == 0 {
        return Err("chain_id must be greater than 0".to_string());
    }

    if chain.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        return Err("name must not be blank".to_string());
    }

    Ok(())
}

/// Validate a hex account or contract address
pub fn validate_address(value: &str) -> std::result::Result<Address, String> {
    let address = value
        .parse::<Address>()
        .map_err(|e| format!("invalid address '{value}': {e}"))?;

    if address == Address::ZERO {
        return Err("address must not be zero".to_string());
    }

    Ok(address)
}

/// Validate log level
fn validate_log_level(level: &str) -> std::result::Result<(), ValidationError> {
    match level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ValidationError::new(
            "network.log_level",
            format!(
                "invalid log level '{level}', must be one of: trace, debug, info, warn, error"
            ),
        )),
    }
}
