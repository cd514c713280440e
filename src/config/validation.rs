//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Funding address, unit and amount must parse
//! - Validate value ranges (timeouts > 0, addresses valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FaucetConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::Address;
use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::FaucetConfig;
use crate::units::{to_smallest_unit, Denomination};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check `config` and collect every problem found.
pub fn validate_config(config: &FaucetConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.faucet.from.trim().is_empty() {
        errors.push(ValidationError::new("faucet.from", "required funding address not set"));
    } else if config.faucet.from.trim().parse::<Address>().is_err() {
        errors.push(ValidationError::new(
            "faucet.from",
            format!("'{}' is not a hex-encoded address", config.faucet.from),
        ));
    }

    match config.faucet.unit.parse::<Denomination>() {
        Ok(unit) => {
            if let Err(e) = to_smallest_unit(&config.faucet.amount, unit) {
                errors.push(ValidationError::new("faucet.amount", e.to_string()));
            }
        }
        Err(e) => errors.push(ValidationError::new(
            "faucet.unit",
            format!("{}. {}.", e, Denomination::available()),
        )),
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.chain.rpc_url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::new(
            "chain.rpc_url",
            format!("'{}' is not a URL", config.chain.rpc_url),
        ));
    }

    if config.chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("chain.rpc_timeout_secs", "must be greater than zero"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than zero"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
