//! Defaults substituted when the node cannot answer.
//!
//! Gas price, gas limit and network id queries never fail a dispense. A
//! failed query is logged, counted and replaced by the configured value.

use std::fmt::Display;

use crate::blockchain::types::{GatewayResult, NetworkId};
use crate::config::ChainConfig;
use crate::observability::metrics;

/// Which query fell back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackKind {
    GasPrice,
    GasLimit,
    NetworkId,
}

impl FallbackKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FallbackKind::GasPrice => "gas_price",
            FallbackKind::GasLimit => "gas_limit",
            FallbackKind::NetworkId => "network_id",
        }
    }
}

/// Substitute values for failed chain queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fallbacks {
    pub min_gas_price: u128,
    pub gas_limit: u64,
    pub network_id: u64,
}

impl Default for Fallbacks {
    fn default() -> Self {
        Self {
            min_gas_price: 1,
            gas_limit: 21000,
            network_id: 16888,
        }
    }
}

impl From<&ChainConfig> for Fallbacks {
    fn from(config: &ChainConfig) -> Self {
        Self {
            min_gas_price: config.min_gas_price_wei,
            gas_limit: config.default_gas_limit,
            network_id: config.default_network_id,
        }
    }
}

impl Fallbacks {
    pub fn gas_price(&self, observed: GatewayResult<u128>) -> u128 {
        resolve(observed, FallbackKind::GasPrice, self.min_gas_price)
    }

    pub fn gas_limit(&self, observed: GatewayResult<u64>) -> u64 {
        resolve(observed, FallbackKind::GasLimit, self.gas_limit)
    }

    pub fn network_id(&self, observed: GatewayResult<u64>) -> NetworkId {
        NetworkId(resolve(observed, FallbackKind::NetworkId, self.network_id))
    }
}

fn resolve<T: Display>(observed: GatewayResult<T>, kind: FallbackKind, substitute: T) -> T {
    match observed {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(
                kind = kind.as_str(),
                error = %e,
                substitute = %substitute,
                "Chain query failed, using default"
            );
            metrics::record_fallback(kind.as_str());
            substitute
        }
    }
}
