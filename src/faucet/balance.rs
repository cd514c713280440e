//! Balance lookups.

use alloy::primitives::{Address, U256};
use std::sync::Arc;

use crate::blockchain::gateway::ChainGateway;
use crate::faucet::error::FaucetError;
use crate::faucet::pipeline::parse_address;
use crate::observability::metrics;
use crate::units::{format_amount, DisplayAmount};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub address: Address,
    pub wei: U256,
    /// Auto-selected unit: WEI below one NEW, NEW otherwise.
    pub display: DisplayAmount,
}

/// Reads balances through the chain gateway.
pub struct BalanceQuery {
    gateway: Arc<dyn ChainGateway>,
}

impl BalanceQuery {
    pub fn new(gateway: Arc<dyn ChainGateway>) -> Self {
        Self { gateway }
    }

    pub async fn balance(&self, address: &str) -> Result<Balance, FaucetError> {
        let result = self.lookup(address).await;
        metrics::record_balance_query(if result.is_ok() { "ok" } else { "error" });
        result
    }

    async fn lookup(&self, address: &str) -> Result<Balance, FaucetError> {
        let address = parse_address(address)?;
        let wei = self.gateway.balance_at(address).await?;
        Ok(Balance {
            address,
            wei,
            display: format_amount(wei, None),
        })
    }
}
