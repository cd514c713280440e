//! The dispense pipeline.
//!
//! # Steps
//! ```text
//! destination text
//!     → parse address          (reject before touching the chain)
//!     → resolve funding account
//!     → ensure unlocked
//!     → gas price              (fallback: configured minimum)
//!     → gas estimate           (fallback: configured limit)
//!     → chain nonce → allocate (failure is surfaced)
//!     → sign (EIP-155)
//!     → broadcast              (nonce is not returned on failure)
//! ```

use alloy::primitives::{Address, TxHash};
use std::sync::Arc;

use crate::blockchain::gateway::{ChainGateway, KeyVault};
use crate::blockchain::transaction::TransactionIntent;
use crate::blockchain::types::{Account, CallSpec};
use crate::faucet::error::FaucetError;
use crate::faucet::fallback::Fallbacks;
use crate::faucet::session::FaucetSession;
use crate::observability::metrics;

/// Result of a successful broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispensed {
    pub destination: Address,
    pub nonce: u64,
    pub tx_hash: TxHash,
}

/// Sends the configured amount from the funding account to a destination.
pub struct DispensePipeline {
    gateway: Arc<dyn ChainGateway>,
    vault: Arc<dyn KeyVault>,
    session: Arc<FaucetSession>,
    fallbacks: Fallbacks,
}

impl DispensePipeline {
    pub fn new(
        gateway: Arc<dyn ChainGateway>,
        vault: Arc<dyn KeyVault>,
        session: Arc<FaucetSession>,
        fallbacks: Fallbacks,
    ) -> Self {
        Self {
            gateway,
            vault,
            session,
            fallbacks,
        }
    }

    pub fn session(&self) -> &FaucetSession {
        &self.session
    }

    /// Send one dispense to `destination`.
    pub async fn dispense(&self, destination: &str) -> Result<Dispensed, FaucetError> {
        let result = self.run(destination).await;
        match &result {
            Ok(_) => metrics::record_dispense("sent"),
            Err(e) => metrics::record_dispense(e.outcome()),
        }
        result
    }

    async fn run(&self, destination: &str) -> Result<Dispensed, FaucetError> {
        let to = parse_address(destination)?;
        let account = self.funding_account().await?;
        self.session
            .ensure_unlocked(self.vault.as_ref(), &account)
            .await?;

        let from = account.address;
        let value = self.session.amount();
        let gas_price = self
            .fallbacks
            .gas_price(self.gateway.suggest_gas_price().await);
        let call = CallSpec {
            from,
            to,
            value,
            gas_price,
        };
        let gas_limit = self
            .fallbacks
            .gas_limit(self.gateway.estimate_gas(&call).await);

        let nonces = self.session.nonces();
        nonces.ensure_ready(self.gateway.as_ref(), from).await?;
        let chain_nonce = self.gateway.nonce_at(from).await?;
        nonces.observe(chain_nonce);
        let nonce = nonces.allocate()?;

        let intent = TransactionIntent {
            to,
            value,
            nonce,
            gas_limit,
            gas_price,
            network_id: self.session.network_id().0,
        };
        let signed = self.vault.sign_transaction(&account, &intent).await?;

        let tx_hash = self
            .gateway
            .send_transaction(&signed)
            .await
            .map_err(|cause| {
                tracing::warn!(nonce, to = %to, error = %cause, "Broadcast failed, nonce skipped");
                FaucetError::SubmissionFailed { nonce, cause }
            })?;

        tracing::info!(
            to = %to,
            nonce,
            gas_price,
            gas_limit,
            tx_hash = %tx_hash,
            "Dispensed"
        );
        Ok(Dispensed {
            destination: to,
            nonce,
            tx_hash,
        })
    }

    /// One vault lookup; an empty vault surfaces as `WalletEmpty`.
    async fn funding_account(&self) -> Result<Account, FaucetError> {
        Ok(self.vault.find_account(self.session.funding()).await?)
    }
}

/// Parse a 20-byte hex address, with or without `0x`.
pub fn parse_address(text: &str) -> Result<Address, FaucetError> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(FaucetError::InvalidAddress(text.to_string()));
    }
    digits
        .parse()
        .map_err(|_| FaucetError::InvalidAddress(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_forms() {
        let expected = Address::repeat_byte(0xab);
        let bare = "abababababababababababababababababababab";
        assert_eq!(parse_address(bare).unwrap(), expected);
        assert_eq!(parse_address(&format!("0x{bare}")).unwrap(), expected);
        assert_eq!(parse_address(&format!("0X{}", bare.to_uppercase())).unwrap(), expected);
        assert_eq!(parse_address(&format!("  0x{bare} ")).unwrap(), expected);
    }

    #[test]
    fn test_parse_address_rejects() {
        for bad in ["", "0x", "0x1234", "hello", "0xzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz"] {
            assert!(
                matches!(parse_address(bad), Err(FaucetError::InvalidAddress(_))),
                "{bad:?} accepted"
            );
        }
    }
}
