//! Seams to the remote chain node and the local key store.
//!
//! The dispense pipeline only talks to these traits, so tests can swap in
//! in-memory doubles and production wires the alloy client and keystore.

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use secrecy::Secret;

use crate::blockchain::transaction::TransactionIntent;
use crate::blockchain::types::{
    Account, CallSpec, GatewayResult, SignedTransaction, VaultResult,
};

/// Read chain state and broadcast transactions.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Network identifier for transaction signing.
    async fn network_id(&self) -> GatewayResult<u64>;

    /// Next nonce the node expects from `address`.
    async fn nonce_at(&self, address: Address) -> GatewayResult<u64>;

    /// Suggested gas price in wei.
    async fn suggest_gas_price(&self) -> GatewayResult<u128>;

    /// Gas needed for `call`.
    async fn estimate_gas(&self, call: &CallSpec) -> GatewayResult<u64>;

    /// Broadcast a signed transaction.
    async fn send_transaction(&self, tx: &SignedTransaction) -> GatewayResult<TxHash>;

    /// Balance of `address` in wei.
    async fn balance_at(&self, address: Address) -> GatewayResult<U256>;
}

/// Encrypted key storage with passphrase-gated signing.
#[async_trait]
pub trait KeyVault: Send + Sync {
    /// Every account with key material in the vault.
    async fn list_accounts(&self) -> VaultResult<Vec<Account>>;

    /// The account for `address`. Fails with `WalletEmpty` when the vault
    /// holds no accounts at all.
    async fn find_account(&self, address: Address) -> VaultResult<Account>;

    /// Decrypt the key for `account` and keep it for signing.
    async fn unlock(&self, account: &Account, passphrase: &Secret<String>) -> VaultResult<()>;

    /// Sign `intent` with the unlocked key of `account`.
    async fn sign_transaction(
        &self,
        account: &Account,
        intent: &TransactionIntent,
    ) -> VaultResult<SignedTransaction>;

    /// Create a fresh account protected by `passphrase`.
    async fn new_account(&self, passphrase: &Secret<String>) -> VaultResult<Account>;
}
