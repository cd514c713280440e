//! Chain-specific types and error definitions.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use std::path::PathBuf;
use thiserror::Error;

/// Network identifier used for EIP-155 replay protection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkId(pub u64);

impl From<u64> for NetworkId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<NetworkId> for u64 {
    fn from(id: NetworkId) -> Self {
        id.0
    }
}

/// Errors raised by the chain gateway.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Endpoint URL could not be parsed.
    #[error("Invalid RPC URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors raised by the key vault.
#[derive(Debug, Clone, Error)]
pub enum VaultError {
    /// The keystore directory holds no accounts at all.
    #[error("Empty wallet, create account first")]
    WalletEmpty,

    /// No key file matches the requested address.
    #[error("Can NOT get the keystore file of address {0}")]
    AccountNotFound(Address),

    /// Passphrase did not decrypt the key file.
    #[error("could not decrypt key with given passphrase")]
    BadPassphrase,

    /// Account must be unlocked before signing.
    #[error("account {0} is locked")]
    Locked(Address),

    /// Keystore file I/O or format problem.
    #[error("keystore error: {0}")]
    Keystore(String),

    /// Signer rejected the transaction.
    #[error("signing failed: {0}")]
    Signing(String),
}

/// Result type for vault operations.
pub type VaultResult<T> = Result<T, VaultError>;

/// An account known to the key vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// On-chain address.
    pub address: Address,
    /// Encrypted key file backing this account, when it has one.
    pub keyfile: Option<PathBuf>,
}

impl Account {
    /// An account with no key material attached.
    pub fn watch_only(address: Address) -> Self {
        Self { address, keyfile: None }
    }
}

/// Inputs for a gas estimate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSpec {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub gas_price: u128,
}

/// A signed transaction ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// Transaction hash.
    pub hash: TxHash,
    /// EIP-2718 encoded bytes.
    pub raw: Bytes,
    /// Nonce the transaction was signed with.
    pub nonce: u64,
}
