//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! keystore directory (encrypted key files)
//!     → keystore.rs (list, unlock, sign)
//!     → transaction.rs (intent → signed EIP-155 transaction)
//!     → client.rs (RPC with timeouts and failover)
//! ```
//!
//! # Security Constraints
//! - Private keys never leave the keystore unencrypted on disk
//! - Never log passphrases or key material
//! - All RPC calls have a fixed timeout

pub mod client;
pub mod gateway;
pub mod keystore;
pub mod transaction;
pub mod types;

pub use client::BlockchainClient;
pub use gateway::{ChainGateway, KeyVault};
pub use keystore::KeystoreVault;
pub use transaction::TransactionIntent;
pub use types::{Account, CallSpec, GatewayError, NetworkId, SignedTransaction, VaultError};
