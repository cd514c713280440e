//! Faucet error type.

use alloy::primitives::Address;
use thiserror::Error;

use crate::blockchain::types::{GatewayError, VaultError};
use crate::faucet::nonce::NonceError;
use crate::units::ConversionError;

/// Everything that can stop a dispense or balance request.
#[derive(Debug, Error)]
pub enum FaucetError {
    #[error("Not valid hex-encoded address: '{0}'")]
    InvalidAddress(String),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("Empty wallet, create account first")]
    WalletEmpty,

    #[error("Can NOT get the keystore file of address {0}")]
    AccountNotFound(Address),

    #[error("unlock account {address} failed: {reason}")]
    UnlockFailed { address: Address, reason: String },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Nonce(#[from] NonceError),

    #[error("sign transaction failed: {0}")]
    Signing(String),

    /// Broadcast rejected. The nonce stays consumed.
    #[error("SendTransaction error: {cause}")]
    SubmissionFailed { nonce: u64, cause: GatewayError },

    #[error(transparent)]
    Vault(VaultError),
}

impl From<VaultError> for FaucetError {
    fn from(err: VaultError) -> Self {
        match err {
            VaultError::WalletEmpty => FaucetError::WalletEmpty,
            VaultError::AccountNotFound(address) => FaucetError::AccountNotFound(address),
            VaultError::Signing(reason) => FaucetError::Signing(reason),
            other => FaucetError::Vault(other),
        }
    }
}

impl FaucetError {
    /// Metric label for this failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            FaucetError::InvalidAddress(_) => "invalid_address",
            FaucetError::Conversion(_) => "conversion",
            FaucetError::WalletEmpty | FaucetError::AccountNotFound(_) => "no_account",
            FaucetError::UnlockFailed { .. } => "unlock_failed",
            FaucetError::Gateway(_) => "rpc_error",
            FaucetError::Nonce(_) => "nonce",
            FaucetError::Signing(_) | FaucetError::Vault(_) => "signing",
            FaucetError::SubmissionFailed { .. } => "submission_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_errors_mapped() {
        assert!(matches!(
            FaucetError::from(VaultError::WalletEmpty),
            FaucetError::WalletEmpty
        ));
        assert!(matches!(
            FaucetError::from(VaultError::Signing("bad".into())),
            FaucetError::Signing(_)
        ));
        assert!(matches!(
            FaucetError::from(VaultError::BadPassphrase),
            FaucetError::Vault(VaultError::BadPassphrase)
        ));
    }

    #[test]
    fn test_submission_message_carries_cause() {
        let err = FaucetError::SubmissionFailed {
            nonce: 7,
            cause: GatewayError::Rpc("nonce too low".into()),
        };
        assert_eq!(err.to_string(), "SendTransaction error: RPC error: nonce too low");
        assert_eq!(err.outcome(), "submission_failed");
    }
}
