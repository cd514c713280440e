//! Per-process faucet state: funding account, amount, unlock and nonces.
//!
//! # Unlock states
//! ```text
//! Locked → Attempting(1) → Attempting(2) → Attempting(3) → Failed
//!              ↓                ↓                ↓
//!           Unlocked         Unlocked         Unlocked
//! ```
//!
//! `Failed` is terminal for the process. Every later dispense reports the
//! unlock failure without prompting again.

use alloy::primitives::{Address, U256};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::blockchain::gateway::KeyVault;
use crate::blockchain::types::{Account, NetworkId, VaultError};
use crate::faucet::error::FaucetError;
use crate::faucet::nonce::NonceAllocator;
use crate::faucet::passphrase::PassphraseSource;
use crate::units::Denomination;

/// Passphrase attempts before the account is given up on.
pub const MAX_UNLOCK_ATTEMPTS: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockState {
    Locked,
    Attempting(u8),
    Unlocked,
    Failed,
}

/// Immutable dispense settings plus the mutable unlock and nonce state.
pub struct FaucetSession {
    funding: Address,
    amount: U256,
    denomination: Denomination,
    network_id: NetworkId,
    passphrase: Arc<dyn PassphraseSource>,
    unlock: Mutex<UnlockState>,
    nonces: NonceAllocator,
}

impl FaucetSession {
    pub fn new(
        funding: Address,
        amount: U256,
        denomination: Denomination,
        network_id: NetworkId,
        passphrase: Arc<dyn PassphraseSource>,
    ) -> Self {
        Self {
            funding,
            amount,
            denomination,
            network_id,
            passphrase,
            unlock: Mutex::new(UnlockState::Locked),
            nonces: NonceAllocator::new(),
        }
    }

    /// Funding (coinbase) address.
    pub fn funding(&self) -> Address {
        self.funding
    }

    /// Amount per dispense, in wei.
    pub fn amount(&self) -> U256 {
        self.amount
    }

    /// Unit the amount was configured in.
    pub fn denomination(&self) -> Denomination {
        self.denomination
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }

    pub fn nonces(&self) -> &NonceAllocator {
        &self.nonces
    }

    pub async fn unlock_state(&self) -> UnlockState {
        *self.unlock.lock().await
    }

    /// Unlock `account` in `vault` unless that already happened.
    ///
    /// Concurrent callers queue on the state lock, so only one of them ever
    /// asks for a passphrase.
    pub async fn ensure_unlocked(
        &self,
        vault: &dyn KeyVault,
        account: &Account,
    ) -> Result<(), FaucetError> {
        let mut state = self.unlock.lock().await;
        match *state {
            UnlockState::Unlocked => return Ok(()),
            UnlockState::Failed => {
                return Err(FaucetError::UnlockFailed {
                    address: account.address,
                    reason: format!("gave up after {} attempts", MAX_UNLOCK_ATTEMPTS),
                })
            }
            UnlockState::Locked | UnlockState::Attempting(_) => {}
        }

        let mut reason = String::from("no passphrase available");
        for attempt in 1..=MAX_UNLOCK_ATTEMPTS {
            *state = UnlockState::Attempting(attempt);
            let prompt = format!(
                "Unlocking account {} | Attempt {}/{}",
                account.address, attempt, MAX_UNLOCK_ATTEMPTS
            );
            let source = self.passphrase.clone();
            let passphrase = match tokio::task::spawn_blocking(move || source.passphrase(&prompt)).await {
                Ok(Some(passphrase)) => passphrase,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(
                        address = %account.address,
                        attempt,
                        error = %e,
                        "Passphrase source panicked"
                    );
                    reason = format!("passphrase source failed: {e}");
                    break;
                }
            };

            match vault.unlock(account, &passphrase).await {
                Ok(()) => {
                    *state = UnlockState::Unlocked;
                    tracing::info!(address = %account.address, attempt, "Funding account unlocked");
                    return Ok(());
                }
                Err(VaultError::BadPassphrase) => {
                    tracing::warn!(address = %account.address, attempt, "Wrong passphrase");
                    reason = VaultError::BadPassphrase.to_string();
                }
                Err(e) => {
                    *state = UnlockState::Locked;
                    return Err(e.into());
                }
            }
        }

        *state = UnlockState::Failed;
        tracing::error!(address = %account.address, reason = %reason, "Giving up on unlock");
        Err(FaucetError::UnlockFailed {
            address: account.address,
            reason,
        })
    }
}

impl std::fmt::Debug for FaucetSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaucetSession")
            .field("funding", &self.funding)
            .field("amount", &self.amount)
            .field("denomination", &self.denomination)
            .field("network_id", &self.network_id)
            .field("nonces", &self.nonces)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::transaction::TransactionIntent;
    use crate::blockchain::types::{SignedTransaction, VaultResult};
    use async_trait::async_trait;
    use secrecy::{ExposeSecret, Secret};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Vault that accepts exactly one passphrase.
    struct PickyVault {
        accepted: &'static str,
        unlock_calls: AtomicU32,
    }

    #[async_trait]
    impl KeyVault for PickyVault {
        async fn list_accounts(&self) -> VaultResult<Vec<Account>> {
            Ok(vec![])
        }
        async fn find_account(&self, address: Address) -> VaultResult<Account> {
            Ok(Account::watch_only(address))
        }
        async fn unlock(&self, _: &Account, passphrase: &Secret<String>) -> VaultResult<()> {
            self.unlock_calls.fetch_add(1, Ordering::SeqCst);
            if passphrase.expose_secret() == self.accepted {
                Ok(())
            } else {
                Err(VaultError::BadPassphrase)
            }
        }
        async fn sign_transaction(
            &self,
            account: &Account,
            _: &TransactionIntent,
        ) -> VaultResult<SignedTransaction> {
            Err(VaultError::Locked(account.address))
        }
        async fn new_account(&self, _: &Secret<String>) -> VaultResult<Account> {
            Err(VaultError::Keystore("read only".into()))
        }
    }

    /// Hands out passphrases from a script, one per attempt.
    struct Scripted(std::sync::Mutex<Vec<&'static str>>);

    impl PassphraseSource for Scripted {
        fn passphrase(&self, _: &str) -> Option<Secret<String>> {
            let mut script = self.0.lock().unwrap();
            if script.is_empty() {
                None
            } else {
                Some(Secret::new(script.remove(0).to_string()))
            }
        }
    }

    /// Source whose terminal went away mid-prompt.
    struct Broken;

    impl PassphraseSource for Broken {
        fn passphrase(&self, _: &str) -> Option<Secret<String>> {
            panic!("terminal closed")
        }
    }

    fn session_with(source: Arc<dyn PassphraseSource>) -> FaucetSession {
        FaucetSession::new(
            Address::repeat_byte(0x11),
            U256::from(1u64),
            Denomination::Wei,
            NetworkId(16888),
            source,
        )
    }

    fn session(script: Vec<&'static str>) -> FaucetSession {
        session_with(Arc::new(Scripted(std::sync::Mutex::new(script))))
    }

    fn vault() -> PickyVault {
        PickyVault {
            accepted: "right",
            unlock_calls: AtomicU32::new(0),
        }
    }

    #[tokio::test]
    async fn test_unlocks_on_third_attempt() {
        let session = session(vec!["no", "nope", "right"]);
        let vault = vault();
        let account = Account::watch_only(session.funding());

        session.ensure_unlocked(&vault, &account).await.unwrap();
        assert_eq!(session.unlock_state().await, UnlockState::Unlocked);
        assert_eq!(vault.unlock_calls.load(Ordering::SeqCst), 3);

        // Already unlocked: no further vault calls.
        session.ensure_unlocked(&vault, &account).await.unwrap();
        assert_eq!(vault.unlock_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_three_wrong_passphrases_fail_for_good() {
        let session = session(vec!["a", "b", "c", "right"]);
        let vault = vault();
        let account = Account::watch_only(session.funding());

        let err = session.ensure_unlocked(&vault, &account).await.unwrap_err();
        assert!(matches!(err, FaucetError::UnlockFailed { .. }));
        assert_eq!(session.unlock_state().await, UnlockState::Failed);

        let err = session.ensure_unlocked(&vault, &account).await.unwrap_err();
        assert!(matches!(err, FaucetError::UnlockFailed { .. }));
        assert_eq!(vault.unlock_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_source_fails() {
        let session = session(vec![]);
        let vault = vault();
        let account = Account::watch_only(session.funding());

        let err = session.ensure_unlocked(&vault, &account).await.unwrap_err();
        assert!(err.to_string().contains("no passphrase available"));
        assert_eq!(vault.unlock_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_panicking_source_fails_unlock() {
        let session = session_with(Arc::new(Broken));
        let vault = vault();
        let account = Account::watch_only(session.funding());

        let err = session.ensure_unlocked(&vault, &account).await.unwrap_err();
        assert!(matches!(
            err,
            FaucetError::UnlockFailed { ref reason, .. } if reason.contains("passphrase source failed")
        ));
        assert_eq!(session.unlock_state().await, UnlockState::Failed);
        assert_eq!(vault.unlock_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_unlock() {
        let source = Arc::new(Scripted(std::sync::Mutex::new(vec!["right"; 16])));
        let session = Arc::new(session_with(source.clone()));
        let vault = Arc::new(vault());
        let account = Account::watch_only(session.funding());
        assert_eq!(session.unlock_state().await, UnlockState::Locked);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let session = session.clone();
                let vault = vault.clone();
                let account = account.clone();
                tokio::spawn(async move { session.ensure_unlocked(vault.as_ref(), &account).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(session.unlock_state().await, UnlockState::Unlocked);
        assert_eq!(vault.unlock_calls.load(Ordering::SeqCst), 1);
        // One passphrase taken from the script, fifteen left untouched.
        assert_eq!(source.0.lock().unwrap().len(), 15);
    }
}
