//! On-disk key vault backed by Web3 Secret Storage files.
//!
//! # Security
//! - Keys stay encrypted on disk; decrypted signers live only in memory
//! - Passphrases are wrapped in `Secret` and never logged
//! - Directory scans and decryption run on the blocking pool

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use dashmap::DashMap;
use secrecy::{ExposeSecret, Secret};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::blockchain::gateway::KeyVault;
use crate::blockchain::transaction::{sign_intent, TransactionIntent};
use crate::blockchain::types::{Account, SignedTransaction, VaultError, VaultResult};

/// Key vault over a directory of encrypted JSON key files.
#[derive(Clone)]
pub struct KeystoreVault {
    dir: PathBuf,
    /// Decrypted signers, keyed by address.
    unlocked: Arc<DashMap<Address, PrivateKeySigner>>,
}

impl KeystoreVault {
    /// Open the vault rooted at `dir`. The directory need not exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            unlocked: Arc::new(DashMap::new()),
        }
    }

    /// Keystore directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether `address` has a decrypted signer.
    pub fn is_unlocked(&self, address: &Address) -> bool {
        self.unlocked.contains_key(address)
    }

    /// Key files in the directory, read on the blocking pool.
    async fn scan(&self) -> VaultResult<Vec<Account>> {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || scan_dir(&dir))
            .await
            .map_err(|e| VaultError::Keystore(e.to_string()))?
    }
}

fn scan_dir(dir: &Path) -> VaultResult<Vec<Account>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(VaultError::Keystore(format!("{}: {}", dir.display(), e))),
    };

    let mut accounts = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| VaultError::Keystore(e.to_string()))?
            .path();
        if !path.is_file() {
            continue;
        }
        match keyfile_address(&path) {
            Some(address) => accounts.push(Account {
                address,
                keyfile: Some(path),
            }),
            None => tracing::debug!(path = %path.display(), "Skipping non-keystore file"),
        }
    }
    accounts.sort_by(|a, b| a.keyfile.cmp(&b.keyfile));
    Ok(accounts)
}

/// Address of a key file: the `address` JSON field, or the geth-style
/// `UTC--<time>--<address>` file name.
fn keyfile_address(path: &Path) -> Option<Address> {
    let content = std::fs::read_to_string(path).ok()?;
    let json: serde_json::Value = serde_json::from_str(&content).ok()?;
    json.get("crypto").or_else(|| json.get("Crypto"))?;

    if let Some(address) = json.get("address").and_then(|v| v.as_str()) {
        if let Ok(address) = address.parse() {
            return Some(address);
        }
    }

    let name = path.file_name()?.to_str()?;
    name.rsplit("--").next()?.parse().ok()
}

#[async_trait]
impl KeyVault for KeystoreVault {
    async fn list_accounts(&self) -> VaultResult<Vec<Account>> {
        self.scan().await
    }

    async fn find_account(&self, address: Address) -> VaultResult<Account> {
        let accounts = self.scan().await?;
        if accounts.is_empty() {
            return Err(VaultError::WalletEmpty);
        }
        accounts
            .into_iter()
            .find(|a| a.address == address)
            .ok_or(VaultError::AccountNotFound(address))
    }

    async fn unlock(&self, account: &Account, passphrase: &Secret<String>) -> VaultResult<()> {
        let keyfile = account
            .keyfile
            .clone()
            .ok_or(VaultError::AccountNotFound(account.address))?;
        let password = passphrase.expose_secret().clone();

        let signer = tokio::task::spawn_blocking(move || {
            PrivateKeySigner::decrypt_keystore(&keyfile, password)
        })
        .await
        .map_err(|e| VaultError::Keystore(e.to_string()))?
        .map_err(|e| {
            tracing::debug!(error = %e, "Keystore decryption failed");
            VaultError::BadPassphrase
        })?;

        if signer.address() != account.address {
            return Err(VaultError::Keystore(format!(
                "key file decrypts to {} instead of {}",
                signer.address(),
                account.address
            )));
        }

        tracing::info!(address = %account.address, "Account unlocked");
        self.unlocked.insert(account.address, signer);
        Ok(())
    }

    async fn sign_transaction(
        &self,
        account: &Account,
        intent: &TransactionIntent,
    ) -> VaultResult<SignedTransaction> {
        let signer = self
            .unlocked
            .get(&account.address)
            .ok_or(VaultError::Locked(account.address))?;
        sign_intent(signer.value(), intent)
    }

    async fn new_account(&self, passphrase: &Secret<String>) -> VaultResult<Account> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| VaultError::Keystore(format!("{}: {}", self.dir.display(), e)))?;

        let key = PrivateKeySigner::random();
        let created = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let name = format!("UTC--{}--{:x}", created, key.address());
        let keyfile = self.dir.join(&name);
        let dir = self.dir.clone();
        let password = passphrase.expose_secret().clone();
        let secret = key.to_bytes();

        let (signer, _) = tokio::task::spawn_blocking(move || {
            let mut rng = rand::thread_rng();
            PrivateKeySigner::encrypt_keystore(&dir, &mut rng, secret, password, Some(name.as_str()))
        })
        .await
        .map_err(|e| VaultError::Keystore(e.to_string()))?
        .map_err(|e| VaultError::Keystore(e.to_string()))?;

        let address = signer.address();
        tracing::info!(address = %address, "Account created");

        Ok(Account {
            address,
            keyfile: Some(keyfile),
        })
    }
}

impl std::fmt::Debug for KeystoreVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeystoreVault")
            .field("dir", &self.dir)
            .field("unlocked", &self.unlocked.len())
            .finish()
    }
}
