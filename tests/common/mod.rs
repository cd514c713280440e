//! Shared test doubles and helpers for the integration tests.

#![allow(dead_code)]

use alloy::consensus::{TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{Address, TxHash, U256};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use newchain_faucet::blockchain::gateway::{ChainGateway, KeyVault};
use newchain_faucet::blockchain::transaction::{sign_intent, TransactionIntent};
use newchain_faucet::blockchain::types::{
    Account, CallSpec, GatewayError, GatewayResult, SignedTransaction, VaultError, VaultResult,
};
use newchain_faucet::config::{FaucetConfig, TimeoutConfig};
use newchain_faucet::faucet::ConfiguredPassphrase;
use newchain_faucet::http::{AppState, HttpServer};
use newchain_faucet::lifecycle::{bootstrap, FaucetServices, Shutdown};
use newchain_faucet::FaucetError;

/// Anvil's first account; publicly known, test only.
pub const FUNDING_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const PASSPHRASE: &str = "hunter2";
pub const DESTINATION: &str = "0x2222222222222222222222222222222222222222";

pub fn funding_signer() -> PrivateKeySigner {
    FUNDING_KEY.parse().unwrap()
}

pub fn funding_address() -> Address {
    funding_signer().address()
}

/// In-memory chain node with call counters and switchable failures.
pub struct MockGateway {
    pub network_id: u64,
    pub chain_nonce: AtomicU64,
    pub gas_price: u128,
    pub gas_estimate: u64,
    pub balance: Mutex<U256>,

    pub fail_network_id: AtomicBool,
    pub fail_gas_price: AtomicBool,
    pub fail_estimate: AtomicBool,
    pub fail_nonce: AtomicBool,
    pub fail_send: AtomicBool,

    pub nonce_calls: AtomicU32,
    pub gas_price_calls: AtomicU32,
    pub estimate_calls: AtomicU32,
    pub send_calls: AtomicU32,
    pub balance_calls: AtomicU32,

    pub sent: Mutex<Vec<SignedTransaction>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self {
            network_id: 1007,
            chain_nonce: AtomicU64::new(0),
            gas_price: 100,
            gas_estimate: 21000,
            balance: Mutex::new(U256::ZERO),
            fail_network_id: AtomicBool::new(false),
            fail_gas_price: AtomicBool::new(false),
            fail_estimate: AtomicBool::new(false),
            fail_nonce: AtomicBool::new(false),
            fail_send: AtomicBool::new(false),
            nonce_calls: AtomicU32::new(0),
            gas_price_calls: AtomicU32::new(0),
            estimate_calls: AtomicU32::new(0),
            send_calls: AtomicU32::new(0),
            balance_calls: AtomicU32::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }
}

impl MockGateway {
    pub fn with_nonce(nonce: u64) -> Self {
        let gateway = Self::default();
        gateway.chain_nonce.store(nonce, Ordering::SeqCst);
        gateway
    }

    pub fn set_balance(&self, wei: U256) {
        *self.balance.lock().unwrap() = wei;
    }

    /// Decoded legacy transactions in broadcast order.
    pub fn sent_transactions(&self) -> Vec<TxLegacy> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|signed| decode(signed))
            .collect()
    }

    fn down(&self, flag: &AtomicBool) -> bool {
        flag.load(Ordering::SeqCst)
    }
}

pub fn decode(signed: &SignedTransaction) -> TxLegacy {
    let envelope = TxEnvelope::decode_2718(&mut signed.raw.as_ref()).unwrap();
    envelope.as_legacy().expect("legacy transaction").tx().clone()
}

#[async_trait]
impl ChainGateway for MockGateway {
    async fn network_id(&self) -> GatewayResult<u64> {
        if self.down(&self.fail_network_id) {
            return Err(GatewayError::Timeout(10));
        }
        Ok(self.network_id)
    }

    async fn nonce_at(&self, _address: Address) -> GatewayResult<u64> {
        self.nonce_calls.fetch_add(1, Ordering::SeqCst);
        if self.down(&self.fail_nonce) {
            return Err(GatewayError::Rpc("nonce unavailable".into()));
        }
        Ok(self.chain_nonce.load(Ordering::SeqCst))
    }

    async fn suggest_gas_price(&self) -> GatewayResult<u128> {
        self.gas_price_calls.fetch_add(1, Ordering::SeqCst);
        if self.down(&self.fail_gas_price) {
            return Err(GatewayError::Rpc("gas price unavailable".into()));
        }
        Ok(self.gas_price)
    }

    async fn estimate_gas(&self, _call: &CallSpec) -> GatewayResult<u64> {
        self.estimate_calls.fetch_add(1, Ordering::SeqCst);
        if self.down(&self.fail_estimate) {
            return Err(GatewayError::Rpc("estimate failed".into()));
        }
        Ok(self.gas_estimate)
    }

    async fn send_transaction(&self, tx: &SignedTransaction) -> GatewayResult<TxHash> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        if self.down(&self.fail_send) {
            return Err(GatewayError::Rpc("insufficient funds for gas * price + value".into()));
        }
        self.chain_nonce.fetch_max(tx.nonce + 1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(tx.clone());
        Ok(tx.hash)
    }

    async fn balance_at(&self, _address: Address) -> GatewayResult<U256> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        Ok(*self.balance.lock().unwrap())
    }
}

/// In-memory vault holding at most one key.
pub struct MockVault {
    signer: Option<PrivateKeySigner>,
    passphrase: String,
    unlocked: AtomicBool,
    pub list_calls: AtomicU32,
    pub find_calls: AtomicU32,
    pub unlock_calls: AtomicU32,
    pub sign_calls: AtomicU32,
}

impl MockVault {
    pub fn with_funding_key() -> Self {
        Self {
            signer: Some(funding_signer()),
            passphrase: PASSPHRASE.to_string(),
            unlocked: AtomicBool::new(false),
            list_calls: AtomicU32::new(0),
            find_calls: AtomicU32::new(0),
            unlock_calls: AtomicU32::new(0),
            sign_calls: AtomicU32::new(0),
        }
    }

    pub fn empty() -> Self {
        Self {
            signer: None,
            ..Self::with_funding_key()
        }
    }

    fn accounts(&self) -> Vec<Account> {
        self.signer
            .iter()
            .map(|s| Account {
                address: s.address(),
                keyfile: Some("memory".into()),
            })
            .collect()
    }
}

#[async_trait]
impl KeyVault for MockVault {
    async fn list_accounts(&self) -> VaultResult<Vec<Account>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.accounts())
    }

    async fn find_account(&self, address: Address) -> VaultResult<Account> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        let accounts = self.accounts();
        if accounts.is_empty() {
            return Err(VaultError::WalletEmpty);
        }
        accounts
            .into_iter()
            .find(|a| a.address == address)
            .ok_or(VaultError::AccountNotFound(address))
    }

    async fn unlock(&self, _account: &Account, passphrase: &Secret<String>) -> VaultResult<()> {
        self.unlock_calls.fetch_add(1, Ordering::SeqCst);
        if passphrase.expose_secret() != &self.passphrase {
            return Err(VaultError::BadPassphrase);
        }
        self.unlocked.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn sign_transaction(
        &self,
        account: &Account,
        intent: &TransactionIntent,
    ) -> VaultResult<SignedTransaction> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        let signer = self
            .signer
            .as_ref()
            .ok_or(VaultError::AccountNotFound(account.address))?;
        if !self.unlocked.load(Ordering::SeqCst) {
            return Err(VaultError::Locked(account.address));
        }
        sign_intent(signer, intent)
    }

    async fn new_account(&self, _passphrase: &Secret<String>) -> VaultResult<Account> {
        Err(VaultError::Keystore("mock vault is read only".into()))
    }
}

/// Config dispensing the default 16888 NEW from the funding key.
pub fn faucet_config() -> FaucetConfig {
    let mut config = FaucetConfig::default();
    config.faucet.from = funding_address().to_string();
    config
}

/// Bootstrap against the given doubles with `passphrase` configured.
pub async fn start_services(
    config: &FaucetConfig,
    gateway: Arc<MockGateway>,
    vault: Arc<MockVault>,
    passphrase: &str,
) -> Result<FaucetServices, FaucetError> {
    bootstrap(
        config,
        gateway,
        vault,
        Arc::new(ConfiguredPassphrase::new(passphrase)),
    )
    .await
}

/// Serve `services` on an ephemeral local port.
pub async fn start_server(
    services: &FaucetServices,
    timeouts: &TimeoutConfig,
) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(timeouts, AppState::from(services));
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    (addr, shutdown)
}
