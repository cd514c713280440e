//! Blockchain RPC client with timeout and failover.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoints (primary + failovers)
//! - Query chain state (nonce, gas price, balances, receipts)
//! - Broadcast raw transactions
//! - Bound every call with a fixed timeout

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::gateway::ChainGateway;
use crate::blockchain::types::{CallSpec, GatewayError, GatewayResult, SignedTransaction};
use crate::config::ChainConfig;
use crate::observability::metrics;

/// Node reply for a transaction that is already in its pool.
const ALREADY_KNOWN: &str = "already known";

/// Blockchain RPC client wrapper with failover support.
#[derive(Clone)]
pub struct BlockchainClient {
    /// List of providers (primary + failovers).
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    /// Primary endpoint, kept for logging.
    rpc_url: String,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a new blockchain client.
    ///
    /// No request is made here; an unreachable node surfaces on first use.
    pub fn new(config: &ChainConfig) -> GatewayResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        let primary_url: url::Url = config.rpc_url.parse().map_err(|e: url::ParseError| {
            GatewayError::InvalidUrl {
                url: config.rpc_url.clone(),
                reason: e.to_string(),
            }
        })?;
        providers.push(Arc::new(ProviderBuilder::new().connect_http(primary_url)) as Arc<dyn Provider + Send + Sync>);

        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(Arc::new(ProviderBuilder::new().connect_http(url)) as Arc<dyn Provider + Send + Sync>);
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        tracing::info!(
            rpc_url = %config.rpc_url,
            failovers = providers.len() - 1,
            timeout_secs = config.rpc_timeout_secs,
            "Blockchain client initialized"
        );

        Ok(Self {
            providers,
            rpc_url: config.rpc_url.clone(),
            timeout_duration,
        })
    }

    fn exhausted(&self, method: &'static str) -> GatewayError {
        metrics::record_rpc_error(method);
        GatewayError::Rpc(format!("All RPC providers failed on {}", method))
    }

    /// Get a transaction receipt by hash.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> GatewayResult<Option<TransactionReceipt>> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_transaction_receipt(tx_hash);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(self.exhausted("eth_getTransactionReceipt"))
    }
}

#[async_trait]
impl ChainGateway for BlockchainClient {
    async fn network_id(&self) -> GatewayResult<u64> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_chain_id();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout, trying next provider");
                }
            }
        }
        Err(self.exhausted("eth_chainId"))
    }

    async fn nonce_at(&self, address: Address) -> GatewayResult<u64> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_transaction_count(address);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(self.exhausted("eth_getTransactionCount"))
    }

    async fn suggest_gas_price(&self) -> GatewayResult<u128> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_gas_price();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(self.exhausted("eth_gasPrice"))
    }

    async fn estimate_gas(&self, call: &CallSpec) -> GatewayResult<u64> {
        let request = TransactionRequest::default()
            .with_from(call.from)
            .with_to(call.to)
            .with_value(call.value)
            .with_gas_price(call.gas_price);

        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.estimate_gas(request.clone());
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(self.exhausted("eth_estimateGas"))
    }

    /// Broadcast `tx`, moving to the next node only when the current one
    /// could not be reached. A JSON-RPC error reply is final.
    async fn send_transaction(&self, tx: &SignedTransaction) -> GatewayResult<TxHash> {
        // The same signed bytes may reach several nodes; they share one hash.
        let mut last_error = None;
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.send_raw_transaction(tx.raw.as_ref());
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(pending)) => return Ok(*pending.tx_hash()),
                Ok(Err(e)) => match e.as_error_resp() {
                    // Pool already holds these bytes, from an attempt that timed out.
                    Some(resp) if resp.message.contains(ALREADY_KNOWN) => {
                        tracing::info!(
                            provider_idx = i,
                            tx_hash = %tx.hash,
                            "Transaction already in node pool"
                        );
                        return Ok(tx.hash);
                    }
                    Some(resp) => {
                        tracing::warn!(
                            provider_idx = i,
                            code = resp.code,
                            error = %resp.message,
                            "Transaction rejected by node"
                        );
                        metrics::record_rpc_error("eth_sendRawTransaction");
                        return Err(GatewayError::Rpc(resp.message.to_string()));
                    }
                    None => {
                        tracing::warn!(provider_idx = i, error = %e, "RPC transport error");
                        last_error = Some(GatewayError::Rpc(e.to_string()));
                    }
                },
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout");
                    last_error = Some(GatewayError::Timeout(self.timeout_duration.as_secs()));
                }
            }
        }
        metrics::record_rpc_error("eth_sendRawTransaction");
        Err(last_error.unwrap_or_else(|| GatewayError::Rpc("no RPC providers configured".to_string())))
    }

    async fn balance_at(&self, address: Address) -> GatewayResult<U256> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_balance(address);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(self.exhausted("eth_getBalance"))
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.rpc_url)
            .field("providers", &self.providers.len())
            .field("timeout", &self.timeout_duration)
            .finish()
    }
}
