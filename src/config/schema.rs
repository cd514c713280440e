//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the faucet.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Default config file location.
pub const DEFAULT_CONFIG_FILE: &str = "./config.toml";

/// Default keystore directory.
pub const DEFAULT_WALLET_PATH: &str = "./wallet/";

/// Default JSON-RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "https://rpc1.newchain.newtonproject.org";

/// Root configuration for the faucet.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FaucetConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Chain node connection and transaction defaults.
    pub chain: ChainConfig,

    /// Keystore location.
    pub wallet: WalletConfig,

    /// What to dispense and from where.
    pub faucet: DispenseConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8888").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8888".to_string(),
        }
    }
}

/// Chain node configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Network id used when the node cannot report one.
    pub default_network_id: u64,

    /// Gas price in wei used when the node cannot suggest one.
    pub min_gas_price_wei: u128,

    /// Gas limit used when estimation fails.
    pub default_gas_limit: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            failover_urls: Vec::new(),
            rpc_timeout_secs: 10,
            default_network_id: 16888,
            min_gas_price_wei: 1,
            default_gas_limit: 21000,
        }
    }
}

/// Keystore configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Keystore directory.
    pub path: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_WALLET_PATH.to_string(),
        }
    }
}

/// Dispense settings.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispenseConfig {
    /// Funding (coinbase) address.
    pub from: String,

    /// Amount sent per request, as decimal text in `unit`.
    pub amount: String,

    /// Unit of `amount` (NEW or WEI).
    pub unit: String,

    /// Keystore passphrase. Prompted for when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Default for DispenseConfig {
    fn default() -> Self {
        Self {
            from: String::new(),
            amount: "16888".to_string(),
            unit: "NEW".to_string(),
            password: None,
        }
    }
}

impl std::fmt::Debug for DispenseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispenseConfig")
            .field("from", &self.from)
            .field("amount", &self.amount)
            .field("unit", &self.unit)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
