//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + CLI overrides
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → FaucetConfig (validated, immutable)
//!     → consumed once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, read_config, save_config, ConfigError};
pub use schema::{
    ChainConfig, DispenseConfig, FaucetConfig, ListenerConfig, ObservabilityConfig, TimeoutConfig,
    WalletConfig, DEFAULT_CONFIG_FILE, DEFAULT_RPC_URL, DEFAULT_WALLET_PATH,
};
pub use validation::{validate_config, ValidationError};
