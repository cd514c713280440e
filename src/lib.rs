//! NewChain faucet.
//!
//! Sends a fixed amount of NEW from one funding account to any address asked
//! for over HTTP, and reports balances.
//!
//! # Architecture Overview
//!
//! ```text
//!     GET /faucet ──▶ http ──▶ faucet::pipeline ──▶ blockchain::keystore (unlock, sign)
//!                                   │
//!                                   ├──▶ faucet::nonce (allocation)
//!                                   └──▶ blockchain::client ──▶ NewChain RPC node
//!
//!     GET /balance ─▶ http ──▶ faucet::balance ──▶ blockchain::client
//!
//!     Cross-cutting: config, units, observability, lifecycle
//! ```

// Core subsystems
pub mod blockchain;
pub mod faucet;
pub mod http;
pub mod units;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::schema::FaucetConfig;
pub use faucet::{DispensePipeline, FaucetError, FaucetSession};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
