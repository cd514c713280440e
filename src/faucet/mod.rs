//! Faucet core.
//!
//! # Data Flow
//! ```text
//! HTTP handler
//!     → pipeline.rs (validate, unlock, price, nonce, sign, broadcast)
//!         → session.rs (funding account, unlock state)
//!         → nonce.rs (monotonic allocation)
//!         → fallback.rs (defaults for failed chain queries)
//!     → balance.rs (read-only balance lookups)
//! ```

pub mod balance;
pub mod error;
pub mod fallback;
pub mod nonce;
pub mod passphrase;
pub mod pipeline;
pub mod session;

pub use balance::{Balance, BalanceQuery};
pub use error::FaucetError;
pub use fallback::{FallbackKind, Fallbacks};
pub use nonce::{NonceAllocator, NonceError, NonceState};
pub use passphrase::{ConfiguredPassphrase, PassphraseSource, TerminalPrompt};
pub use pipeline::{parse_address, DispensePipeline, Dispensed};
pub use session::{FaucetSession, UnlockState, MAX_UNLOCK_ATTEMPTS};
