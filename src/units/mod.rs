//! Denominations and exact amount conversion.
//!
//! # Data Flow
//! ```text
//! "16888" + NEW (config)
//!     → convert.rs (exact decimal parse, scale, truncate)
//!     → U256 wei amount (dispense pipeline)
//!     → convert.rs (display text, auto-selected unit)
//!     → "balance: 16888 NEW"
//! ```
//!
//! Amounts never pass through `f64`. Text is scaled by shifting digits and
//! parsed straight into `U256`.

pub mod convert;
pub mod denomination;

pub use convert::{format_amount, to_display_text, to_smallest_unit, ConversionError, DisplayAmount};
pub use denomination::Denomination;
