//! Closed set of supported denominations.

use alloy::primitives::U256;
use std::fmt;
use std::str::FromStr;

use crate::units::convert::ConversionError;

/// A unit an amount can be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Denomination {
    /// The whole-coin unit (`NEW`), 10^18 wei.
    New,
    /// The indivisible base unit (`WEI`).
    Wei,
}

impl Denomination {
    /// Every known denomination, largest first.
    pub const ALL: [Denomination; 2] = [Denomination::New, Denomination::Wei];

    /// Decimal exponent of the scale factor: smallest units per unit is `10^exponent`.
    pub fn exponent(self) -> u32 {
        match self {
            Denomination::New => 18,
            Denomination::Wei => 0,
        }
    }

    /// Smallest units per one of this unit.
    pub fn scale(self) -> U256 {
        U256::from(10u64).pow(U256::from(self.exponent()))
    }

    /// Fixed number of fractional digits shown for this unit.
    ///
    /// Equals the digit count of the scale factor minus one.
    pub fn precision(self) -> usize {
        self.scale().to_string().len() - 1
    }

    /// Canonical upper-case name.
    pub fn name(self) -> &'static str {
        match self {
            Denomination::New => "NEW",
            Denomination::Wei => "WEI",
        }
    }

    /// Human-readable list for usage messages.
    pub fn available() -> String {
        let names: Vec<&str> = Self::ALL.iter().map(|d| d.name()).collect();
        format!("Available unit: {}", names.join(", "))
    }
}

impl FromStr for Denomination {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConversionError::UnknownDenomination(s.to_string()))
    }
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
