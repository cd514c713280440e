//! Exact conversion between display text and wei amounts.

use alloy::primitives::U256;
use std::fmt;
use thiserror::Error;

use crate::units::denomination::Denomination;

/// Errors produced while turning amount text into wei.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// Denomination name outside the known set.
    #[error("unknown unit '{0}'")]
    UnknownDenomination(String),

    /// Text is not a plain non-negative decimal number.
    #[error("malformed amount '{text}': {reason}")]
    Malformed { text: String, reason: String },

    /// Amount carries a minus sign.
    #[error("negative amount '{0}'")]
    Negative(String),
}

/// Convert decimal text in `denom` into wei.
///
/// Fractional digits beyond the unit's precision are truncated, never rounded.
pub fn to_smallest_unit(amount_text: &str, denom: Denomination) -> Result<U256, ConversionError> {
    let text = amount_text.trim();

    if text.starts_with('-') {
        return Err(ConversionError::Negative(text.to_string()));
    }

    let digits = text.chars().filter(|c| c.is_ascii_digit()).count();
    let dots = text.chars().filter(|c| *c == '.').count();
    if digits == 0 || dots > 1 || digits + dots != text.len() {
        return Err(ConversionError::Malformed {
            text: text.to_string(),
            reason: "expected digits with an optional decimal point".to_string(),
        });
    }

    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    let precision = denom.precision();
    let kept = &fraction[..fraction.len().min(precision)];
    let digits = format!("{whole}{kept:0<precision$}");

    U256::from_str_radix(&digits, 10).map_err(|e| ConversionError::Malformed {
        text: text.to_string(),
        reason: e.to_string(),
    })
}

/// Render `amount` wei in `denom`.
///
/// `WEI` is always a bare integer. `NEW` is printed with its fixed precision
/// and then loses trailing zeros and a dangling decimal point.
pub fn to_display_text(amount: U256, denom: Denomination) -> String {
    let precision = denom.precision();
    if precision == 0 {
        return amount.to_string();
    }

    let (whole, fraction) = amount.div_rem(denom.scale());
    let text = format!("{}.{:0>width$}", whole, fraction.to_string(), width = precision);

    match denom {
        Denomination::New => trim_fraction(&text).to_string(),
        Denomination::Wei => text,
    }
}

fn trim_fraction(text: &str) -> &str {
    if !text.contains('.') {
        return text;
    }
    let trimmed = text.trim_end_matches('0');
    trimmed.strip_suffix('.').unwrap_or(trimmed)
}

/// An amount rendered together with the unit it was rendered in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayAmount {
    pub text: String,
    pub denomination: Denomination,
}

impl fmt::Display for DisplayAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.text, self.denomination)
    }
}

/// Render `amount`, picking the unit when `denom` is `None`.
///
/// Auto-selection shows anything below one `NEW` in `WEI` and everything
/// else in `NEW`.
pub fn format_amount(amount: U256, denom: Option<Denomination>) -> DisplayAmount {
    let denomination = denom.unwrap_or_else(|| {
        if amount < Denomination::New.scale() {
            Denomination::Wei
        } else {
            Denomination::New
        }
    });

    DisplayAmount {
        text: to_display_text(amount, denomination),
        denomination,
    }
}
