// crates/paygate-config/src/fee.rs
// ============================================================================
// Module: Platform Fee
// Description: Validated platform fee percentage and donation fee splits.
// Purpose: Compute the platform's cut with exact decimal arithmetic.
// Dependencies: bigdecimal, serde, thiserror
// ============================================================================

//! ## Overview
//! The platform keeps a configured percentage of each donation. Percentages
//! are parsed as decimals and bounded to `[0, 100]` at load time; splits on
//! integer minor units round the platform fee down so the recipient never
//! loses a fractional unit to rounding.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use bigdecimal::RoundingMode;
use bigdecimal::ToPrimitive;
use serde::Serialize;
use serde::Serializer;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Fee percentage applied when none is configured.
pub const DEFAULT_FEE_PERCENTAGE: u32 = 10;
/// Maximum accepted length of a raw fee percentage string.
const MAX_FEE_INPUT_LENGTH: usize = 32;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Reasons a raw fee percentage is rejected. Never carries the raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FeeError {
    /// The value was blank.
    #[error("must be non-empty")]
    Empty,
    /// The raw string exceeded the accepted length.
    #[error("exceeds max length")]
    TooLong,
    /// The value did not parse as a decimal.
    #[error("must be a decimal number")]
    NotDecimal,
    /// The value parsed but lies outside `[0, 100]`.
    #[error("must be between 0 and 100")]
    OutOfRange,
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Platform fee percentage in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeePercentage(BigDecimal);

impl FeePercentage {
    /// Parses and bounds-checks a raw percentage string.
    ///
    /// # Errors
    ///
    /// Returns [`FeeError`] when the value is not a decimal in `[0, 100]`.
    pub fn parse(raw: &str) -> Result<Self, FeeError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FeeError::Empty);
        }
        if trimmed.len() > MAX_FEE_INPUT_LENGTH {
            return Err(FeeError::TooLong);
        }
        let value = BigDecimal::from_str(trimmed).map_err(|_| FeeError::NotDecimal)?;
        Self::from_decimal(value)
    }

    /// Wraps an already-parsed decimal after bounds-checking it.
    ///
    /// # Errors
    ///
    /// Returns [`FeeError::OutOfRange`] when the value is outside `[0, 100]`.
    pub fn from_decimal(value: BigDecimal) -> Result<Self, FeeError> {
        if value < BigDecimal::from(0u32) || value > BigDecimal::from(100u32) {
            return Err(FeeError::OutOfRange);
        }
        Ok(Self(value))
    }

    /// Returns the percentage as a decimal.
    #[must_use]
    pub const fn as_decimal(&self) -> &BigDecimal {
        &self.0
    }

    /// Returns the platform's cut of `amount` (`amount * pct / 100`).
    #[must_use]
    pub fn platform_fee(&self, amount: &BigDecimal) -> BigDecimal {
        (amount * &self.0) / BigDecimal::from(100u32)
    }

    /// Splits a donation in minor units into platform fee and recipient share.
    #[must_use]
    pub fn split_minor_units(&self, gross: u64) -> FeeSplit {
        let fee = self
            .platform_fee(&BigDecimal::from(gross))
            .with_scale_round(0, RoundingMode::Down)
            .to_u64()
            .unwrap_or_default()
            // pct <= 100 keeps the fee within the gross amount.
            .min(gross);
        FeeSplit {
            gross,
            platform_fee: fee,
            recipient: gross - fee,
        }
    }
}

impl Default for FeePercentage {
    fn default() -> Self {
        Self(BigDecimal::from(DEFAULT_FEE_PERCENTAGE))
    }
}

impl fmt::Display for FeePercentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for FeePercentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

/// Breakdown of a donation amount in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeSplit {
    /// Amount donated.
    pub gross: u64,
    /// Amount retained by the platform.
    pub platform_fee: u64,
    /// Amount forwarded to the recipient.
    pub recipient: u64,
}

// ============================================================================
// SECTION: Tests
// ============================================================================
