// crates/paygate-config/src/environment.rs
// ============================================================================
// Module: Runtime Environment
// Description: Deployment environment selection and test/live mode mapping.
// Purpose: Derive the gateway operating mode from one environment label.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Only `production` runs the gateway in live mode. Every other label,
//! including unknown ones, resolves to a test-mode environment so a typo can
//! never move real money.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Deployment environment for the backend process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeEnvironment {
    /// Local development (test mode).
    #[default]
    Development,
    /// Pre-production staging (test mode).
    Staging,
    /// Production (live mode).
    Production,
}

impl RuntimeEnvironment {
    /// Parses an exact environment label.
    #[must_use]
    pub fn parse_label(label: &str) -> Option<Self> {
        match label {
            "development" => Some(Self::Development),
            "staging" => Some(Self::Staging),
            "production" => Some(Self::Production),
            _ => None,
        }
    }

    /// Resolves a label, falling back to [`Self::Development`] when unknown.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        Self::parse_label(label).unwrap_or_default()
    }

    /// Returns the canonical label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    /// Returns true for every environment except production.
    #[must_use]
    pub const fn is_test_mode(self) -> bool {
        !matches!(self, Self::Production)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
