// crates/paygate-config/src/descriptor.rs
// ============================================================================
// Module: Gateway Client Descriptor
// Description: Fixed transport settings handed to the payment provider client.
// Purpose: Pin API version, retries, and timeouts in one immutable value.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The descriptor carries everything the provider client needs except the
//! credentials. It is derived once from the runtime environment and never
//! mutated, so it can be shared across request handlers freely.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Serialize;

use crate::environment::RuntimeEnvironment;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Gateway API version pinned for every outbound call.
pub const GATEWAY_API_VERSION: &str = "2024-06-20";
/// Maximum automatic retries for idempotent gateway calls.
pub const MAX_RETRIES: u32 = 3;
/// Per-request timeout for gateway calls in milliseconds.
pub const TIMEOUT_MS: u64 = 20_000;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Transport settings for the payment provider client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientDescriptor {
    /// Pinned gateway API version.
    pub api_version: &'static str,
    /// Maximum retries per call.
    pub max_retries: u32,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Whether provider-side telemetry is enabled (production only).
    pub telemetry_enabled: bool,
}

impl ClientDescriptor {
    /// Builds the descriptor for an environment.
    #[must_use]
    pub const fn for_environment(environment: RuntimeEnvironment) -> Self {
        Self {
            api_version: GATEWAY_API_VERSION,
            max_retries: MAX_RETRIES,
            timeout_ms: TIMEOUT_MS,
            telemetry_enabled: !environment.is_test_mode(),
        }
    }

    /// Returns the request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_uses_fixed_policy_values() {
        let descriptor = ClientDescriptor::for_environment(RuntimeEnvironment::Staging);
        assert_eq!(descriptor.api_version, GATEWAY_API_VERSION);
        assert_eq!(descriptor.max_retries, 3);
        assert_eq!(descriptor.timeout(), Duration::from_secs(20));
        assert!(!descriptor.telemetry_enabled);
    }

    #[test]
    fn telemetry_tracks_live_mode() {
        let live = ClientDescriptor::for_environment(RuntimeEnvironment::Production);
        assert!(live.telemetry_enabled);
        let dev = ClientDescriptor::for_environment(RuntimeEnvironment::Development);
        assert!(!dev.telemetry_enabled);
        assert_eq!(live.api_version, dev.api_version);
    }
}
