// crates/paygate-config/tests/common/mod.rs
// =============================================================================
// Module: Gateway Policy Test Helpers
// Description: Shared helpers for gateway policy integration tests.
// Purpose: Reduce duplication across integration tests for paygate-config.
// =============================================================================

//! ## Overview
//! Builders for in-memory secrets sources and a buffered audit sink so each
//! suite can initialize a policy and inspect its audit trail in one call.

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::sync::Arc;

use paygate_config::BufferedPolicyAuditSink;
use paygate_config::ConfigError;
use paygate_config::GatewayPolicy;
use paygate_config::MemorySecretsSource;

/// Builds a shared in-memory source from key/value pairs.
pub fn source_with(pairs: &[(&str, &str)]) -> Arc<MemorySecretsSource> {
    Arc::new(MemorySecretsSource::from_pairs(pairs.iter().copied()))
}

/// Initializes a policy over `source`, returning it with its audit buffer.
pub fn init_policy(
    source: Arc<MemorySecretsSource>,
) -> Result<(GatewayPolicy, Arc<BufferedPolicyAuditSink>), ConfigError> {
    let audit = Arc::new(BufferedPolicyAuditSink::new());
    let policy = GatewayPolicy::initialize(source, audit.clone())?;
    Ok((policy, audit))
}

/// Asserts that `result` failed with a message containing `needle`.
pub fn assert_error_contains<T>(
    result: Result<T, ConfigError>,
    needle: &str,
) -> Result<(), String> {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected gateway config error".to_string()),
    }
}
