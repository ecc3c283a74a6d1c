// crates/paygate-config/src/audit.rs
// ============================================================================
// Module: Gateway Policy Audit Logging
// Description: Structured audit events for gateway policy lifecycle.
// Purpose: Emit redacted operator records without hard logging dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines audit event payloads and sinks for the gateway
//! policy. Events are JSON lines so deployments can route them to their
//! preferred logging pipeline. No event type has a field that can hold a
//! secret value; credentials appear only as truncated fingerprints.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::environment::RuntimeEnvironment;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Policy initialization audit event.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyInitEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Resolved runtime environment.
    pub environment: RuntimeEnvironment,
    /// False when the configured label was not a known environment.
    pub environment_recognized: bool,
    /// Whether the gateway runs in test mode.
    pub test_mode: bool,
    /// Whether provider telemetry is enabled.
    pub telemetry_enabled: bool,
    /// Effective platform fee percentage.
    pub fee_percentage: String,
    /// Secrets source label.
    pub secrets_source: &'static str,
    /// Truncated SHA-256 fingerprint of the secret key.
    pub secret_key_fingerprint: String,
}

/// Emitted when a key's mode prefix disagrees with the environment.
#[derive(Debug, Clone, Serialize)]
pub struct KeyModeMismatchEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Field whose prefix disagrees.
    pub field: &'static str,
    /// Mode implied by the key prefix (`test` or `live`).
    pub key_mode: &'static str,
    /// Resolved runtime environment.
    pub environment: RuntimeEnvironment,
}

/// Emitted when a secondary secret is missing at lookup time.
#[derive(Debug, Clone, Serialize)]
pub struct SecretLookupFailedEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Field that failed to resolve.
    pub field: &'static str,
    /// Error rendered for operators (never contains values).
    pub reason: String,
}

/// Inputs required to construct an initialization event.
pub struct PolicyInitEventParams {
    /// Resolved runtime environment.
    pub environment: RuntimeEnvironment,
    /// False when the configured label was not a known environment.
    pub environment_recognized: bool,
    /// Whether provider telemetry is enabled.
    pub telemetry_enabled: bool,
    /// Effective platform fee percentage.
    pub fee_percentage: String,
    /// Secrets source label.
    pub secrets_source: &'static str,
    /// Truncated SHA-256 fingerprint of the secret key.
    pub secret_key_fingerprint: String,
}

impl PolicyInitEvent {
    /// Creates a new initialization event with a consistent timestamp.
    #[must_use]
    pub fn new(params: PolicyInitEventParams) -> Self {
        Self {
            event: "gateway_policy_initialized",
            timestamp_ms: now_ms(),
            environment: params.environment,
            environment_recognized: params.environment_recognized,
            test_mode: params.environment.is_test_mode(),
            telemetry_enabled: params.telemetry_enabled,
            fee_percentage: params.fee_percentage,
            secrets_source: params.secrets_source,
            secret_key_fingerprint: params.secret_key_fingerprint,
        }
    }
}

impl KeyModeMismatchEvent {
    /// Creates a new mismatch event with a consistent timestamp.
    #[must_use]
    pub fn new(
        field: &'static str,
        key_mode: &'static str,
        environment: RuntimeEnvironment,
    ) -> Self {
        Self {
            event: "gateway_key_mode_mismatch",
            timestamp_ms: now_ms(),
            field,
            key_mode,
            environment,
        }
    }
}

impl SecretLookupFailedEvent {
    /// Creates a new lookup failure event with a consistent timestamp.
    #[must_use]
    pub fn new(field: &'static str, reason: String) -> Self {
        Self {
            event: "gateway_secret_lookup_failed",
            timestamp_ms: now_ms(),
            field,
            reason,
        }
    }
}

/// Milliseconds since the unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for gateway policy events.
pub trait PolicyAuditSink: Send + Sync {
    /// Record a policy initialization event.
    fn record_init(&self, event: &PolicyInitEvent);

    /// Record a key mode mismatch warning.
    fn record_key_mode_mismatch(&self, _event: &KeyModeMismatchEvent) {}

    /// Record a secondary secret lookup failure.
    fn record_lookup_failure(&self, _event: &SecretLookupFailedEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrPolicyAuditSink;

impl StderrPolicyAuditSink {
    /// Writes one serialized event to stderr.
    fn emit<T: Serialize>(event: &T) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

impl PolicyAuditSink for StderrPolicyAuditSink {
    fn record_init(&self, event: &PolicyInitEvent) {
        Self::emit(event);
    }

    fn record_key_mode_mismatch(&self, event: &KeyModeMismatchEvent) {
        Self::emit(event);
    }

    fn record_lookup_failure(&self, event: &SecretLookupFailedEvent) {
        Self::emit(event);
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FilePolicyAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FilePolicyAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized event to the log file.
    fn emit<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl PolicyAuditSink for FilePolicyAuditSink {
    fn record_init(&self, event: &PolicyInitEvent) {
        self.emit(event);
    }

    fn record_key_mode_mismatch(&self, event: &KeyModeMismatchEvent) {
        self.emit(event);
    }

    fn record_lookup_failure(&self, event: &SecretLookupFailedEvent) {
        self.emit(event);
    }
}

/// Audit sink that keeps JSON lines in memory.
#[derive(Debug, Default)]
pub struct BufferedPolicyAuditSink {
    /// Recorded JSON lines in emission order.
    lines: Mutex<Vec<String>>,
}

impl BufferedPolicyAuditSink {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of recorded lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|lines| lines.clone()).unwrap_or_default()
    }

    /// Appends one serialized event to the buffer.
    fn emit<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut lines) = self.lines.lock()
        {
            lines.push(payload);
        }
    }
}

impl PolicyAuditSink for BufferedPolicyAuditSink {
    fn record_init(&self, event: &PolicyInitEvent) {
        self.emit(event);
    }

    fn record_key_mode_mismatch(&self, event: &KeyModeMismatchEvent) {
        self.emit(event);
    }

    fn record_lookup_failure(&self, event: &SecretLookupFailedEvent) {
        self.emit(event);
    }
}

/// No-op audit sink.
pub struct NoopPolicyAuditSink;

impl PolicyAuditSink for NoopPolicyAuditSink {
    fn record_init(&self, _event: &PolicyInitEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
