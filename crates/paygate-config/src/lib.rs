// crates/paygate-config/src/lib.rs
// ============================================================================
// Module: Paygate Config Library
// Description: Payment gateway credentials, operating mode, and fee policy.
// Purpose: Single source of truth for how the backend talks to its gateway.
// Dependencies: bigdecimal, hex, hmac, secrecy, serde, serde_json, sha2, subtle, thiserror, toml
// ============================================================================

//! ## Overview
//! `paygate-config` owns the payment gateway credentials for the donation
//! backend. A [`GatewayPolicy`] is built once at startup from a
//! [`SecretsSource`], fails closed when the primary secret is missing, and is
//! then shared by handle with every request handler that needs the gateway.
//!
//! Security posture: secret values never leave the policy except as
//! [`secrecy::SecretString`] or the [`WebhookSecret`] capability, and are
//! never written to audit records.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod descriptor;
pub mod environment;
pub mod fee;
pub mod policy;
pub mod secrets;
pub mod security;
pub mod webhook;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::BufferedPolicyAuditSink;
pub use audit::FilePolicyAuditSink;
pub use audit::NoopPolicyAuditSink;
pub use audit::PolicyAuditSink;
pub use audit::StderrPolicyAuditSink;
pub use descriptor::ClientDescriptor;
pub use environment::RuntimeEnvironment;
pub use fee::FeeError;
pub use fee::FeePercentage;
pub use fee::FeeSplit;
pub use policy::ConfigError;
pub use policy::GatewayPolicy;
pub use secrets::EnvSecretsSource;
pub use secrets::FileSecretsSource;
pub use secrets::LayeredSecretsSource;
pub use secrets::MemorySecretsSource;
pub use secrets::SecretsError;
pub use secrets::SecretsSource;
pub use webhook::WebhookError;
pub use webhook::WebhookSecret;
