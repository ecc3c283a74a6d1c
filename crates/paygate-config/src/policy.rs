// crates/paygate-config/src/policy.rs
// ============================================================================
// Module: Gateway Policy
// Description: Validated gateway credentials and derived session policy.
// Purpose: Fail fast on missing secrets and expose read-only gateway settings.
// Dependencies: secrecy, thiserror
// ============================================================================

//! ## Overview
//! [`GatewayPolicy`] is constructed once at process start and shared by
//! handle (`Arc<GatewayPolicy>`) with every request handler. Validation is
//! two-tier:
//!
//! - the secret key, environment, and fee are resolved during
//!   [`GatewayPolicy::initialize`]; a missing secret key aborts startup;
//! - the publishable key and webhook secret are looked up on every access
//!   and fail only the call that needed them.
//!
//! After construction every accessor is a read over immutable state or the
//! injected source, so the policy needs no locking of its own.
//!
//! Security posture: the secret key is held as a [`SecretString`] and never
//! serialized; request handlers must surface [`ConfigError::public_message`]
//! to end users and keep the field name for operators.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use secrecy::SecretString;
use thiserror::Error;

use crate::audit::KeyModeMismatchEvent;
use crate::audit::PolicyAuditSink;
use crate::audit::PolicyInitEvent;
use crate::audit::PolicyInitEventParams;
use crate::audit::SecretLookupFailedEvent;
use crate::descriptor::ClientDescriptor;
use crate::environment::RuntimeEnvironment;
use crate::fee::FeeError;
use crate::fee::FeePercentage;
use crate::secrets::ENVIRONMENT_VAR;
use crate::secrets::FEE_PERCENTAGE_VAR;
use crate::secrets::MAX_SECRET_VALUE_LENGTH;
use crate::secrets::PUBLISHABLE_KEY_VAR;
use crate::secrets::SECRET_KEY_VAR;
use crate::secrets::SecretsError;
use crate::secrets::SecretsSource;
use crate::secrets::WEBHOOK_SECRET_VAR;
use crate::security::secret_fingerprint;
use crate::webhook::WebhookSecret;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Field name reported for the secret key.
pub const FIELD_SECRET_KEY: &str = "secretKey";
/// Field name reported for the publishable key.
pub const FIELD_PUBLISHABLE_KEY: &str = "publishableKey";
/// Field name reported for the webhook secret.
pub const FIELD_WEBHOOK_SECRET: &str = "webhookSecret";
/// Field name reported for the fee percentage.
pub const FIELD_FEE_PERCENTAGE: &str = "feePercentage";
/// Message shown to end users for any configuration failure.
pub const PUBLIC_UNAVAILABLE_MESSAGE: &str = "payment temporarily unavailable";

/// Key prefixes that mark sandbox credentials.
const TEST_KEY_PREFIXES: [&str; 2] = ["sk_test_", "pk_test_"];
/// Key prefixes that mark live credentials.
const LIVE_KEY_PREFIXES: [&str; 2] = ["sk_live_", "pk_live_"];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Gateway configuration errors. None of them are retryable.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required secret is absent or blank.
    #[error("missing required gateway secret: {field}")]
    MissingSecret {
        /// Name of the missing field.
        field: &'static str,
    },
    /// A configured value is present but unusable.
    #[error("invalid gateway config {field}: {reason}")]
    InvalidValue {
        /// Name of the invalid field.
        field: &'static str,
        /// Why the value was rejected (never the value itself).
        reason: String,
    },
    /// The fee percentage is present but unusable.
    #[error("invalid gateway config feePercentage: {0}")]
    InvalidFee(#[source] FeeError),
    /// The secrets source failed to answer.
    #[error("gateway secrets source error: {0}")]
    Source(#[from] SecretsError),
}

impl ConfigError {
    /// Returns the message safe to show end users.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        PUBLIC_UNAVAILABLE_MESSAGE
    }

    /// Returns the offending field name for operator logs.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingSecret {
                field,
            }
            | Self::InvalidValue {
                field, ..
            } => Some(*field),
            Self::InvalidFee(_) => Some(FIELD_FEE_PERCENTAGE),
            Self::Source(_) => None,
        }
    }
}

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Validated gateway credentials plus the derived client settings.
pub struct GatewayPolicy {
    /// Secret API key for outbound calls.
    secret_key: SecretString,
    /// Resolved runtime environment.
    environment: RuntimeEnvironment,
    /// Platform fee percentage.
    fee_percentage: FeePercentage,
    /// Immutable provider client settings.
    descriptor: ClientDescriptor,
    /// Source consulted for secondary secrets.
    source: Arc<dyn SecretsSource>,
    /// Sink for operator audit records.
    audit: Arc<dyn PolicyAuditSink>,
}

impl GatewayPolicy {
    /// Reads and validates gateway configuration from `source`.
    ///
    /// Emits one `gateway_policy_initialized` audit record on success.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSecret`] when the secret key is absent,
    /// [`ConfigError::InvalidFee`] when the fee is unusable,
    /// [`ConfigError::InvalidValue`] when a secret is oversized, and
    /// [`ConfigError::Source`] when the source fails.
    pub fn initialize(
        source: Arc<dyn SecretsSource>,
        audit: Arc<dyn PolicyAuditSink>,
    ) -> Result<Self, ConfigError> {
        let secret_key = require_secret(source.as_ref(), SECRET_KEY_VAR, FIELD_SECRET_KEY)?;
        let (environment, environment_recognized) =
            resolve_environment(source.get(ENVIRONMENT_VAR)?.as_deref());
        let fee_percentage = resolve_fee(source.get(FEE_PERCENTAGE_VAR)?.as_deref())?;
        let descriptor = ClientDescriptor::for_environment(environment);

        audit.record_init(&PolicyInitEvent::new(PolicyInitEventParams {
            environment,
            environment_recognized,
            telemetry_enabled: descriptor.telemetry_enabled,
            fee_percentage: fee_percentage.to_string(),
            secrets_source: source.label(),
            secret_key_fingerprint: secret_fingerprint(&secret_key),
        }));
        warn_on_key_mode_mismatch(audit.as_ref(), FIELD_SECRET_KEY, &secret_key, environment);
        check_publishable_key_mode(source.as_ref(), audit.as_ref(), environment);

        Ok(Self {
            secret_key: SecretString::from(secret_key),
            environment,
            fee_percentage,
            descriptor,
            source,
            audit,
        })
    }

    /// Returns the immutable provider client settings.
    #[must_use]
    pub const fn client_descriptor(&self) -> &ClientDescriptor {
        &self.descriptor
    }

    /// Looks up the publishable key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSecret`] naming `publishableKey` when it
    /// is absent or blank at lookup time.
    pub fn publishable_key(&self) -> Result<String, ConfigError> {
        self.lookup_secondary(PUBLISHABLE_KEY_VAR, FIELD_PUBLISHABLE_KEY)
    }

    /// Looks up the webhook secret as a verification-only capability.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSecret`] naming `webhookSecret` when it
    /// is absent or blank at lookup time.
    pub fn webhook_secret(&self) -> Result<WebhookSecret, ConfigError> {
        self.lookup_secondary(WEBHOOK_SECRET_VAR, FIELD_WEBHOOK_SECRET).map(WebhookSecret::new)
    }

    /// Returns true unless the environment is production.
    #[must_use]
    pub const fn is_test_mode(&self) -> bool {
        self.environment.is_test_mode()
    }

    /// Returns the platform fee percentage (default 10).
    #[must_use]
    pub const fn application_fee_percentage(&self) -> &FeePercentage {
        &self.fee_percentage
    }

    /// Returns the resolved runtime environment.
    #[must_use]
    pub const fn environment(&self) -> RuntimeEnvironment {
        self.environment
    }

    /// Resolves a secondary secret and records failures for operators.
    fn lookup_secondary(&self, key: &str, field: &'static str) -> Result<String, ConfigError> {
        require_secret(self.source.as_ref(), key, field).inspect_err(|err| {
            self.audit.record_lookup_failure(&SecretLookupFailedEvent::new(field, err.to_string()));
        })
    }
}

impl fmt::Debug for GatewayPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayPolicy")
            .field("secret_key", &self.secret_key)
            .field("environment", &self.environment)
            .field("fee_percentage", &self.fee_percentage)
            .field("descriptor", &self.descriptor)
            .field("source", &self.source.label())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a secret that must be present and non-blank.
fn require_secret(
    source: &dyn SecretsSource,
    key: &str,
    field: &'static str,
) -> Result<String, ConfigError> {
    let value = source.get(key)?.map(|value| value.trim().to_string()).unwrap_or_default();
    if value.is_empty() {
        return Err(ConfigError::MissingSecret {
            field,
        });
    }
    if value.len() > MAX_SECRET_VALUE_LENGTH {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "exceeds max length".to_string(),
        });
    }
    Ok(value)
}

/// Resolves the environment label; blank counts as unset.
fn resolve_environment(label: Option<&str>) -> (RuntimeEnvironment, bool) {
    match label {
        None => (RuntimeEnvironment::default(), true),
        Some(label) if label.is_empty() => (RuntimeEnvironment::default(), true),
        Some(label) => RuntimeEnvironment::parse_label(label)
            .map_or((RuntimeEnvironment::default(), false), |env| (env, true)),
    }
}

/// Resolves the fee percentage; blank counts as unset.
fn resolve_fee(raw: Option<&str>) -> Result<FeePercentage, ConfigError> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => {
            FeePercentage::parse(raw).map_err(ConfigError::InvalidFee)
        }
        _ => Ok(FeePercentage::default()),
    }
}

/// Returns `test` or `live` when the key carries a recognizable mode prefix.
fn key_mode(value: &str) -> Option<&'static str> {
    if TEST_KEY_PREFIXES.iter().any(|prefix| value.starts_with(prefix)) {
        Some("test")
    } else if LIVE_KEY_PREFIXES.iter().any(|prefix| value.starts_with(prefix)) {
        Some("live")
    } else {
        None
    }
}

/// Records a warning when a key's prefix disagrees with the environment.
fn warn_on_key_mode_mismatch(
    audit: &dyn PolicyAuditSink,
    field: &'static str,
    value: &str,
    environment: RuntimeEnvironment,
) {
    let Some(mode) = key_mode(value) else {
        return;
    };
    let key_is_test = mode == "test";
    if key_is_test != environment.is_test_mode() {
        audit.record_key_mode_mismatch(&KeyModeMismatchEvent::new(field, mode, environment));
    }
}

/// Checks an already-present publishable key against the environment.
///
/// The key is optional at init, so a source failure here is recorded and
/// does not fail initialization.
fn check_publishable_key_mode(
    source: &dyn SecretsSource,
    audit: &dyn PolicyAuditSink,
    environment: RuntimeEnvironment,
) {
    match source.get(PUBLISHABLE_KEY_VAR) {
        Ok(Some(publishable)) => warn_on_key_mode_mismatch(
            audit,
            FIELD_PUBLISHABLE_KEY,
            publishable.trim(),
            environment,
        ),
        Ok(None) => {}
        Err(err) => audit.record_lookup_failure(&SecretLookupFailedEvent::new(
            FIELD_PUBLISHABLE_KEY,
            ConfigError::from(err).to_string(),
        )),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
