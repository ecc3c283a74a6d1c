// crates/paygate-cli/src/report.rs
// ============================================================================
// Module: CLI Reports
// Description: Secrets source assembly and JSON report shapes for the CLI.
// Purpose: Keep command logic testable outside the binary entry point.
// Dependencies: paygate-config, serde
// ============================================================================

//! ## Overview
//! The binary builds its [`SecretsSource`] here and renders policy state
//! into serializable reports. Reports carry presence flags and derived
//! settings only; no report field can hold a secret value.

use std::path::Path;
use std::sync::Arc;

use paygate_config::ClientDescriptor;
use paygate_config::ConfigError;
use paygate_config::EnvSecretsSource;
use paygate_config::FeePercentage;
use paygate_config::FeeSplit;
use paygate_config::FileSecretsSource;
use paygate_config::GatewayPolicy;
use paygate_config::LayeredSecretsSource;
use paygate_config::RuntimeEnvironment;
use paygate_config::SecretsError;
use paygate_config::SecretsSource;
use serde::Serialize;

// ============================================================================
// SECTION: Source Assembly
// ============================================================================

/// Builds the CLI secrets source: environment first, then the optional file.
///
/// # Errors
///
/// Returns [`SecretsError`] when the secrets file fails its load guards.
pub fn build_source(
    secrets_file: Option<&Path>,
    env_prefix: Option<&str>,
) -> Result<Arc<dyn SecretsSource>, SecretsError> {
    let env = env_prefix.map_or_else(EnvSecretsSource::new, EnvSecretsSource::with_prefix);
    let Some(path) = secrets_file else {
        return Ok(Arc::new(env));
    };
    let file = FileSecretsSource::load(path)?;
    Ok(Arc::new(LayeredSecretsSource::new().with_layer(Arc::new(env)).with_layer(Arc::new(file))))
}

// ============================================================================
// SECTION: Check Report
// ============================================================================

/// Whether the secondary secrets were resolved during a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryStatus {
    /// Only construction-time settings were validated.
    NotChecked,
    /// Publishable key and webhook secret both resolved.
    Present,
}

/// Summary printed by `paygate check`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// Resolved runtime environment.
    pub environment: RuntimeEnvironment,
    /// Whether the gateway runs in test mode.
    pub test_mode: bool,
    /// Effective platform fee percentage.
    pub fee_percentage: FeePercentage,
    /// Provider client settings.
    pub client: ClientDescriptor,
    /// Secondary secret resolution status.
    pub secondary_secrets: SecondaryStatus,
}

impl CheckReport {
    /// Captures construction-time settings from an initialized policy.
    #[must_use]
    pub fn from_policy(policy: &GatewayPolicy) -> Self {
        Self {
            environment: policy.environment(),
            test_mode: policy.is_test_mode(),
            fee_percentage: policy.application_fee_percentage().clone(),
            client: policy.client_descriptor().clone(),
            secondary_secrets: SecondaryStatus::NotChecked,
        }
    }

    /// Resolves the publishable key and webhook secret, recording success.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] raised by a secondary lookup.
    pub fn require_secondary(mut self, policy: &GatewayPolicy) -> Result<Self, ConfigError> {
        policy.publishable_key()?;
        policy.webhook_secret()?;
        self.secondary_secrets = SecondaryStatus::Present;
        Ok(self)
    }
}

// ============================================================================
// SECTION: Fee Report
// ============================================================================

/// Fee split printed by `paygate fee`.
#[derive(Debug, Clone, Serialize)]
pub struct FeeReport {
    /// Percentage applied to the donation.
    pub fee_percentage: FeePercentage,
    /// Resulting split in minor units.
    #[serde(flatten)]
    pub split: FeeSplit,
}

impl FeeReport {
    /// Splits `gross` minor units with the given percentage.
    #[must_use]
    pub fn new(fee_percentage: &FeePercentage, gross: u64) -> Self {
        Self {
            fee_percentage: fee_percentage.clone(),
            split: fee_percentage.split_minor_units(gross),
        }
    }
}
