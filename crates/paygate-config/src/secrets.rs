// crates/paygate-config/src/secrets.rs
// ============================================================================
// Module: Gateway Secrets Sources
// Description: Key/value lookup of gateway secrets from env, files, or memory.
// Purpose: Keep secret retrieval behind one trait so the policy stays pure.
// Dependencies: secrecy, thiserror, toml
// ============================================================================

//! ## Overview
//! A [`SecretsSource`] answers lookups for the recognized gateway keys. The
//! policy never reads the process environment directly; deployments choose a
//! source (or a [`LayeredSecretsSource`] of several) and inject it.
//!
//! Security posture: secrets files are untrusted input and are parsed with
//! the same size, encoding, and path limits as other config inputs. Error
//! messages name keys, never values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::env::VarError;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::RwLock;

use secrecy::ExposeSecret;
use secrecy::SecretString;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Key holding the secret API key used for outbound gateway calls.
pub const SECRET_KEY_VAR: &str = "GATEWAY_SECRET_KEY";
/// Key holding the publishable key handed to untrusted clients.
pub const PUBLISHABLE_KEY_VAR: &str = "GATEWAY_PUBLISHABLE_KEY";
/// Key holding the webhook signing secret.
pub const WEBHOOK_SECRET_VAR: &str = "GATEWAY_WEBHOOK_SECRET";
/// Key selecting the runtime environment.
pub const ENVIRONMENT_VAR: &str = "RUNTIME_ENVIRONMENT";
/// Key holding the platform fee percentage.
pub const FEE_PERCENTAGE_VAR: &str = "PLATFORM_FEE_PERCENTAGE";
/// All keys a secrets file may contain.
pub const RECOGNIZED_KEYS: [&str; 5] = [
    SECRET_KEY_VAR,
    PUBLISHABLE_KEY_VAR,
    WEBHOOK_SECRET_VAR,
    ENVIRONMENT_VAR,
    FEE_PERCENTAGE_VAR,
];
/// Maximum secrets file size in bytes.
pub(crate) const MAX_SECRETS_FILE_SIZE: usize = 64 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of a single secret value.
pub(crate) const MAX_SECRET_VALUE_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Secrets lookup or loading errors.
#[derive(Debug, Error)]
pub enum SecretsError {
    /// I/O failure while reading a secrets file.
    #[error("secrets io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("secrets parse error: {0}")]
    Parse(String),
    /// Secrets input violated a format or size rule.
    #[error("invalid secrets: {0}")]
    Invalid(String),
    /// The backing store could not answer the lookup.
    #[error("secrets source unavailable: {0}")]
    Unavailable(String),
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Lookup interface over environment-scoped gateway configuration.
pub trait SecretsSource: Send + Sync {
    /// Returns the value stored under `key`, or `None` when it is unset.
    ///
    /// # Errors
    ///
    /// Returns [`SecretsError`] when the source cannot answer the lookup.
    fn get(&self, key: &str) -> Result<Option<String>, SecretsError>;

    /// Returns the value under `key`, falling back to `default` when unset.
    ///
    /// # Errors
    ///
    /// Returns [`SecretsError`] when the source cannot answer the lookup.
    fn get_or(&self, key: &str, default: &str) -> Result<String, SecretsError> {
        Ok(self.get(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// Short label identifying the source kind in audit records.
    fn label(&self) -> &'static str;
}

// ============================================================================
// SECTION: Environment Source
// ============================================================================

/// Reads secrets from process environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvSecretsSource {
    /// Optional prefix prepended to every key (e.g. `DONATIONS_`).
    prefix: Option<String>,
}

impl EnvSecretsSource {
    /// Creates a source reading unprefixed variables.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            prefix: None,
        }
    }

    /// Creates a source reading variables named `{prefix}{key}`.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    /// Returns the environment variable name consulted for `key`.
    #[must_use]
    pub fn variable_name(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{key}"),
            None => key.to_string(),
        }
    }
}

impl SecretsSource for EnvSecretsSource {
    fn get(&self, key: &str) -> Result<Option<String>, SecretsError> {
        let name = self.variable_name(key);
        match env::var(&name) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => {
                Err(SecretsError::Invalid(format!("{name} is not valid unicode")))
            }
        }
    }

    fn label(&self) -> &'static str {
        "env"
    }
}

// ============================================================================
// SECTION: Memory Source
// ============================================================================

/// In-memory secrets map that can be updated after construction.
#[derive(Default)]
pub struct MemorySecretsSource {
    /// Stored values keyed by secret name.
    values: RwLock<BTreeMap<String, String>>,
}

impl MemorySecretsSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source pre-populated with the given pairs.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs.into_iter().map(|(key, value)| (key.into(), value.into())).collect();
        Self {
            values: RwLock::new(values),
        }
    }

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`SecretsError::Unavailable`] when the map lock is poisoned.
    pub fn insert(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), SecretsError> {
        let mut values = self.values.write().map_err(|_| poisoned())?;
        values.insert(key.into(), value.into());
        Ok(())
    }

    /// Removes the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`SecretsError::Unavailable`] when the map lock is poisoned.
    pub fn remove(&self, key: &str) -> Result<(), SecretsError> {
        let mut values = self.values.write().map_err(|_| poisoned())?;
        values.remove(key);
        Ok(())
    }
}

impl fmt::Debug for MemorySecretsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> =
            self.values.read().map(|values| values.keys().cloned().collect()).unwrap_or_default();
        f.debug_struct("MemorySecretsSource").field("keys", &keys).finish()
    }
}

impl SecretsSource for MemorySecretsSource {
    fn get(&self, key: &str) -> Result<Option<String>, SecretsError> {
        let values = self.values.read().map_err(|_| poisoned())?;
        Ok(values.get(key).cloned())
    }

    fn label(&self) -> &'static str {
        "memory"
    }
}

/// Error returned when the memory source lock was poisoned by a panic.
fn poisoned() -> SecretsError {
    SecretsError::Unavailable("memory secrets lock poisoned".to_string())
}

// ============================================================================
// SECTION: File Source
// ============================================================================

/// Secrets loaded once from a flat TOML table of string values.
#[derive(Debug)]
pub struct FileSecretsSource {
    /// Parsed values keyed by recognized secret name.
    values: BTreeMap<String, SecretString>,
}

impl FileSecretsSource {
    /// Loads a secrets file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`SecretsError`] when the path, size, encoding, or contents
    /// are invalid.
    pub fn load(path: &Path) -> Result<Self, SecretsError> {
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| SecretsError::Io(err.to_string()))?;
        if bytes.len() > MAX_SECRETS_FILE_SIZE {
            return Err(SecretsError::Invalid("secrets file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| SecretsError::Invalid("secrets file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses secrets from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`SecretsError`] when the text is not a flat table of
    /// recognized string keys.
    pub fn from_toml_str(content: &str) -> Result<Self, SecretsError> {
        let table: toml::Table =
            toml::from_str(content).map_err(|err| SecretsError::Parse(err.message().to_string()))?;
        let mut values = BTreeMap::new();
        for (key, value) in table {
            if !RECOGNIZED_KEYS.contains(&key.as_str()) {
                return Err(SecretsError::Invalid(format!("unrecognized secrets key: {key}")));
            }
            let toml::Value::String(text) = value else {
                return Err(SecretsError::Invalid(format!("{key} must be a string")));
            };
            if text.len() > MAX_SECRET_VALUE_LENGTH {
                return Err(SecretsError::Invalid(format!("{key} exceeds max length")));
            }
            values.insert(key, SecretString::from(text));
        }
        Ok(Self {
            values,
        })
    }

    /// Returns the number of keys present in the file.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when the file contained no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SecretsSource for FileSecretsSource {
    fn get(&self, key: &str) -> Result<Option<String>, SecretsError> {
        Ok(self.values.get(key).map(|value| value.expose_secret().to_string()))
    }

    fn label(&self) -> &'static str {
        "file"
    }
}

/// Validates a secrets file path against length limits.
fn validate_path(path: &Path) -> Result<(), SecretsError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SecretsError::Invalid("secrets path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SecretsError::Invalid("secrets path component too long".to_string()));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Layered Source
// ============================================================================

/// Ordered stack of sources; the first layer holding a non-blank value wins.
#[derive(Default)]
pub struct LayeredSecretsSource {
    /// Layers in priority order.
    layers: Vec<Arc<dyn SecretsSource>>,
}

impl LayeredSecretsSource {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a lower-priority layer.
    #[must_use]
    pub fn with_layer(mut self, layer: Arc<dyn SecretsSource>) -> Self {
        self.layers.push(layer);
        self
    }

    /// Returns the number of layers.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.layers.len()
    }
}

impl fmt::Debug for LayeredSecretsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&'static str> = self.layers.iter().map(|layer| layer.label()).collect();
        f.debug_struct("LayeredSecretsSource").field("layers", &labels).finish()
    }
}

impl SecretsSource for LayeredSecretsSource {
    fn get(&self, key: &str) -> Result<Option<String>, SecretsError> {
        for layer in &self.layers {
            // Blank values do not shadow lower layers.
            if let Some(value) = layer.get(key)?
                && !value.trim().is_empty()
            {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn label(&self) -> &'static str {
        "layered"
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
