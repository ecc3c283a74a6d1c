//! Secrets source validation tests for paygate-config.
// crates/paygate-config/tests/source_validation.rs
// =============================================================================
// Module: Secrets Source Validation Tests
// Description: Validate secrets file guards and layered lookup precedence.
// Purpose: Ensure secrets input handling is strict and fail-closed.
// =============================================================================

#![allow(clippy::use_debug, reason = "Failure messages render lookup results.")]

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use paygate_config::BufferedPolicyAuditSink;
use paygate_config::EnvSecretsSource;
use paygate_config::FileSecretsSource;
use paygate_config::GatewayPolicy;
use paygate_config::LayeredSecretsSource;
use paygate_config::MemorySecretsSource;
use paygate_config::SecretsError;
use paygate_config::SecretsSource;
use paygate_config::secrets::ENVIRONMENT_VAR;
use paygate_config::secrets::FEE_PERCENTAGE_VAR;
use paygate_config::secrets::PUBLISHABLE_KEY_VAR;
use paygate_config::secrets::SECRET_KEY_VAR;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<FileSecretsSource, SecretsError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid secrets load".to_string()),
    }
}

fn write_secrets(contents: &[u8]) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(contents).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(FileSecretsSource::load(path), "secrets path exceeds max length")
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let component = "b".repeat(300);
    let path = Path::new("secrets").join(component);
    assert_invalid(FileSecretsSource::load(&path), "secrets path component too long")
}

#[test]
fn load_rejects_missing_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    assert_invalid(FileSecretsSource::load(&dir.path().join("absent.toml")), "secrets io error")
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let file = write_secrets(&vec![b'#'; 64 * 1024 + 1])?;
    assert_invalid(FileSecretsSource::load(file.path()), "secrets file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8() -> TestResult {
    let file = write_secrets(&[0xff, 0xfe, 0xfd])?;
    assert_invalid(FileSecretsSource::load(file.path()), "secrets file must be utf-8")
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    let file = write_secrets(b"GATEWAY_SECRET_KEY = \n")?;
    assert_invalid(FileSecretsSource::load(file.path()), "secrets parse error")
}

#[test]
fn load_rejects_unrecognized_keys() -> TestResult {
    let file = write_secrets(b"GATEWAY_SECRET_KEY = \"sk_x\"\nDATABASE_URL = \"postgres://\"\n")?;
    assert_invalid(FileSecretsSource::load(file.path()), "unrecognized secrets key: DATABASE_URL")
}

#[test]
fn load_rejects_non_string_values() -> TestResult {
    let file = write_secrets(b"PLATFORM_FEE_PERCENTAGE = 12\n")?;
    let result = FileSecretsSource::load(file.path());
    assert_invalid(result, "PLATFORM_FEE_PERCENTAGE must be a string")
}

#[test]
fn load_rejects_nested_tables() -> TestResult {
    let file = write_secrets(b"[GATEWAY_SECRET_KEY]\nvalue = \"sk_x\"\n")?;
    assert_invalid(FileSecretsSource::load(file.path()), "GATEWAY_SECRET_KEY must be a string")
}

#[test]
fn load_error_never_echoes_values() -> TestResult {
    let file = write_secrets(b"GATEWAY_SECRET_KEY = \"sk_live_leak\"\nOTHER = \"x\"\n")?;
    match FileSecretsSource::load(file.path()) {
        Err(error) if error.to_string().contains("sk_live_leak") => {
            Err("error message leaked a secret value".to_string())
        }
        Err(_) => Ok(()),
        Ok(_) => Err("unrecognized key should fail".to_string()),
    }
}

#[test]
fn loaded_file_initializes_policy() -> TestResult {
    let file = write_secrets(
        b"GATEWAY_SECRET_KEY = \"sk_live_abc\"\n\
          RUNTIME_ENVIRONMENT = \"production\"\n\
          PLATFORM_FEE_PERCENTAGE = \"2.5\"\n",
    )?;
    let source = FileSecretsSource::load(file.path()).map_err(|err| err.to_string())?;
    if source.len() != 3 {
        return Err(format!("expected three keys, got {}", source.len()));
    }
    let audit = Arc::new(BufferedPolicyAuditSink::new());
    let policy = GatewayPolicy::initialize(Arc::new(source), audit.clone())
        .map_err(|err| err.to_string())?;
    if policy.is_test_mode() || policy.application_fee_percentage().to_string() != "2.5" {
        return Err("file values were not applied".to_string());
    }
    let lines = audit.lines();
    if !lines.iter().any(|line| line.contains("\"secrets_source\":\"file\"")) {
        return Err("audit record should name the file source".to_string());
    }
    Ok(())
}

#[test]
fn layered_source_prefers_earlier_non_blank_layers() -> TestResult {
    let overrides = Arc::new(MemorySecretsSource::from_pairs([
        (SECRET_KEY_VAR, "sk_override"),
        (ENVIRONMENT_VAR, "  "),
    ]));
    let defaults = Arc::new(MemorySecretsSource::from_pairs([
        (SECRET_KEY_VAR, "sk_default"),
        (ENVIRONMENT_VAR, "staging"),
        (FEE_PERCENTAGE_VAR, "5"),
    ]));
    let layered = LayeredSecretsSource::new().with_layer(overrides).with_layer(defaults);

    let secret = layered.get(SECRET_KEY_VAR).map_err(|err| err.to_string())?;
    if secret.as_deref() != Some("sk_override") {
        return Err(format!("unexpected secret layer: {secret:?}"));
    }
    let environment = layered.get(ENVIRONMENT_VAR).map_err(|err| err.to_string())?;
    if environment.as_deref() != Some("staging") {
        return Err("blank override should fall through".to_string());
    }
    if layered.get(PUBLISHABLE_KEY_VAR).map_err(|err| err.to_string())?.is_some() {
        return Err("absent keys should stay absent".to_string());
    }
    Ok(())
}

#[test]
fn layered_source_sees_late_updates_in_lower_layers() -> TestResult {
    let late = Arc::new(MemorySecretsSource::new());
    let layered = Arc::new(
        LayeredSecretsSource::new()
            .with_layer(Arc::new(MemorySecretsSource::from_pairs([(SECRET_KEY_VAR, "sk_x")])))
            .with_layer(late.clone()),
    );
    let policy =
        GatewayPolicy::initialize(layered, Arc::new(BufferedPolicyAuditSink::new()))
            .map_err(|err| err.to_string())?;
    if policy.publishable_key().is_ok() {
        return Err("publishable key should be missing".to_string());
    }
    late.insert(PUBLISHABLE_KEY_VAR, "pk_live_late").map_err(|err| err.to_string())?;
    let key = policy.publishable_key().map_err(|err| err.to_string())?;
    if key != "pk_live_late" {
        return Err(format!("unexpected key {key}"));
    }
    Ok(())
}

#[test]
fn env_source_reports_unset_prefixed_keys_as_absent() -> TestResult {
    let source = EnvSecretsSource::with_prefix("PAYGATE_TEST_UNSET_7F3A_");
    if source.get(SECRET_KEY_VAR).map_err(|err| err.to_string())?.is_some() {
        return Err("unset variable should be absent".to_string());
    }
    if source.get_or(ENVIRONMENT_VAR, "development").map_err(|err| err.to_string())?
        != "development"
    {
        return Err("get_or should return the default".to_string());
    }
    if source.variable_name(SECRET_KEY_VAR) != "PAYGATE_TEST_UNSET_7F3A_GATEWAY_SECRET_KEY" {
        return Err("prefix should be prepended".to_string());
    }
    Ok(())
}
