// crates/paygate-cli/tests/i18n.rs
// ============================================================================
// Module: CLI Message Catalog Tests
// Description: Exercises catalog lookup and placeholder substitution.
// Purpose: Ensure CLI output strings route through stable catalog helpers.
// Dependencies: paygate-cli i18n module and the `t!` macro.
// ============================================================================

//! ## Overview
//! Validates the paygate CLI message catalog:
//! - Message arguments capture key/value substitutions.
//! - Lookups fall back to the key on misses.
//! - The [`t!`](paygate_cli::t) macro formats placeholders correctly.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

use paygate_cli::i18n::MessageArg;
use paygate_cli::i18n::translate;
use paygate_cli::t;

/// Confirms message arguments capture key/value pairs.
#[test]
fn message_arg_new_captures_key_and_value() {
    let arg = MessageArg::new("field", "secretKey");
    assert_eq!(arg.key, "field");
    assert_eq!(arg.value, "secretKey");
}

/// Confirms catalog entries resolve and replace placeholders.
#[test]
fn translate_substitutes_placeholders() {
    let args = vec![MessageArg::new("version", "0.1.0")];
    assert_eq!(translate("main.version", args), "paygate 0.1.0");
}

/// Confirms missing keys fall back to the key string.
#[test]
fn translate_falls_back_to_key() {
    assert_eq!(translate("missing.key", Vec::new()), "missing.key");
}

/// Confirms the macro substitutes every named argument.
#[test]
fn macro_formats_multiple_placeholders() {
    let message = t!(
        "policy.invalid_field",
        field = "feePercentage",
        error = "out of range",
        public = "payment temporarily unavailable"
    );
    assert_eq!(
        message,
        "Gateway configuration invalid (feePercentage): out of range. End users see: \"payment \
         temporarily unavailable\""
    );
}
