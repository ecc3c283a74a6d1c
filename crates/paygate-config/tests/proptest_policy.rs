// crates/paygate-config/tests/proptest_policy.rs
// ============================================================================
// Module: Gateway Policy Property-Based Tests
// Description: Property tests for environment mapping, fees, and redaction.
// Purpose: Detect panics and invariant breaks across wide input ranges.
// ============================================================================

//! Property-based tests for gateway policy invariants.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::str::FromStr;

use bigdecimal::BigDecimal;
use paygate_config::ClientDescriptor;
use paygate_config::FeePercentage;
use paygate_config::RuntimeEnvironment;
use paygate_config::secrets::ENVIRONMENT_VAR;
use paygate_config::secrets::FEE_PERCENTAGE_VAR;
use paygate_config::secrets::SECRET_KEY_VAR;
use paygate_config::secrets::WEBHOOK_SECRET_VAR;
use proptest::prelude::*;

mod common;

proptest! {
    #[test]
    fn only_exact_production_label_is_live(label in "[ -~]{0,16}") {
        let source =
            common::source_with(&[(SECRET_KEY_VAR, "sk_x"), (ENVIRONMENT_VAR, label.as_str())]);
        let (policy, _audit) = common::init_policy(source).unwrap();
        prop_assert_eq!(policy.is_test_mode(), label != "production");
        prop_assert_eq!(policy.client_descriptor().telemetry_enabled, label == "production");
    }

    #[test]
    fn descriptor_is_stable_across_calls(label in prop_oneof![
        Just("development"),
        Just("staging"),
        Just("production"),
        Just("qa"),
    ]) {
        let source = common::source_with(&[(SECRET_KEY_VAR, "sk_x"), (ENVIRONMENT_VAR, label)]);
        let (policy, _audit) = common::init_policy(source).unwrap();
        let first = policy.client_descriptor().clone();
        prop_assert_eq!(&first, policy.client_descriptor());
        prop_assert_eq!(first, ClientDescriptor::for_environment(policy.environment()));
    }

    #[test]
    fn in_range_fees_round_trip_exactly(whole in 0u32 ..= 99, hundredths in 0u32 ..= 99) {
        let raw = format!("{whole}.{hundredths:02}");
        let source =
            common::source_with(&[(SECRET_KEY_VAR, "sk_x"), (FEE_PERCENTAGE_VAR, raw.as_str())]);
        let (policy, _audit) = common::init_policy(source).unwrap();
        let expected = BigDecimal::from_str(&raw).unwrap();
        prop_assert_eq!(policy.application_fee_percentage().as_decimal(), &expected);
    }

    #[test]
    fn out_of_range_fees_never_initialize(excess in 1u32 .. 1_000_000) {
        let above = format!("{}", 100 + excess);
        let below = format!("-{excess}");
        for raw in [above, below] {
            let pairs = [(SECRET_KEY_VAR, "sk_x"), (FEE_PERCENTAGE_VAR, raw.as_str())];
            let source = common::source_with(&pairs);
            let error = common::init_policy(source).unwrap_err();
            prop_assert_eq!(error.field(), Some("feePercentage"));
        }
    }

    #[test]
    fn fee_split_conserves_gross(gross in any::<u64>(), pct in 0u32 ..= 100) {
        let fee = FeePercentage::from_decimal(BigDecimal::from(pct)).unwrap();
        let split = fee.split_minor_units(gross);
        prop_assert_eq!(split.platform_fee + split.recipient, gross);
        prop_assert!(split.platform_fee <= gross);
        if pct == 0 {
            prop_assert_eq!(split.platform_fee, 0);
        }
        if pct == 100 {
            prop_assert_eq!(split.recipient, 0);
        }
    }

    #[test]
    fn fee_parse_never_panics(raw in "\\PC{0,40}") {
        let _ = FeePercentage::parse(&raw);
    }

    #[test]
    fn environment_parse_matches_label(label in "[a-z]{0,12}") {
        match RuntimeEnvironment::parse_label(&label) {
            Some(environment) => prop_assert_eq!(environment.label(), label.as_str()),
            None => prop_assert_eq!(
                RuntimeEnvironment::from_label(&label),
                RuntimeEnvironment::Development
            ),
        }
    }

    #[test]
    fn audit_records_never_carry_secret_values(suffix in "[A-Za-z0-9]{8,32}") {
        let secret = format!("sk_live_{suffix}");
        let webhook = format!("whsec_{suffix}");
        let source = common::source_with(&[
            (SECRET_KEY_VAR, secret.as_str()),
            (WEBHOOK_SECRET_VAR, webhook.as_str()),
            (ENVIRONMENT_VAR, "production"),
        ]);
        let (policy, audit) = common::init_policy(source).unwrap();
        let _ = policy.publishable_key();
        let rendered = format!("{policy:?}");
        prop_assert!(!rendered.contains(&secret));
        for line in audit.lines() {
            prop_assert!(!line.contains(&secret));
            prop_assert!(!line.contains(&webhook));
        }
    }
}
