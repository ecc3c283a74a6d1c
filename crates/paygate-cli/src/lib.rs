// crates/paygate-cli/src/lib.rs
// ============================================================================
// Module: Paygate CLI Library
// Description: Shared helpers for the paygate binary.
// Purpose: Expose the message catalog and report builders to the binary and tests.
// Dependencies: paygate-config, serde
// ============================================================================

//! ## Overview
//! Support code for the `paygate` operator CLI: the [`t!`] message catalog
//! and the source and report builders used by each command.

pub mod i18n;
pub mod report;
