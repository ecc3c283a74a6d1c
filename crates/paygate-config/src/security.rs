// crates/paygate-config/src/security.rs
// ============================================================================
// Module: Secret Handling Helpers
// Description: Constant-time comparison and fingerprinting for secret material.
// Purpose: Provide reusable, side-channel resistant secret utilities.
// Dependencies: sha2, subtle
// ============================================================================

//! ## Overview
//! Exposes a constant-time equality helper for signatures, plus a
//! short SHA-256 fingerprint so audit records can correlate a credential
//! without ever carrying it.

use sha2::Digest;
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Number of hex characters kept in a secret fingerprint.
const FINGERPRINT_HEX_LENGTH: usize = 12;

// ============================================================================
// SECTION: Constant-Time Comparisons
// ============================================================================

/// Compares two byte slices in constant time.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

// ============================================================================
// SECTION: Fingerprints
// ============================================================================

/// Returns a truncated SHA-256 hex fingerprint of a secret value.
#[must_use]
pub fn secret_fingerprint(value: &str) -> String {
    let digest = hex::encode(Sha256::digest(value.as_bytes()));
    digest[.. FINGERPRINT_HEX_LENGTH].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_time_eq_matches_equal_inputs() {
        assert!(constant_time_eq(b"whsec", b"whsec"));
        assert!(constant_time_eq(b"", b""));
        assert!(!constant_time_eq(b"whsec", b"whsed"));
        assert!(!constant_time_eq(b"short", b"longer"));
    }

    #[test]
    fn fingerprint_is_stable_and_short() {
        let first = secret_fingerprint("sk_live_abc");
        assert_eq!(first.len(), FINGERPRINT_HEX_LENGTH);
        assert_eq!(first, secret_fingerprint("sk_live_abc"));
        assert_ne!(first, secret_fingerprint("sk_live_abd"));
        assert!(!first.contains("sk_live"));
    }
}
