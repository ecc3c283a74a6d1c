// crates/paygate-config/src/webhook.rs
// ============================================================================
// Module: Webhook Signature Verification
// Description: Capability wrapper around the gateway webhook signing secret.
// Purpose: Verify inbound gateway callbacks without exposing the secret.
// Dependencies: hex, hmac, secrecy, sha2, thiserror
// ============================================================================

//! ## Overview
//! [`WebhookSecret`] is the only form in which the webhook secret leaves the
//! policy. It can verify a signature header and nothing else: it has no
//! `Display`, and its `Debug` output is redacted.
//!
//! Signature headers carry a unix timestamp and one or more HMAC-SHA256
//! signatures over `"{timestamp}.{body}"`:
//!
//! ```text
//! t=1718900000,v1=5257a869e7ecebeda32affa62cdca3fa51cad7e77a0e56ff536d0ce8e108d8bd
//! ```
//!
//! Security posture: headers are untrusted and bounded; comparisons are
//! constant-time; stale timestamps fail closed.

use hmac::Hmac;
use hmac::Mac;
use secrecy::ExposeSecret;
use secrecy::SecretString;
use sha2::Sha256;
use thiserror::Error;

use crate::security::constant_time_eq;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default accepted clock skew between signing and verification, in seconds.
pub const DEFAULT_SIGNATURE_TOLERANCE_SECS: u64 = 300;
/// Maximum accepted signature header size in bytes.
const MAX_SIGNATURE_HEADER_BYTES: usize = 4096;
/// Signature scheme label accepted by the verifier.
const SIGNATURE_SCHEME: &str = "v1";
/// Timestamp label in the signature header.
const TIMESTAMP_LABEL: &str = "t";

/// HMAC-SHA256 keyed by the webhook secret.
type HmacSha256 = Hmac<Sha256>;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Webhook verification failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    /// Signature header could not be parsed.
    #[error("malformed signature header: {0}")]
    MalformedHeader(String),
    /// Signed timestamp is outside the tolerance window.
    #[error("signature timestamp outside tolerance")]
    TimestampOutsideTolerance,
    /// No signature in the header matched the payload.
    #[error("signature mismatch")]
    SignatureMismatch,
    /// Secret could not key the MAC.
    #[error("webhook secret unusable")]
    InvalidSecret,
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Webhook signing secret usable only for signature verification.
#[derive(Debug)]
pub struct WebhookSecret {
    /// Raw signing secret.
    secret: SecretString,
}

impl WebhookSecret {
    /// Wraps a secret value fetched by the policy.
    pub(crate) fn new(value: String) -> Self {
        Self {
            secret: SecretString::from(value),
        }
    }

    /// Verifies a signature header with the default tolerance.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError`] when the header is malformed, stale, or does
    /// not match the payload.
    pub fn verify(&self, payload: &[u8], header: &str, now_secs: u64) -> Result<(), WebhookError> {
        self.verify_with_tolerance(payload, header, now_secs, DEFAULT_SIGNATURE_TOLERANCE_SECS)
    }

    /// Verifies a signature header against an explicit tolerance window.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError`] when the header is malformed, stale, or does
    /// not match the payload.
    pub fn verify_with_tolerance(
        &self,
        payload: &[u8],
        header: &str,
        now_secs: u64,
        tolerance_secs: u64,
    ) -> Result<(), WebhookError> {
        let parsed = SignatureHeader::parse(header)?;
        if now_secs.abs_diff(parsed.timestamp) > tolerance_secs {
            return Err(WebhookError::TimestampOutsideTolerance);
        }
        let expected = self.expected_signature(parsed.timestamp, payload)?;
        let matched = parsed
            .signatures
            .iter()
            .fold(false, |found, candidate| found | constant_time_eq(&expected, candidate));
        if matched { Ok(()) } else { Err(WebhookError::SignatureMismatch) }
    }

    /// Computes the HMAC over `"{timestamp}.{payload}"`.
    fn expected_signature(&self, timestamp: u64, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| WebhookError::InvalidSecret)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

/// Parsed signature header.
struct SignatureHeader {
    /// Signed timestamp (unix seconds).
    timestamp: u64,
    /// Decoded candidate signatures for the accepted scheme.
    signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parses `t=...,v1=...` pairs; unknown schemes are ignored.
    fn parse(header: &str) -> Result<Self, WebhookError> {
        if header.len() > MAX_SIGNATURE_HEADER_BYTES {
            return Err(WebhookError::MalformedHeader("header too large".to_string()));
        }
        let mut timestamp = None;
        let mut signatures = Vec::new();
        for part in header.split(',') {
            let Some((label, value)) = part.trim().split_once('=') else {
                return Err(WebhookError::MalformedHeader("expected key=value pairs".to_string()));
            };
            match label {
                TIMESTAMP_LABEL => {
                    if timestamp.is_some() {
                        return Err(WebhookError::MalformedHeader(
                            "duplicate timestamp".to_string(),
                        ));
                    }
                    let parsed = value.parse::<u64>().map_err(|_| {
                        WebhookError::MalformedHeader("timestamp must be an integer".to_string())
                    })?;
                    timestamp = Some(parsed);
                }
                SIGNATURE_SCHEME => {
                    let decoded = hex::decode(value).map_err(|_| {
                        WebhookError::MalformedHeader("signature must be hex".to_string())
                    })?;
                    signatures.push(decoded);
                }
                _ => {}
            }
        }
        let timestamp = timestamp
            .ok_or_else(|| WebhookError::MalformedHeader("missing timestamp".to_string()))?;
        if signatures.is_empty() {
            return Err(WebhookError::MalformedHeader("missing v1 signature".to_string()));
        }
        Ok(Self {
            timestamp,
            signatures,
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
