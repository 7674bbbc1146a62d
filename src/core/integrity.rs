//! Content signatures for inline dialog bodies
//!
//! A signature is the SHA-256 digest of the content, encoded as padded
//! URL-safe base64. Verification never raises: anything that prevents a clean
//! comparison is reported as [`Verification::Unverifiable`].

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use sha2::{Digest, Sha256};

/// Algorithm identifier written to `alg` for signed inline content
pub const SHA256_ALG: &str = "sha256";

/// Sentinel `alg` for content that is only referenced by URL
pub const EXTERNAL_REFERENCE_ALG: &str = "external-reference";

/// Outcome of checking a body against its signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// Digest matches the signature
    Verified,
    /// Digest does not match: content changed or signature is stale
    Tampered,
    /// No local body, no signature, unknown algorithm or undecodable signature
    Unverifiable,
}

impl Verification {
    pub fn is_verified(&self) -> bool {
        matches!(self, Verification::Verified)
    }
}

/// Raw SHA-256 digest of `content`
pub fn digest(content: &[u8]) -> [u8; 32] {
    Sha256::digest(content).into()
}

/// Signature for `content`: URL-safe base64 of its SHA-256 digest
///
/// # Examples
///
/// ```
/// use vcon_dialog::core::integrity::sign;
///
/// assert_eq!(sign(b"hello"), "LPJNul-wow4m6DsqxbninhsWHlwfp0JecwQzYpOLmCQ=");
/// ```
pub fn sign(content: &[u8]) -> String {
    URL_SAFE.encode(digest(content))
}

/// URL-safe base64 encoding used for binary bodies
pub fn encode_base64url(content: &[u8]) -> String {
    URL_SAFE.encode(content)
}

/// Decode URL-safe base64, with or without padding
pub fn decode_base64url(encoded: &str) -> Option<Vec<u8>> {
    URL_SAFE
        .decode(encoded)
        .or_else(|_| URL_SAFE_NO_PAD.decode(encoded))
        .ok()
}

/// Check `candidates` against `signature` under `alg`
///
/// Each candidate is a byte view of the same body (the text itself, or its
/// decoded payload). Any candidate matching counts as verified.
pub fn verify<'a>(
    alg: &str,
    signature: &str,
    candidates: impl IntoIterator<Item = &'a [u8]>,
) -> Verification {
    if alg != SHA256_ALG {
        return Verification::Unverifiable;
    }

    let Some(expected) = decode_base64url(signature) else {
        return Verification::Unverifiable;
    };
    if expected.len() != 32 {
        return Verification::Unverifiable;
    }

    if candidates
        .into_iter()
        .any(|bytes| digest(bytes).as_slice() == expected.as_slice())
    {
        Verification::Verified
    } else {
        Verification::Tampered
    }
}
