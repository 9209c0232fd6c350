//! # Versioned Content Digests
//!
//! Defines [`ContentDigest`] and [`DigestAlgorithm`] — the fingerprint
//! representation used to detect certificate tampering. Every digest carries
//! its algorithm tag so records hashed under an older algorithm remain
//! verifiable after a platform-wide migration.
//!
//! ## Invariant
//!
//! A [`ContentDigest`] can only be computed from [`CanonicalBytes`] — the
//! [`sha256_digest`] function does not accept raw byte slices.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;

/// The hash algorithm that produced a content digest.
///
/// The platform currently fingerprints exclusively with SHA-256. New
/// variants are appended when the platform migrates; old records keep their
/// original tag and stay verifiable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA-256 — 256-bit digest, the platform-wide algorithm since v1.
    Sha256,
}

/// A content digest with its algorithm tag.
///
/// The 32-byte digest and its algorithm are always stored together so that
/// verification code can select the correct hash function for old records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The hash algorithm that produced this digest.
    pub algorithm: DigestAlgorithm,
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Create a SHA-256 content digest from raw bytes.
    pub fn sha256(bytes: [u8; 32]) -> Self {
        Self {
            algorithm: DigestAlgorithm::Sha256,
            bytes,
        }
    }

    /// Return the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}:{}", self.algorithm, self.to_hex())
    }
}

/// Compute a SHA-256 content digest from canonical bytes.
///
/// This is the single digest computation path in the workspace. The input
/// must be [`CanonicalBytes`] — raw byte slices are not accepted.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    ContentDigest::sha256(hasher.finalize().into())
}
