#![deny(missing_docs)]

//! # certchain-core — Foundational Types for the CertChain Engine
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies — only `serde`, `serde_json`,
//! `thiserror`, `chrono`, `uuid`, and `sha2` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** Every identifier is a
//!    distinct type. You cannot pass a [`UserId`] where a [`CertificateId`]
//!    is expected, and a [`SerialNumber`] is only constructible in checksummed
//!    form.
//!
//! 2. **[`CanonicalBytes`] is the sole path to digest computation.** Every
//!    fingerprint in the engine flows through `CanonicalBytes::new()`, which
//!    applies canonicalization rules (float rejection, datetime normalization,
//!    sorted keys, compact separators) so that two machines computing the
//!    fingerprint of the same logical certificate produce identical bytes.
//!
//! 3. **Digests carry their algorithm tag.** [`ContentDigest`] stores the
//!    [`DigestAlgorithm`] alongside the raw bytes so records hashed under an
//!    older algorithm remain verifiable after a platform-wide migration.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod serial;
pub mod temporal;

// Re-export primary types at crate root for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, ValidationError};
pub use identity::{AnchorRef, CertificateId, TemplateId, UserId};
pub use serial::SerialNumber;
pub use temporal::Timestamp;
