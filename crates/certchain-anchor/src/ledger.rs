//! # Anchor Ledger — Generic Trait Interface
//!
//! Defines the object-safe [`AnchorLedger`] trait that abstracts over
//! the external ledger used to anchor certificate fingerprints. The
//! issuance service submits a fingerprint and receives back an opaque
//! [`AnchorRef`]; the verification service later asks the same ledger
//! to confirm that the reference still commits to that fingerprint.
//!
//! Ledger failures come in two shapes with very different handling:
//!
//! - [`AnchorError::Unavailable`] is transient. Issuance still
//!   succeeds, the certificate is persisted in a pending-retry state,
//!   and a later sweep re-submits the fingerprint.
//! - [`AnchorError::Rejected`] is terminal. The ledger refused the
//!   submission outright and issuance must abort without a record.
//!
//! Implementations must be `Send + Sync` so they can be shared across
//! async handler tasks behind an `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use certchain_core::{AnchorRef, ContentDigest};

/// Errors returned by an anchor ledger.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnchorError {
    /// The ledger is temporarily unreachable. The submission may be
    /// retried later with the same fingerprint.
    #[error("ledger unavailable: {reason}")]
    Unavailable {
        /// Human-readable reason for the outage.
        reason: String,
    },

    /// The ledger refused the submission. Retrying with the same
    /// payload will not succeed.
    #[error("ledger rejected submission: {reason}")]
    Rejected {
        /// Human-readable reason for the refusal.
        reason: String,
    },
}

impl AnchorError {
    /// Whether the failed operation may be retried later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Object-safe interface to an external anchoring ledger.
///
/// `anchor` and `confirm` are deliberately synchronous: concrete
/// implementations that wrap a network client block on their own
/// runtime internally, which keeps this trait object-safe and free of
/// async plumbing at the call sites.
pub trait AnchorLedger: Send + Sync {
    /// Submit a fingerprint for anchoring and return the opaque
    /// reference under which the ledger recorded it.
    fn anchor(&self, digest: &ContentDigest) -> Result<AnchorRef, AnchorError>;

    /// Check whether `anchor_ref` commits to `digest` on the ledger.
    ///
    /// `Ok(false)` means the ledger answered and the commitment does
    /// not match (unknown reference, or a different fingerprint).
    /// Transient outages surface as [`AnchorError::Unavailable`].
    fn confirm(&self, anchor_ref: &AnchorRef, digest: &ContentDigest) -> Result<bool, AnchorError>;

    /// Human-readable name of the ledger implementation
    /// (e.g. "InMemoryLedger", "MerkleBatchLedger").
    fn ledger_name(&self) -> &str;
}

impl fmt::Debug for dyn AnchorLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnchorLedger({})", self.ledger_name())
    }
}

/// Ledger that records every anchor immediately in process memory.
///
/// The default ledger for development deployments and the handler
/// test suite. Anchors are confirmable the moment `anchor` returns.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    entries: RwLock<HashMap<String, ContentDigest>>,
    sequence: AtomicU64,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of anchors recorded so far.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no anchors have been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl AnchorLedger for InMemoryLedger {
    fn anchor(&self, digest: &ContentDigest) -> Result<AnchorRef, AnchorError> {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let reference = format!("mem:{seq:016x}");
        self.entries.write().insert(reference.clone(), digest.clone());
        AnchorRef::new(reference).map_err(|e| AnchorError::Rejected {
            reason: e.to_string(),
        })
    }

    fn confirm(&self, anchor_ref: &AnchorRef, digest: &ContentDigest) -> Result<bool, AnchorError> {
        let entries = self.entries.read();
        Ok(entries.get(anchor_ref.as_str()) == Some(digest))
    }

    fn ledger_name(&self) -> &str {
        "InMemoryLedger"
    }
}

/// Ledger that reports a transient outage on every call.
///
/// Used to exercise the deferred-anchoring path: issuance against
/// this ledger persists certificates in the pending-retry state.
#[derive(Debug, Default)]
pub struct OfflineLedger;

impl AnchorLedger for OfflineLedger {
    fn anchor(&self, _digest: &ContentDigest) -> Result<AnchorRef, AnchorError> {
        Err(AnchorError::Unavailable {
            reason: "ledger offline".to_string(),
        })
    }

    fn confirm(&self, _anchor_ref: &AnchorRef, _digest: &ContentDigest) -> Result<bool, AnchorError> {
        Err(AnchorError::Unavailable {
            reason: "ledger offline".to_string(),
        })
    }

    fn ledger_name(&self) -> &str {
        "OfflineLedger"
    }
}

/// Ledger that refuses every submission outright.
///
/// Used to exercise the abort path: issuance against this ledger
/// fails terminally and leaves no certificate record behind.
#[derive(Debug, Default)]
pub struct RejectingLedger;

impl AnchorLedger for RejectingLedger {
    fn anchor(&self, _digest: &ContentDigest) -> Result<AnchorRef, AnchorError> {
        Err(AnchorError::Rejected {
            reason: "submissions disabled".to_string(),
        })
    }

    fn confirm(&self, _anchor_ref: &AnchorRef, _digest: &ContentDigest) -> Result<bool, AnchorError> {
        Ok(false)
    }

    fn ledger_name(&self) -> &str {
        "RejectingLedger"
    }
}
