//! # Merkle Batch Anchoring
//!
//! Batches fingerprints into a SHA-256 Merkle tree so a whole batch is
//! committed under a single root. Membership is confirmed with a proof
//! that folds the leaf hash against its siblings level by level.
//!
//! Pairs are hashed in sorted order, so a proof carries only the
//! sibling hashes and no left/right direction bits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use sha2::{Digest, Sha256};

use certchain_core::{AnchorRef, ContentDigest};

use crate::ledger::{AnchorError, AnchorLedger};

/// Maximum number of fingerprints committed under one Merkle root.
pub const MAX_PROOF_BATCH: usize = 50;

/// Membership proof for one leaf of a committed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    /// The leaf hash the proof is for.
    pub leaf: [u8; 32],
    /// Sibling hashes from the leaf level up to just below the root.
    pub siblings: Vec<[u8; 32]>,
}

fn hash_pair(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Sha256::new();
    hasher.update(lo);
    hasher.update(hi);
    hasher.finalize().into()
}

fn next_level(level: &[[u8; 32]]) -> Vec<[u8; 32]> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [a, b] => hash_pair(a, b),
            // Odd node is promoted unchanged.
            [a] => *a,
            _ => unreachable!("chunks(2) yields one or two elements"),
        })
        .collect()
}

/// Compute the Merkle root of a set of leaves.
///
/// Returns `None` for an empty set. A single leaf is its own root.
pub fn merkle_root(leaves: &[[u8; 32]]) -> Option<[u8; 32]> {
    if leaves.is_empty() {
        return None;
    }
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = next_level(&level);
    }
    Some(level[0])
}

/// Build the membership proof for `leaves[index]`.
///
/// Returns `None` when `index` is out of bounds or the set is empty.
pub fn prove(leaves: &[[u8; 32]], index: usize) -> Option<MerkleProof> {
    if index >= leaves.len() {
        return None;
    }
    let leaf = leaves[index];
    let mut siblings = Vec::new();
    let mut level = leaves.to_vec();
    let mut idx = index;
    while level.len() > 1 {
        let sibling_idx = idx ^ 1;
        if sibling_idx < level.len() {
            siblings.push(level[sibling_idx]);
        }
        idx /= 2;
        level = next_level(&level);
    }
    Some(MerkleProof { leaf, siblings })
}

/// Verify a membership proof against a committed root.
pub fn verify_proof(root: &[u8; 32], proof: &MerkleProof) -> bool {
    let mut hash = proof.leaf;
    for sibling in &proof.siblings {
        hash = hash_pair(&hash, sibling);
    }
    hash == *root
}

struct CommittedAnchor {
    digest: ContentDigest,
    root: [u8; 32],
    proof: MerkleProof,
}

struct LedgerInner {
    pending: Vec<(String, ContentDigest)>,
    committed: HashMap<String, CommittedAnchor>,
}

/// Ledger that anchors fingerprints in Merkle-tree batches.
///
/// `anchor` queues the fingerprint and returns its reference right
/// away; the batch is committed once it reaches `batch_size` entries
/// (or on an explicit [`commit`](Self::commit)). Until the commit,
/// `confirm` reports the ledger as unavailable for that reference, so
/// callers keep the certificate in the pending-retry state.
pub struct MerkleBatchLedger {
    batch_size: usize,
    inner: RwLock<LedgerInner>,
    sequence: AtomicU64,
}

impl MerkleBatchLedger {
    /// Create a ledger that commits after `batch_size` submissions.
    ///
    /// The size is clamped to `1..=MAX_PROOF_BATCH`.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.clamp(1, MAX_PROOF_BATCH),
            inner: RwLock::new(LedgerInner {
                pending: Vec::new(),
                committed: HashMap::new(),
            }),
            sequence: AtomicU64::new(0),
        }
    }

    /// Commit all queued fingerprints now. No-op when the queue is empty.
    pub fn commit(&self) {
        let mut inner = self.inner.write();
        Self::commit_locked(&mut inner);
    }

    /// Number of fingerprints queued for the next commit.
    pub fn pending_len(&self) -> usize {
        self.inner.read().pending.len()
    }

    fn commit_locked(inner: &mut LedgerInner) {
        if inner.pending.is_empty() {
            return;
        }
        let leaves: Vec<[u8; 32]> = inner.pending.iter().map(|(_, d)| d.bytes).collect();
        let root = merkle_root(&leaves).unwrap_or([0u8; 32]);
        for (index, (reference, digest)) in inner.pending.drain(..).enumerate() {
            if let Some(proof) = prove(&leaves, index) {
                inner.committed.insert(
                    reference,
                    CommittedAnchor {
                        digest,
                        root,
                        proof,
                    },
                );
            }
        }
    }
}

impl AnchorLedger for MerkleBatchLedger {
    fn anchor(&self, digest: &ContentDigest) -> Result<AnchorRef, AnchorError> {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let reference = format!("merkle:{seq:016x}");
        let mut inner = self.inner.write();
        inner.pending.push((reference.clone(), digest.clone()));
        if inner.pending.len() >= self.batch_size {
            Self::commit_locked(&mut inner);
        }
        AnchorRef::new(reference).map_err(|e| AnchorError::Rejected {
            reason: e.to_string(),
        })
    }

    fn confirm(&self, anchor_ref: &AnchorRef, digest: &ContentDigest) -> Result<bool, AnchorError> {
        let inner = self.inner.read();
        if let Some(anchor) = inner.committed.get(anchor_ref.as_str()) {
            let matches = anchor.digest == *digest
                && anchor.proof.leaf == digest.bytes
                && verify_proof(&anchor.root, &anchor.proof);
            return Ok(matches);
        }
        if inner.pending.iter().any(|(r, _)| r == anchor_ref.as_str()) {
            return Err(AnchorError::Unavailable {
                reason: "fingerprint awaits batch commit".to_string(),
            });
        }
        Ok(false)
    }

    fn ledger_name(&self) -> &str {
        "MerkleBatchLedger"
    }
}
