//! Blockchain anchor adapter for the CertChain engine.
//!
//! The issuance and verification services talk to an external ledger
//! through the object-safe [`AnchorLedger`] trait. Two reference
//! implementations ship with the crate: [`InMemoryLedger`], which
//! records anchors directly, and [`MerkleBatchLedger`], which batches
//! fingerprints into a Merkle tree and confirms membership with
//! SHA-256 proofs.

#![deny(missing_docs)]

mod ledger;
mod merkle;

pub use ledger::{AnchorError, AnchorLedger, InMemoryLedger, OfflineLedger, RejectingLedger};
pub use merkle::{merkle_root, prove, verify_proof, MerkleBatchLedger, MerkleProof, MAX_PROOF_BATCH};
