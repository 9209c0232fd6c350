//! # certchain-engine — Issuance & Verification Services
//!
//! The service layer of the CertChain engine. [`IssuanceService`] drives the
//! issuance pipeline (validate, render, fingerprint, anchor, persist) and the
//! lifecycle mutations (revocation, deferred anchor retry);
//! [`VerificationService`] re-derives a certificate's fingerprint from its
//! stored content and reports integrity, anchor confirmation, and effective
//! status.
//!
//! External systems are reached through three object-safe seams:
//! [`CertificateStore`] (persistence), [`TemplateSource`] (template
//! registry), and [`UserDirectory`] (identity service). In-memory
//! implementations back development deployments and the test suites.

#![deny(missing_docs)]

mod error;
mod fingerprint;
mod issuance;
mod store;
mod verification;

pub use error::EngineError;
pub use fingerprint::certificate_fingerprint;
pub use issuance::{AnchorPolicy, IssuanceService, IssueRequest, RetrySummary};
pub use store::{
    CertificateStore, InMemoryDirectory, InMemoryStore, InMemoryTemplates, StoreError,
    TemplateSource, UserDirectory,
};
pub use verification::{
    AnchorConfirmation, BatchVerificationItem, BatchVerificationReport, Locator,
    VerificationResult, VerificationService, BATCH_BASE_COST, BATCH_ITEM_COST, MAX_BATCH_SIZE,
};
