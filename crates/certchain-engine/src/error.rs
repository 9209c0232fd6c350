//! Service-layer error taxonomy.
//!
//! Every failure mode of the issuance and verification pipelines is a
//! distinct variant, so the API layer can map each to the right HTTP
//! status without string matching.

use thiserror::Error;

use certchain_core::{CanonicalizationError, TemplateId, Timestamp, UserId};
use certchain_model::{LifecycleError, Role};
use certchain_render::RenderError;

use crate::store::StoreError;
use crate::verification::MAX_BATCH_SIZE;

/// Errors from the issuance and verification services.
#[derive(Error, Debug)]
pub enum EngineError {
    /// No certificate matches the given locator.
    #[error("certificate not found")]
    CertificateNotFound,

    /// The referenced template is not registered.
    #[error("template {0} not found")]
    TemplateNotFound(TemplateId),

    /// The issuing user is not known to the identity service.
    #[error("issuer {0} not found")]
    IssuerNotFound(UserId),

    /// The recipient is not known to the identity service.
    #[error("recipient {0} not found")]
    RecipientNotFound(UserId),

    /// The user's role does not permit issuing or revoking certificates.
    #[error("user {user_id} with role {role} may not issue or revoke certificates")]
    NotAuthorized {
        /// The acting user.
        user_id: UserId,
        /// The user's role.
        role: Role,
    },

    /// The issuing user's account is deactivated.
    #[error("issuer {0} is deactivated")]
    IssuerInactive(UserId),

    /// The expiry date precedes the issue date. Equal dates are valid
    /// (a certificate may expire the day it is issued).
    #[error("expiry date {expiry} precedes issue date {issue}")]
    ExpiryBeforeIssue {
        /// The requested issue date.
        issue: Timestamp,
        /// The requested expiry date.
        expiry: Timestamp,
    },

    /// Template rendering failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Certificate content could not be canonicalized for fingerprinting.
    #[error(transparent)]
    Canonicalization(#[from] CanonicalizationError),

    /// An invalid lifecycle transition was attempted.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// The ledger refused the anchor submission. Issuance aborts and no
    /// certificate record is written.
    #[error("ledger rejected anchor submission: {reason}")]
    AnchorRejected {
        /// Why the ledger refused.
        reason: String,
    },

    /// Identifier or serial collision persisted after a retry with fresh
    /// values. Practically unreachable with 122-bit identifiers; surfaced
    /// rather than looping.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A batch verification request exceeded the batch cap.
    #[error("batch of {0} exceeds the maximum of {max}", max = MAX_BATCH_SIZE)]
    BatchTooLarge(usize),
}
