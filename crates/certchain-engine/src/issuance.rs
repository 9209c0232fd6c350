//! The issuance pipeline and lifecycle mutations.
//!
//! Issuance runs validate → allocate → render → fingerprint → anchor →
//! persist. The certificate only becomes visible once every step has
//! succeeded; a terminal anchoring failure aborts with no record written,
//! while a transient one persists the record in the pending-retry state
//! for a later sweep.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use certchain_anchor::{AnchorError, AnchorLedger};
use certchain_core::{CertificateId, ContentDigest, SerialNumber, TemplateId, Timestamp, UserId};
use certchain_model::{
    AnchorState, Certificate, CertificateMetadata, CertificateStatus, DocumentBody, Template,
    User,
};
use certchain_render::render;

use crate::error::EngineError;
use crate::fingerprint::certificate_fingerprint;
use crate::store::{CertificateStore, StoreError, TemplateSource, UserDirectory};

/// When the issuance pipeline submits fingerprints to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorPolicy {
    /// Anchor every certificate.
    Always,
    /// Never anchor. Verification relies on fingerprint comparison only.
    Never,
    /// Anchor when the issuance request asks for it.
    OnDemand,
}

impl FromStr for AnchorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            "on_demand" | "on-demand" => Ok(Self::OnDemand),
            other => Err(format!(
                "unknown anchor policy {other:?}, expected always, never, or on_demand"
            )),
        }
    }
}

/// Everything the caller supplies to issue a certificate.
#[derive(Debug, Clone)]
pub struct IssueRequest {
    /// Certificate title.
    pub title: String,
    /// Certificate description.
    pub description: String,
    /// Issuing user.
    pub issuer_id: UserId,
    /// Recipient user.
    pub recipient_id: UserId,
    /// Template to render with.
    pub template_id: TemplateId,
    /// Issue date.
    pub issue_date: Timestamp,
    /// Optional expiry date. Must not precede the issue date; equal is
    /// allowed.
    pub expiry_date: Option<Timestamp>,
    /// Optional source image reference.
    pub image_url: Option<String>,
    /// Free-form metadata.
    pub metadata: CertificateMetadata,
    /// Request anchoring. Honored only under [`AnchorPolicy::OnDemand`].
    pub anchor: bool,
}

/// Outcome counts from one deferred-anchor sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrySummary {
    /// Certificates anchored by this sweep.
    pub anchored: usize,
    /// Certificates skipped because they were revoked after issuance.
    pub skipped_revoked: usize,
    /// Certificates still deferred (the ledger stayed unavailable).
    pub deferred: usize,
    /// Certificates whose resubmission the ledger refused outright.
    pub rejected: usize,
}

/// Drives issuance, revocation, and the deferred-anchor sweep.
pub struct IssuanceService {
    store: Arc<dyn CertificateStore>,
    templates: Arc<dyn TemplateSource>,
    users: Arc<dyn UserDirectory>,
    ledger: Arc<dyn AnchorLedger>,
    policy: AnchorPolicy,
}

impl IssuanceService {
    /// Create a service over the given seams.
    pub fn new(
        store: Arc<dyn CertificateStore>,
        templates: Arc<dyn TemplateSource>,
        users: Arc<dyn UserDirectory>,
        ledger: Arc<dyn AnchorLedger>,
        policy: AnchorPolicy,
    ) -> Self {
        Self {
            store,
            templates,
            users,
            ledger,
            policy,
        }
    }

    /// Issue a certificate.
    ///
    /// On an identifier or serial collision at persist time the pipeline
    /// runs once more with freshly allocated values; a second collision is
    /// surfaced as an error rather than looped on.
    pub fn issue(&self, request: IssueRequest) -> Result<Certificate, EngineError> {
        let issuer = self
            .users
            .get(&request.issuer_id)
            .ok_or(EngineError::IssuerNotFound(request.issuer_id))?;
        if !issuer.role.can_issue() {
            return Err(EngineError::NotAuthorized {
                user_id: issuer.id,
                role: issuer.role,
            });
        }
        if !issuer.is_active {
            return Err(EngineError::IssuerInactive(issuer.id));
        }
        let recipient = self
            .users
            .get(&request.recipient_id)
            .ok_or(EngineError::RecipientNotFound(request.recipient_id))?;
        if let Some(expiry) = request.expiry_date {
            if expiry < request.issue_date {
                return Err(EngineError::ExpiryBeforeIssue {
                    issue: request.issue_date,
                    expiry,
                });
            }
        }
        let template = self
            .templates
            .get(&request.template_id)
            .ok_or(EngineError::TemplateNotFound(request.template_id))?;

        let mut last_collision: Option<StoreError> = None;
        for _attempt in 0..2 {
            let certificate = self.build_certificate(&request, &issuer, &recipient, &template)?;
            match self.store.insert(certificate.clone()) {
                Ok(()) => {
                    tracing::info!(
                        certificate_id = %certificate.id,
                        serial_number = %certificate.serial_number,
                        issuer_id = %certificate.issuer_id,
                        "certificate issued"
                    );
                    return Ok(certificate);
                }
                Err(collision) => {
                    tracing::warn!(
                        certificate_id = %certificate.id,
                        error = %collision,
                        "identifier collision at persist, reallocating"
                    );
                    last_collision = Some(collision);
                }
            }
        }
        // Unreachable in practice: two consecutive 122-bit collisions.
        Err(EngineError::Store(last_collision.unwrap_or(
            StoreError::DuplicateKey {
                field: "id",
                value: String::new(),
            },
        )))
    }

    /// Run one full pipeline pass with freshly allocated identifiers.
    fn build_certificate(
        &self,
        request: &IssueRequest,
        issuer: &User,
        recipient: &User,
        template: &Template,
    ) -> Result<Certificate, EngineError> {
        let now = Timestamp::now();
        let mut certificate = Certificate {
            id: CertificateId::new(),
            title: request.title.clone(),
            description: request.description.clone(),
            issuer_id: issuer.id,
            issuer_name: issuer.full_name(),
            recipient_id: recipient.id,
            recipient_name: recipient.full_name(),
            recipient_email: recipient.email.clone(),
            image_url: request.image_url.clone(),
            issue_date: request.issue_date,
            expiry_date: request.expiry_date,
            serial_number: SerialNumber::generate(),
            status: CertificateStatus::Draft,
            anchor: AnchorState::Unanchored,
            metadata: request.metadata.clone(),
            template_id: template.id,
            document: DocumentBody {
                content: String::new(),
                styles: template.styles.clone(),
            },
            fingerprint: ContentDigest::sha256([0u8; 32]),
            created_at: now,
            updated_at: now,
        };

        // Render before fingerprinting: the fingerprint covers the rendered
        // document, and verification re-derives both the same way.
        certificate.document = render(&certificate, template)?;
        certificate.fingerprint = certificate_fingerprint(&certificate)?;

        let wants_anchor = match self.policy {
            AnchorPolicy::Always => true,
            AnchorPolicy::Never => false,
            AnchorPolicy::OnDemand => request.anchor,
        };
        if wants_anchor {
            match self.ledger.anchor(&certificate.fingerprint) {
                Ok(anchor_ref) => certificate.set_anchor(anchor_ref, now)?,
                Err(err @ AnchorError::Unavailable { .. }) => {
                    tracing::warn!(
                        certificate_id = %certificate.id,
                        error = %err,
                        "ledger unavailable, deferring anchor"
                    );
                    certificate.anchor = AnchorState::PendingRetry;
                }
                Err(AnchorError::Rejected { reason }) => {
                    return Err(EngineError::AnchorRejected { reason });
                }
            }
        }

        certificate.mark_issued(now)?;
        Ok(certificate)
    }

    /// Revoke a certificate. Irreversible; the reason, timestamp, and
    /// revoking user are recorded on the certificate.
    pub fn revoke(
        &self,
        id: &CertificateId,
        reason: String,
        revoked_by: &UserId,
    ) -> Result<Certificate, EngineError> {
        let revoker = self
            .users
            .get(revoked_by)
            .ok_or(EngineError::IssuerNotFound(*revoked_by))?;
        if !revoker.role.can_issue() {
            return Err(EngineError::NotAuthorized {
                user_id: revoker.id,
                role: revoker.role,
            });
        }

        let now = Timestamp::now();
        match self
            .store
            .try_update(id, &mut |c| c.revoke(reason.clone(), revoker.id, now))
        {
            None => Err(EngineError::CertificateNotFound),
            Some(Err(lifecycle)) => Err(EngineError::Lifecycle(lifecycle)),
            Some(Ok(certificate)) => {
                tracing::info!(
                    certificate_id = %certificate.id,
                    revoked_by = %revoker.id,
                    "certificate revoked"
                );
                Ok(certificate)
            }
        }
    }

    /// Re-submit every deferred anchor.
    ///
    /// Revoked certificates are skipped rather than anchored: revocation
    /// wins over a pending anchor, and a revoked record stays unanchored
    /// permanently. The ledger call happens outside the store lock; the
    /// state is re-checked under the lock before the anchor is recorded, so
    /// a revocation racing the sweep is never overwritten.
    pub fn retry_deferred_anchors(&self) -> RetrySummary {
        let mut summary = RetrySummary::default();
        for id in self.store.pending_retry_ids() {
            let Some(certificate) = self.store.get(&id) else {
                continue;
            };
            if !certificate.anchor.is_pending_retry() {
                continue;
            }
            if matches!(certificate.status, CertificateStatus::Revoked { .. }) {
                summary.skipped_revoked += 1;
                continue;
            }
            match self.ledger.anchor(&certificate.fingerprint) {
                Ok(anchor_ref) => {
                    let now = Timestamp::now();
                    let outcome = self.store.try_update(&id, &mut |c| {
                        if matches!(c.status, CertificateStatus::Revoked { .. })
                            || !c.anchor.is_pending_retry()
                        {
                            // Raced by a revocation or another sweep; leave
                            // the record as it is.
                            return Ok(());
                        }
                        c.set_anchor(anchor_ref.clone(), now)
                    });
                    match outcome {
                        Some(Ok(updated)) if updated.anchor.anchor_ref().is_some() => {
                            tracing::info!(certificate_id = %id, "deferred anchor recorded");
                            summary.anchored += 1;
                        }
                        _ => summary.skipped_revoked += 1,
                    }
                }
                Err(err) if err.is_retryable() => {
                    tracing::warn!(
                        certificate_id = %id,
                        error = %err,
                        "ledger still unavailable, anchor remains deferred"
                    );
                    summary.deferred += 1;
                }
                Err(err) => {
                    tracing::warn!(
                        certificate_id = %id,
                        error = %err,
                        "ledger rejected deferred anchor"
                    );
                    summary.rejected += 1;
                }
            }
        }
        summary
    }
}
