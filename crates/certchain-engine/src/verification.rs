//! The verification pipeline and batch verification.
//!
//! Verification re-derives everything from the stored record: the document
//! is re-rendered from the certificate's own content fields against its
//! pinned template, the fingerprint is recomputed over the stored document,
//! and both are compared against what issuance persisted. A mismatch in
//! either direction reports failed content integrity.
//!
//! Anchor confirmation is reported independently of content integrity, and
//! a ledger outage degrades it to `Unknown` rather than failing the whole
//! verification.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use certchain_anchor::{AnchorError, AnchorLedger};
use certchain_core::{CertificateId, SerialNumber, Timestamp};
use certchain_model::{AnchorState, Certificate, EffectiveStatus};
use certchain_render::render;

use crate::error::EngineError;
use crate::fingerprint::certificate_fingerprint;
use crate::store::{CertificateStore, TemplateSource};

/// Maximum number of certificates in one batch verification request.
pub const MAX_BATCH_SIZE: usize = 50;

/// Fixed cost charged per batch request.
pub const BATCH_BASE_COST: u32 = 10;

/// Cost charged per certificate in a batch request.
pub const BATCH_ITEM_COST: u32 = 5;

/// How a certificate is looked up for verification.
#[derive(Debug, Clone)]
pub enum Locator {
    /// By certificate id.
    Id(CertificateId),
    /// By serial number.
    Serial(SerialNumber),
}

/// Outcome of the anchor confirmation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorConfirmation {
    /// The ledger confirmed that the anchor reference commits to the
    /// certificate's stored fingerprint.
    Confirmed,
    /// The ledger answered, and the commitment does not match, or the
    /// ledger refused the reference outright.
    Mismatch,
    /// No confirmation was possible: the certificate is unanchored, its
    /// anchor is still deferred, or the ledger was unavailable.
    Unknown,
}

/// The full verification verdict for one certificate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    /// The verified certificate.
    pub certificate_id: CertificateId,
    /// Its serial number.
    pub serial_number: SerialNumber,
    /// Whether the stored content matches what was fingerprinted at
    /// issuance.
    pub content_integrity: bool,
    /// Anchor confirmation outcome.
    pub anchor_confirmation: AnchorConfirmation,
    /// Effective lifecycle status at verification time.
    pub status: EffectiveStatus,
    /// When the verification ran.
    pub checked_at: Timestamp,
}

/// One entry of a batch verification report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchVerificationItem {
    /// The serial number the caller submitted.
    pub serial_number: SerialNumber,
    /// The verdict, when the certificate was found and verifiable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<VerificationResult>,
    /// Why verification could not run, otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate report for a batch verification request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchVerificationReport {
    /// Per-certificate outcomes, in request order.
    pub items: Vec<BatchVerificationItem>,
    /// Number of certificates submitted.
    pub total: usize,
    /// Certificates with intact content and an issued effective status.
    pub successful: usize,
    /// Certificates that failed integrity, are revoked or expired, or
    /// could not be verified at all.
    pub failed: usize,
    /// Cost units charged for this request.
    pub total_cost: u32,
}

/// Verifies certificates against their stored content, pinned template,
/// and anchoring ledger.
pub struct VerificationService {
    store: Arc<dyn CertificateStore>,
    templates: Arc<dyn TemplateSource>,
    ledger: Arc<dyn AnchorLedger>,
}

impl VerificationService {
    /// Create a service over the given seams.
    pub fn new(
        store: Arc<dyn CertificateStore>,
        templates: Arc<dyn TemplateSource>,
        ledger: Arc<dyn AnchorLedger>,
    ) -> Self {
        Self {
            store,
            templates,
            ledger,
        }
    }

    /// Verify one certificate.
    pub fn verify(&self, locator: &Locator) -> Result<VerificationResult, EngineError> {
        let certificate = match locator {
            Locator::Id(id) => self.store.get(id),
            Locator::Serial(serial) => self.store.get_by_serial(serial),
        }
        .ok_or(EngineError::CertificateNotFound)?;

        let now = Timestamp::now();
        let content_integrity = self.check_integrity(&certificate)?;
        let anchor_confirmation = self.check_anchor(&certificate);

        Ok(VerificationResult {
            certificate_id: certificate.id,
            serial_number: certificate.serial_number.clone(),
            content_integrity,
            anchor_confirmation,
            status: certificate.effective_status(now),
            checked_at: now,
        })
    }

    /// Verify up to [`MAX_BATCH_SIZE`] certificates by serial number.
    ///
    /// A certificate that cannot be found or verified fails its own entry
    /// without failing the batch. An item counts as successful only when
    /// its content is intact and its effective status is `Issued` — a
    /// revoked or expired certificate fails even with intact content.
    ///
    /// The cost model is flat-plus-linear,
    /// `BATCH_BASE_COST + BATCH_ITEM_COST * n`; an empty batch costs
    /// nothing.
    pub fn verify_batch(
        &self,
        serials: &[SerialNumber],
    ) -> Result<BatchVerificationReport, EngineError> {
        if serials.len() > MAX_BATCH_SIZE {
            return Err(EngineError::BatchTooLarge(serials.len()));
        }
        if serials.is_empty() {
            return Ok(BatchVerificationReport {
                items: Vec::new(),
                total: 0,
                successful: 0,
                failed: 0,
                total_cost: 0,
            });
        }

        let mut items = Vec::with_capacity(serials.len());
        let mut successful = 0usize;
        for serial in serials {
            match self.verify(&Locator::Serial(serial.clone())) {
                Ok(result) => {
                    if result.content_integrity && result.status == EffectiveStatus::Issued {
                        successful += 1;
                    }
                    items.push(BatchVerificationItem {
                        serial_number: serial.clone(),
                        result: Some(result),
                        error: None,
                    });
                }
                Err(err) => items.push(BatchVerificationItem {
                    serial_number: serial.clone(),
                    result: None,
                    error: Some(err.to_string()),
                }),
            }
        }

        let total = serials.len();
        Ok(BatchVerificationReport {
            items,
            total,
            successful,
            failed: total - successful,
            total_cost: BATCH_BASE_COST + BATCH_ITEM_COST * total as u32,
        })
    }

    /// Re-render and re-fingerprint the certificate and compare both
    /// against what issuance persisted. A re-render failure (the pinned
    /// template no longer resolves against the stored content) reports
    /// failed integrity rather than an error.
    fn check_integrity(&self, certificate: &Certificate) -> Result<bool, EngineError> {
        let template = self
            .templates
            .get(&certificate.template_id)
            .ok_or(EngineError::TemplateNotFound(certificate.template_id))?;

        let rerendered = match render(certificate, &template) {
            Ok(document) => document,
            Err(_) => return Ok(false),
        };
        if rerendered != certificate.document {
            return Ok(false);
        }

        let recomputed = certificate_fingerprint(certificate)?;
        Ok(recomputed == certificate.fingerprint)
    }

    fn check_anchor(&self, certificate: &Certificate) -> AnchorConfirmation {
        match &certificate.anchor {
            AnchorState::Unanchored | AnchorState::PendingRetry => AnchorConfirmation::Unknown,
            AnchorState::Anchored { anchor_ref, .. } => {
                match self.ledger.confirm(anchor_ref, &certificate.fingerprint) {
                    Ok(true) => AnchorConfirmation::Confirmed,
                    Ok(false) => AnchorConfirmation::Mismatch,
                    // A refusal is an answer: the ledger will not stand
                    // behind this reference.
                    Err(err @ AnchorError::Rejected { .. }) => {
                        tracing::warn!(
                            certificate_id = %certificate.id,
                            error = %err,
                            "ledger refused anchor confirmation"
                        );
                        AnchorConfirmation::Mismatch
                    }
                    Err(err @ AnchorError::Unavailable { .. }) => {
                        tracing::warn!(
                            certificate_id = %certificate.id,
                            error = %err,
                            "anchor confirmation unavailable"
                        );
                        AnchorConfirmation::Unknown
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certchain_anchor::{InMemoryLedger, OfflineLedger};
    use certchain_core::{AnchorRef, ContentDigest, TemplateId, UserId};
    use certchain_model::{CertificateMetadata, Role, StyleSheet, Template, User};
    use chrono::{Duration, Utc};

    use crate::issuance::{AnchorPolicy, IssuanceService, IssueRequest};
    use crate::store::{InMemoryDirectory, InMemoryStore, InMemoryTemplates, UserDirectory};

    /// Ledger that refuses to confirm any reference.
    struct RefusingLedger;

    impl AnchorLedger for RefusingLedger {
        fn anchor(&self, _digest: &ContentDigest) -> Result<AnchorRef, AnchorError> {
            Err(AnchorError::Rejected {
                reason: "submissions disabled".to_string(),
            })
        }

        fn confirm(
            &self,
            _anchor_ref: &AnchorRef,
            _digest: &ContentDigest,
        ) -> Result<bool, AnchorError> {
            Err(AnchorError::Rejected {
                reason: "reference refused".to_string(),
            })
        }

        fn ledger_name(&self) -> &str {
            "RefusingLedger"
        }
    }

    struct Fixture {
        store: Arc<InMemoryStore>,
        templates: Arc<InMemoryTemplates>,
        users: Arc<InMemoryDirectory>,
        issuer: User,
        recipient: User,
        template: Template,
        ledger: Arc<InMemoryLedger>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let templates = Arc::new(InMemoryTemplates::new());
        let users = Arc::new(InMemoryDirectory::new());
        let ledger = Arc::new(InMemoryLedger::new());

        let issuer = User {
            id: UserId::new(),
            email: "issuer@example.org".to_string(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            role: Role::Issuer,
            is_active: true,
            created_at: Timestamp::now(),
        };
        let recipient = User {
            id: UserId::new(),
            email: "ada@example.org".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            role: Role::Holder,
            is_active: true,
            created_at: Timestamp::now(),
        };
        users.register(issuer.clone());
        users.register(recipient.clone());

        let template = Template {
            id: TemplateId::new(),
            name: "Classic".to_string(),
            description: "Standard layout".to_string(),
            markup: "<h1>{{title}}</h1><p>{{recipientName}}</p><small>{{serialNumber}}</small>"
                .to_string(),
            styles: StyleSheet::default(),
            placeholders: vec![
                "title".to_string(),
                "recipientName".to_string(),
                "serialNumber".to_string(),
            ],
            is_default: true,
            created_by: issuer.id,
            created_at: Timestamp::now(),
        };
        templates.register(template.clone());

        Fixture {
            store,
            templates,
            users,
            issuer,
            recipient,
            template,
            ledger,
        }
    }

    fn issuance(f: &Fixture, policy: AnchorPolicy) -> IssuanceService {
        IssuanceService::new(
            f.store.clone(),
            f.templates.clone(),
            f.users.clone(),
            f.ledger.clone(),
            policy,
        )
    }

    fn verification(f: &Fixture) -> VerificationService {
        VerificationService::new(f.store.clone(), f.templates.clone(), f.ledger.clone())
    }

    fn issue_one(f: &Fixture, policy: AnchorPolicy) -> certchain_model::Certificate {
        issuance(f, policy)
            .issue(IssueRequest {
                title: "Rust Fundamentals".to_string(),
                description: "Completed the Rust fundamentals course".to_string(),
                issuer_id: f.issuer.id,
                recipient_id: f.recipient.id,
                template_id: f.template.id,
                issue_date: Timestamp::now(),
                expiry_date: None,
                image_url: None,
                metadata: CertificateMetadata::default(),
                anchor: false,
            })
            .unwrap()
    }

    #[test]
    fn anchored_certificate_verifies_confirmed() {
        let f = fixture();
        let cert = issue_one(&f, AnchorPolicy::Always);

        let result = verification(&f).verify(&Locator::Id(cert.id)).unwrap();
        assert!(result.content_integrity);
        assert_eq!(result.anchor_confirmation, AnchorConfirmation::Confirmed);
        assert_eq!(result.status, EffectiveStatus::Issued);
    }

    #[test]
    fn verify_by_serial_matches_verify_by_id() {
        let f = fixture();
        let cert = issue_one(&f, AnchorPolicy::Always);
        let svc = verification(&f);

        let by_id = svc.verify(&Locator::Id(cert.id)).unwrap();
        let by_serial = svc
            .verify(&Locator::Serial(cert.serial_number.clone()))
            .unwrap();
        assert_eq!(by_id.certificate_id, by_serial.certificate_id);
        assert_eq!(by_id.content_integrity, by_serial.content_integrity);
    }

    #[test]
    fn unanchored_certificate_verifies_with_unknown_anchor() {
        let f = fixture();
        let cert = issue_one(&f, AnchorPolicy::Never);

        let result = verification(&f).verify(&Locator::Id(cert.id)).unwrap();
        assert!(result.content_integrity);
        assert_eq!(result.anchor_confirmation, AnchorConfirmation::Unknown);
    }

    #[test]
    fn ledger_outage_degrades_anchor_to_unknown() {
        let f = fixture();
        let cert = issue_one(&f, AnchorPolicy::Always);

        let svc =
            VerificationService::new(f.store.clone(), f.templates.clone(), Arc::new(OfflineLedger));
        let result = svc.verify(&Locator::Id(cert.id)).unwrap();
        assert!(result.content_integrity);
        assert_eq!(result.anchor_confirmation, AnchorConfirmation::Unknown);
    }

    #[test]
    fn ledger_refusal_reports_anchor_mismatch() {
        let f = fixture();
        let cert = issue_one(&f, AnchorPolicy::Always);

        // A refusal is a negative answer, not an outage.
        let svc = VerificationService::new(
            f.store.clone(),
            f.templates.clone(),
            Arc::new(RefusingLedger),
        );
        let result = svc.verify(&Locator::Id(cert.id)).unwrap();
        assert!(result.content_integrity);
        assert_eq!(result.anchor_confirmation, AnchorConfirmation::Mismatch);
    }

    #[test]
    fn expired_certificate_verifies_expired_with_intact_content() {
        let f = fixture();
        let cert = issuance(&f, AnchorPolicy::Always)
            .issue(IssueRequest {
                title: "Rust Fundamentals".to_string(),
                description: "Completed the Rust fundamentals course".to_string(),
                issuer_id: f.issuer.id,
                recipient_id: f.recipient.id,
                template_id: f.template.id,
                issue_date: Timestamp::from_datetime(Utc::now() - Duration::days(30)),
                expiry_date: Some(Timestamp::from_datetime(Utc::now() - Duration::days(1))),
                image_url: None,
                metadata: CertificateMetadata::default(),
                anchor: false,
            })
            .unwrap();

        let result = verification(&f).verify(&Locator::Id(cert.id)).unwrap();
        assert!(result.content_integrity);
        assert_eq!(result.status, EffectiveStatus::Expired);
    }

    #[test]
    fn tampered_document_fails_integrity() {
        let f = fixture();
        let cert = issue_one(&f, AnchorPolicy::Always);

        f.store
            .try_update(&cert.id, &mut |c| {
                c.document.content = c.document.content.replace("Ada", "Eve");
                Ok(())
            })
            .unwrap()
            .unwrap();

        let result = verification(&f).verify(&Locator::Id(cert.id)).unwrap();
        assert!(!result.content_integrity);
        // The stored fingerprint is unchanged, so the anchor still confirms.
        assert_eq!(result.anchor_confirmation, AnchorConfirmation::Confirmed);
    }

    #[test]
    fn tampered_content_field_fails_integrity() {
        let f = fixture();
        let cert = issue_one(&f, AnchorPolicy::Never);

        f.store
            .try_update(&cert.id, &mut |c| {
                c.title = "Forged Title".to_string();
                Ok(())
            })
            .unwrap()
            .unwrap();

        let result = verification(&f).verify(&Locator::Id(cert.id)).unwrap();
        assert!(!result.content_integrity);
    }

    #[test]
    fn revocation_leaves_integrity_intact() {
        let f = fixture();
        let cert = issue_one(&f, AnchorPolicy::Always);
        issuance(&f, AnchorPolicy::Always)
            .revoke(&cert.id, "withdrawn".to_string(), &f.issuer.id)
            .unwrap();

        let result = verification(&f).verify(&Locator::Id(cert.id)).unwrap();
        assert!(result.content_integrity);
        assert_eq!(result.anchor_confirmation, AnchorConfirmation::Confirmed);
        assert_eq!(result.status, EffectiveStatus::Revoked);
    }

    #[test]
    fn unknown_locator_is_not_found() {
        let f = fixture();
        let err = verification(&f)
            .verify(&Locator::Id(CertificateId::new()))
            .unwrap_err();
        assert!(matches!(err, EngineError::CertificateNotFound));
    }

    #[test]
    fn batch_reports_per_item_and_totals() {
        let f = fixture();
        let good = issue_one(&f, AnchorPolicy::Always);
        let tampered = issue_one(&f, AnchorPolicy::Always);
        f.store
            .try_update(&tampered.id, &mut |c| {
                c.title = "Forged".to_string();
                Ok(())
            })
            .unwrap()
            .unwrap();
        let missing = SerialNumber::generate();

        let report = verification(&f)
            .verify_batch(&[
                good.serial_number.clone(),
                tampered.serial_number.clone(),
                missing.clone(),
            ])
            .unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.successful, 1);
        assert_eq!(report.failed, 2);
        assert_eq!(report.total_cost, BATCH_BASE_COST + 3 * BATCH_ITEM_COST);

        assert!(report.items[0].result.as_ref().unwrap().content_integrity);
        assert!(!report.items[1].result.as_ref().unwrap().content_integrity);
        assert!(report.items[2].result.is_none());
        assert!(report.items[2].error.is_some());
    }

    #[test]
    fn batch_counts_revoked_certificate_as_failed() {
        let f = fixture();
        let cert = issue_one(&f, AnchorPolicy::Always);
        issuance(&f, AnchorPolicy::Always)
            .revoke(&cert.id, "withdrawn".to_string(), &f.issuer.id)
            .unwrap();

        let report = verification(&f)
            .verify_batch(&[cert.serial_number.clone()])
            .unwrap();

        // Content is intact, but a revoked certificate is not a success.
        assert_eq!(report.successful, 0);
        assert_eq!(report.failed, 1);
        let item = report.items[0].result.as_ref().unwrap();
        assert!(item.content_integrity);
        assert_eq!(item.status, EffectiveStatus::Revoked);
    }

    #[test]
    fn empty_batch_is_free() {
        let f = fixture();
        let report = verification(&f).verify_batch(&[]).unwrap();
        assert_eq!(report.total, 0);
        assert!(report.items.is_empty());
        assert_eq!(report.total_cost, 0);
    }

    #[test]
    fn oversized_batch_is_rejected() {
        let f = fixture();
        let serials: Vec<SerialNumber> =
            (0..MAX_BATCH_SIZE + 1).map(|_| SerialNumber::generate()).collect();
        let err = verification(&f).verify_batch(&serials).unwrap_err();
        assert!(matches!(err, EngineError::BatchTooLarge(51)));
    }

    #[test]
    fn batch_at_exact_cap_is_accepted() {
        let f = fixture();
        let serials: Vec<SerialNumber> =
            (0..MAX_BATCH_SIZE).map(|_| SerialNumber::generate()).collect();
        let report = verification(&f).verify_batch(&serials).unwrap();
        assert_eq!(report.total, MAX_BATCH_SIZE);
        assert_eq!(
            report.total_cost,
            BATCH_BASE_COST + MAX_BATCH_SIZE as u32 * BATCH_ITEM_COST
        );
    }
}
