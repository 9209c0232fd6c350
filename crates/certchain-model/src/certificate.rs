//! # Certificate Record & Lifecycle
//!
//! The central entity: an immutable content record plus a small, closed
//! lifecycle. Content fields are set exactly once at issuance — there are no
//! mutators for them, and corrections require issuing a superseding
//! certificate. The only mutations the record supports are the lifecycle
//! transitions defined here:
//!
//! ```text
//! Draft → Issued → Revoked
//! ```
//!
//! `Expired` is a derived, view-time overlay computed by
//! [`Certificate::effective_status`] — it is never written back, so a
//! background expiry job and concurrent reads cannot race.
//!
//! The anchor field is an explicit state enum rather than a nullable hash:
//! `Unanchored` (anchoring was never requested), `PendingRetry` (the ledger
//! was unavailable at issuance; a background retry is owed), or `Anchored`
//! (set at most once, immutable thereafter — re-anchoring requires a new
//! certificate).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use certchain_core::{
    AnchorRef, CertificateId, ContentDigest, SerialNumber, TemplateId, Timestamp, UserId,
};

use crate::document::DocumentBody;

/// Errors from certificate lifecycle transitions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LifecycleError {
    /// The attempted transition is not valid from the current status.
    #[error("invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        /// Current status name.
        from: String,
        /// Attempted target status name.
        to: String,
        /// Why the transition was rejected.
        reason: String,
    },

    /// Revocation is irreversible; a revoked certificate cannot be revoked again.
    #[error("certificate is already revoked")]
    AlreadyRevoked,

    /// The anchor reference is set at most once and is immutable thereafter.
    #[error("anchor reference is already set to {existing}")]
    AnchorAlreadySet {
        /// The anchor reference already on the record.
        existing: AnchorRef,
    },
}

/// Stored lifecycle status. Revocation data lives inside the variant, so a
/// revoked certificate without a reason is unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum CertificateStatus {
    /// Created but not yet issued. Draft records are never persisted by the
    /// issuance service; the variant exists so the `Draft → Issued`
    /// transition is explicit rather than implied.
    Draft,
    /// Issued and live.
    Issued,
    /// Revoked by the issuer. Irreversible.
    Revoked {
        /// Why the certificate was revoked.
        reason: String,
        /// When it was revoked.
        revoked_at: Timestamp,
        /// Who revoked it.
        revoked_by: UserId,
    },
}

impl CertificateStatus {
    fn name(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Issued => "issued",
            Self::Revoked { .. } => "revoked",
        }
    }
}

/// Effective status presented to callers: the stored status with the
/// time-based expiry overlay applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveStatus {
    /// Not yet issued.
    Draft,
    /// Issued and within its validity window.
    Issued,
    /// Revoked by the issuer.
    Revoked,
    /// Past its expiry date. Derived at read time; the stored status
    /// remains `Issued`.
    Expired,
}

impl std::fmt::Display for EffectiveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Issued => write!(f, "issued"),
            Self::Revoked => write!(f, "revoked"),
            Self::Expired => write!(f, "expired"),
        }
    }
}

/// Anchor state of a certificate — explicit, never inferred from nullability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum AnchorState {
    /// Anchoring was not requested for this certificate. Verification falls
    /// back to fingerprint comparison against the persisted record only.
    Unanchored,
    /// Anchoring was requested but the ledger was unavailable at issuance.
    /// A background retry is owed.
    PendingRetry,
    /// Anchored. The reference is immutable once set.
    Anchored {
        /// Opaque ledger transaction reference.
        anchor_ref: AnchorRef,
        /// When the anchor write was accepted.
        anchored_at: Timestamp,
    },
}

impl AnchorState {
    /// Whether a deferred anchor retry is owed.
    pub fn is_pending_retry(&self) -> bool {
        matches!(self, Self::PendingRetry)
    }

    /// The anchor reference, when anchored.
    pub fn anchor_ref(&self) -> Option<&AnchorRef> {
        match self {
            Self::Anchored { anchor_ref, .. } => Some(anchor_ref),
            _ => None,
        }
    }
}

/// Free-form certificate metadata (grade, course name, and anything else the
/// issuer attaches).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateMetadata {
    /// Grade awarded, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    /// Course name, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
    /// Additional issuer-supplied fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// The central certificate record.
///
/// Issuer and recipient display fields (names, contact email) are
/// denormalized into the record at issuance: they are part of the immutable
/// content, and verification re-renders from the certificate's own stored
/// data without consulting the identity service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    /// Unique identifier, assigned at creation, never reassigned.
    pub id: CertificateId,
    /// Certificate title.
    pub title: String,
    /// Certificate description.
    pub description: String,
    /// Issuing user id.
    pub issuer_id: UserId,
    /// Issuer display name at issuance time.
    pub issuer_name: String,
    /// Recipient user id.
    pub recipient_id: UserId,
    /// Recipient display name at issuance time.
    pub recipient_name: String,
    /// Recipient contact email at issuance time.
    pub recipient_email: String,
    /// Source image reference, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Issue date.
    pub issue_date: Timestamp,
    /// Expiry date; `None` means non-expiring. When present, always
    /// `>= issue_date` (enforced by the issuance service).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<Timestamp>,
    /// Unique, human-verifiable serial number.
    pub serial_number: SerialNumber,
    /// Stored lifecycle status.
    #[serde(flatten)]
    pub status: CertificateStatus,
    /// Anchor state.
    pub anchor: AnchorState,
    /// Free-form metadata.
    #[serde(default)]
    pub metadata: CertificateMetadata,
    /// Template the certificate was rendered from.
    pub template_id: TemplateId,
    /// Rendered document body, exposed unmodified to downstream export.
    pub document: DocumentBody,
    /// Content fingerprint stored at issuance.
    pub fingerprint: ContentDigest,
    /// Record creation time.
    pub created_at: Timestamp,
    /// Last lifecycle mutation time.
    pub updated_at: Timestamp,
}

impl Certificate {
    /// Transition `Draft → Issued`.
    pub fn mark_issued(&mut self, now: Timestamp) -> Result<(), LifecycleError> {
        match self.status {
            CertificateStatus::Draft => {
                self.status = CertificateStatus::Issued;
                self.updated_at = now;
                Ok(())
            }
            ref other => Err(LifecycleError::InvalidTransition {
                from: other.name().to_string(),
                to: "issued".to_string(),
                reason: "only draft certificates can be issued".to_string(),
            }),
        }
    }

    /// Transition `Issued → Revoked`, appending reason, timestamp, and the
    /// revoking user. Irreversible.
    pub fn revoke(
        &mut self,
        reason: String,
        revoked_by: UserId,
        now: Timestamp,
    ) -> Result<(), LifecycleError> {
        match self.status {
            CertificateStatus::Issued => {
                self.status = CertificateStatus::Revoked {
                    reason,
                    revoked_at: now,
                    revoked_by,
                };
                self.updated_at = now;
                Ok(())
            }
            CertificateStatus::Revoked { .. } => Err(LifecycleError::AlreadyRevoked),
            CertificateStatus::Draft => Err(LifecycleError::InvalidTransition {
                from: "draft".to_string(),
                to: "revoked".to_string(),
                reason: "draft certificates cannot be revoked".to_string(),
            }),
        }
    }

    /// Record the anchor reference. Set at most once: valid only from
    /// `Unanchored` or `PendingRetry`.
    pub fn set_anchor(
        &mut self,
        anchor_ref: AnchorRef,
        now: Timestamp,
    ) -> Result<(), LifecycleError> {
        match &self.anchor {
            AnchorState::Anchored {
                anchor_ref: existing,
                ..
            } => Err(LifecycleError::AnchorAlreadySet {
                existing: existing.clone(),
            }),
            _ => {
                self.anchor = AnchorState::Anchored {
                    anchor_ref,
                    anchored_at: now,
                };
                self.updated_at = now;
                Ok(())
            }
        }
    }

    /// Effective status at `now`: the stored status with the expiry overlay.
    /// Revocation takes precedence over expiry.
    pub fn effective_status(&self, now: Timestamp) -> EffectiveStatus {
        match &self.status {
            CertificateStatus::Draft => EffectiveStatus::Draft,
            CertificateStatus::Revoked { .. } => EffectiveStatus::Revoked,
            CertificateStatus::Issued => match self.expiry_date {
                Some(expiry) if now > expiry => EffectiveStatus::Expired,
                _ => EffectiveStatus::Issued,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::StyleSheet;
    use chrono::{Duration, Utc};

    fn make_certificate() -> Certificate {
        let now = Timestamp::now();
        Certificate {
            id: CertificateId::new(),
            title: "Rust Fundamentals".to_string(),
            description: "Completed the Rust fundamentals course".to_string(),
            issuer_id: UserId::new(),
            issuer_name: "Systems Academy".to_string(),
            recipient_id: UserId::new(),
            recipient_name: "Ada Lovelace".to_string(),
            recipient_email: "ada@example.org".to_string(),
            image_url: None,
            issue_date: now,
            expiry_date: None,
            serial_number: SerialNumber::generate(),
            status: CertificateStatus::Draft,
            anchor: AnchorState::Unanchored,
            metadata: CertificateMetadata::default(),
            template_id: TemplateId::new(),
            document: DocumentBody {
                content: "<h1>Rust Fundamentals</h1>".to_string(),
                styles: StyleSheet::default(),
            },
            fingerprint: ContentDigest::sha256([0u8; 32]),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn draft_to_issued_succeeds() {
        let mut cert = make_certificate();
        cert.mark_issued(Timestamp::now()).unwrap();
        assert_eq!(cert.status, CertificateStatus::Issued);
    }

    #[test]
    fn issuing_twice_fails() {
        let mut cert = make_certificate();
        cert.mark_issued(Timestamp::now()).unwrap();
        let err = cert.mark_issued(Timestamp::now()).unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
    }

    #[test]
    fn revoke_records_reason_and_revoker() {
        let mut cert = make_certificate();
        cert.mark_issued(Timestamp::now()).unwrap();
        let admin = UserId::new();
        cert.revoke("issued in error".to_string(), admin, Timestamp::now())
            .unwrap();
        match &cert.status {
            CertificateStatus::Revoked {
                reason, revoked_by, ..
            } => {
                assert_eq!(reason, "issued in error");
                assert_eq!(*revoked_by, admin);
            }
            other => panic!("expected revoked, got {other:?}"),
        }
    }

    #[test]
    fn revoking_twice_fails() {
        let mut cert = make_certificate();
        cert.mark_issued(Timestamp::now()).unwrap();
        cert.revoke("first".to_string(), UserId::new(), Timestamp::now())
            .unwrap();
        let err = cert
            .revoke("second".to_string(), UserId::new(), Timestamp::now())
            .unwrap_err();
        assert_eq!(err, LifecycleError::AlreadyRevoked);
    }

    #[test]
    fn revoking_draft_fails() {
        let mut cert = make_certificate();
        let err = cert
            .revoke("nope".to_string(), UserId::new(), Timestamp::now())
            .unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
    }

    #[test]
    fn anchor_set_at_most_once() {
        let mut cert = make_certificate();
        let first = AnchorRef::new("txn-1").unwrap();
        cert.set_anchor(first.clone(), Timestamp::now()).unwrap();

        let err = cert
            .set_anchor(AnchorRef::new("txn-2").unwrap(), Timestamp::now())
            .unwrap_err();
        assert_eq!(err, LifecycleError::AnchorAlreadySet { existing: first });
    }

    #[test]
    fn anchor_from_pending_retry_succeeds() {
        let mut cert = make_certificate();
        cert.anchor = AnchorState::PendingRetry;
        cert.set_anchor(AnchorRef::new("txn-3").unwrap(), Timestamp::now())
            .unwrap();
        assert!(cert.anchor.anchor_ref().is_some());
    }

    #[test]
    fn effective_status_overlays_expiry() {
        let mut cert = make_certificate();
        cert.mark_issued(Timestamp::now()).unwrap();
        cert.expiry_date = Some(Timestamp::from_datetime(Utc::now() - Duration::days(1)));
        assert_eq!(
            cert.effective_status(Timestamp::now()),
            EffectiveStatus::Expired
        );
        // Stored status is untouched by the overlay.
        assert_eq!(cert.status, CertificateStatus::Issued);
    }

    #[test]
    fn effective_status_revoked_beats_expired() {
        let mut cert = make_certificate();
        cert.mark_issued(Timestamp::now()).unwrap();
        cert.expiry_date = Some(Timestamp::from_datetime(Utc::now() - Duration::days(1)));
        cert.revoke("withdrawn".to_string(), UserId::new(), Timestamp::now())
            .unwrap();
        assert_eq!(
            cert.effective_status(Timestamp::now()),
            EffectiveStatus::Revoked
        );
    }

    #[test]
    fn non_expiring_certificate_stays_issued() {
        let mut cert = make_certificate();
        cert.mark_issued(Timestamp::now()).unwrap();
        assert_eq!(
            cert.effective_status(Timestamp::now()),
            EffectiveStatus::Issued
        );
    }

    #[test]
    fn certificate_serde_roundtrip() {
        let mut cert = make_certificate();
        cert.mark_issued(Timestamp::now()).unwrap();
        let json = serde_json::to_string(&cert).unwrap();
        let back: Certificate = serde_json::from_str(&json).unwrap();
        assert_eq!(cert, back);
    }

    #[test]
    fn status_serializes_as_tagged_field() {
        let mut cert = make_certificate();
        cert.mark_issued(Timestamp::now()).unwrap();
        let val = serde_json::to_value(&cert).unwrap();
        assert_eq!(val.get("status").unwrap(), "issued");
    }

    #[test]
    fn metadata_flattens_extra_fields() {
        let json = r#"{"grade":"A","courseName":"Rust","cohort":"2024"}"#;
        let meta: CertificateMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.grade.as_deref(), Some("A"));
        assert_eq!(meta.extra.get("cohort").unwrap(), "2024");
    }
}
