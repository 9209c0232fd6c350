//! Certificate fingerprint computation.
//!
//! The fingerprint covers the identity-bearing content fields and the
//! rendered document, nothing else. Lifecycle state, anchor state, and
//! bookkeeping timestamps are deliberately excluded: revoking or anchoring
//! a certificate must not change its fingerprint.

use serde::Serialize;

use certchain_core::{
    CanonicalBytes, CanonicalizationError, CertificateId, ContentDigest, SerialNumber, TemplateId,
    Timestamp, UserId, sha256_digest,
};
use certchain_model::{Certificate, DocumentBody};

/// The exact field set covered by the fingerprint.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FingerprintFields<'a> {
    id: &'a CertificateId,
    serial_number: &'a SerialNumber,
    issuer_id: &'a UserId,
    recipient_id: &'a UserId,
    issue_date: &'a Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiry_date: Option<&'a Timestamp>,
    template_id: &'a TemplateId,
    document: &'a DocumentBody,
}

/// Compute the content fingerprint of a certificate.
///
/// Deterministic: the field set is fixed, and the canonical byte encoding
/// normalizes key order and timestamp precision, so issuance and
/// verification always hash identical bytes for identical content.
pub fn certificate_fingerprint(
    certificate: &Certificate,
) -> Result<ContentDigest, CanonicalizationError> {
    let fields = FingerprintFields {
        id: &certificate.id,
        serial_number: &certificate.serial_number,
        issuer_id: &certificate.issuer_id,
        recipient_id: &certificate.recipient_id,
        issue_date: &certificate.issue_date,
        expiry_date: certificate.expiry_date.as_ref(),
        template_id: &certificate.template_id,
        document: &certificate.document,
    };
    let bytes = CanonicalBytes::new(&fields)?;
    Ok(sha256_digest(&bytes))
}
