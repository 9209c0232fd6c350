//! # Certificate Issuance & Lifecycle API
//!
//! Issues certificates, exposes the stored record and its rendered
//! document, and handles revocation.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use certchain_core::{CertificateId, TemplateId, Timestamp, UserId};
use certchain_engine::IssueRequest;
use certchain_model::{Certificate, CertificateMetadata, DocumentBody};

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

const MAX_TITLE_LEN: usize = 255;
const MAX_DESCRIPTION_LEN: usize = 2000;
const MAX_REASON_LEN: usize = 500;
const MAX_URL_LEN: usize = 2048;

/// Request to issue a certificate.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueCertificateRequest {
    /// Certificate title.
    pub title: String,
    /// Certificate description.
    pub description: String,
    /// Issuing user.
    #[schema(value_type = String, format = Uuid)]
    pub issuer_id: UserId,
    /// Recipient user.
    #[schema(value_type = String, format = Uuid)]
    pub recipient_id: UserId,
    /// Template to render with.
    #[schema(value_type = String, format = Uuid)]
    pub template_id: TemplateId,
    /// Issue date.
    #[schema(value_type = String, format = DateTime)]
    pub issue_date: Timestamp,
    /// Optional expiry date. Must not precede the issue date.
    #[serde(default)]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub expiry_date: Option<Timestamp>,
    /// Optional source image reference.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Free-form metadata (grade, course name, and anything else).
    #[serde(default)]
    #[schema(value_type = Object)]
    pub metadata: CertificateMetadata,
    /// Request anchoring. Honored only under the on-demand anchor policy.
    #[serde(default)]
    pub anchor: bool,
}

impl Validate for IssueCertificateRequest {
    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.title.len() > MAX_TITLE_LEN {
            return Err(format!("title must not exceed {MAX_TITLE_LEN} characters"));
        }
        if self.description.trim().is_empty() {
            return Err("description must not be empty".to_string());
        }
        if self.description.len() > MAX_DESCRIPTION_LEN {
            return Err(format!(
                "description must not exceed {MAX_DESCRIPTION_LEN} characters"
            ));
        }
        if let Some(url) = &self.image_url {
            if url.len() > MAX_URL_LEN {
                return Err(format!("imageUrl must not exceed {MAX_URL_LEN} characters"));
            }
        }
        Ok(())
    }
}

/// Request to revoke a certificate.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevokeCertificateRequest {
    /// Why the certificate is being revoked.
    pub reason: String,
    /// The revoking user.
    #[schema(value_type = String, format = Uuid)]
    pub revoked_by: UserId,
}

impl Validate for RevokeCertificateRequest {
    fn validate(&self) -> Result<(), String> {
        if self.reason.trim().is_empty() {
            return Err("reason must not be empty".to_string());
        }
        if self.reason.len() > MAX_REASON_LEN {
            return Err(format!(
                "reason must not exceed {MAX_REASON_LEN} characters"
            ));
        }
        Ok(())
    }
}

/// Build the certificates router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/certificates", post(issue_certificate))
        .route("/v1/certificates/:id", get(get_certificate))
        .route("/v1/certificates/:id/document", get(get_document))
        .route("/v1/certificates/:id/revoke", post(revoke_certificate))
}

/// POST /v1/certificates — Issue a certificate.
#[utoipa::path(
    post,
    path = "/v1/certificates",
    request_body = IssueCertificateRequest,
    responses(
        (status = 201, description = "Certificate issued"),
        (status = 422, description = "Validation failed", body = crate::error::ErrorBody),
        (status = 502, description = "Ledger rejected the anchor submission", body = crate::error::ErrorBody),
    ),
    tag = "certificates"
)]
pub async fn issue_certificate(
    State(state): State<AppState>,
    body: Result<Json<IssueCertificateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Certificate>), AppError> {
    let req = extract_validated_json(body)?;
    let certificate = state.issuance.issue(IssueRequest {
        title: req.title,
        description: req.description,
        issuer_id: req.issuer_id,
        recipient_id: req.recipient_id,
        template_id: req.template_id,
        issue_date: req.issue_date,
        expiry_date: req.expiry_date,
        image_url: req.image_url,
        metadata: req.metadata,
        anchor: req.anchor,
    })?;
    Ok((StatusCode::CREATED, Json(certificate)))
}

/// GET /v1/certificates/:id — Fetch a certificate record.
#[utoipa::path(
    get,
    path = "/v1/certificates/{id}",
    params(("id" = Uuid, Path, description = "Certificate ID")),
    responses(
        (status = 200, description = "Certificate found"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "certificates"
)]
pub async fn get_certificate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Certificate>, AppError> {
    let id = CertificateId::from(id);
    let certificate = state
        .store
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("certificate {id} not found")))?;
    Ok(Json(certificate))
}

/// GET /v1/certificates/:id/document — Fetch the rendered document.
///
/// Returns the document exactly as persisted at issuance; downstream
/// export pipelines consume it unmodified.
#[utoipa::path(
    get,
    path = "/v1/certificates/{id}/document",
    params(("id" = Uuid, Path, description = "Certificate ID")),
    responses(
        (status = 200, description = "Rendered document"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "certificates"
)]
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentBody>, AppError> {
    let id = CertificateId::from(id);
    let certificate = state
        .store
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("certificate {id} not found")))?;
    Ok(Json(certificate.document))
}

/// POST /v1/certificates/:id/revoke — Revoke a certificate.
#[utoipa::path(
    post,
    path = "/v1/certificates/{id}/revoke",
    params(("id" = Uuid, Path, description = "Certificate ID")),
    request_body = RevokeCertificateRequest,
    responses(
        (status = 200, description = "Certificate revoked"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Already revoked", body = crate::error::ErrorBody),
    ),
    tag = "certificates"
)]
pub async fn revoke_certificate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<RevokeCertificateRequest>, JsonRejection>,
) -> Result<Json<Certificate>, AppError> {
    let req = extract_validated_json(body)?;
    let id = CertificateId::from(id);
    let certificate = state.issuance.revoke(&id, req.reason, &req.revoked_by)?;
    Ok(Json(certificate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> IssueCertificateRequest {
        IssueCertificateRequest {
            title: "Rust Fundamentals".to_string(),
            description: "Completed the course".to_string(),
            issuer_id: UserId::new(),
            recipient_id: UserId::new(),
            template_id: TemplateId::new(),
            issue_date: Timestamp::now(),
            expiry_date: None,
            image_url: None,
            metadata: CertificateMetadata::default(),
            anchor: false,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn empty_title_fails() {
        let mut req = request();
        req.title = "   ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn oversized_title_fails() {
        let mut req = request();
        req.title = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(req.validate().is_err());
    }

    #[test]
    fn empty_revocation_reason_fails() {
        let req = RevokeCertificateRequest {
            reason: String::new(),
            revoked_by: UserId::new(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn issue_request_deserializes_camel_case() {
        let json = serde_json::json!({
            "title": "Rust Fundamentals",
            "description": "Completed the course",
            "issuerId": uuid::Uuid::new_v4(),
            "recipientId": uuid::Uuid::new_v4(),
            "templateId": uuid::Uuid::new_v4(),
            "issueDate": "2026-08-27T00:00:00Z",
            "metadata": {"grade": "A"}
        });
        let req: IssueCertificateRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.metadata.grade.as_deref(), Some("A"));
        assert!(!req.anchor);
    }
}
