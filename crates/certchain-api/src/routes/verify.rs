//! # Verification API
//!
//! Public verification endpoints: by certificate id, by serial number
//! (the path a holder types off a printed certificate), and in batches
//! of up to fifty serial numbers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use certchain_core::{CertificateId, SerialNumber};
use certchain_engine::{BatchVerificationReport, Locator, VerificationResult, MAX_BATCH_SIZE};

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Query parameters for verification by serial number.
#[derive(Debug, Deserialize)]
pub struct VerifySerialQuery {
    /// The serial number, as printed. Lowercase and the common
    /// transcription confusions (O for 0, I or L for 1) are accepted.
    pub serial: String,
}

/// Request to verify a batch of certificates.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchVerifyRequest {
    /// Serial numbers to verify, at most fifty per request.
    #[schema(value_type = Vec<String>)]
    pub serial_numbers: Vec<SerialNumber>,
}

impl Validate for BatchVerifyRequest {
    fn validate(&self) -> Result<(), String> {
        if self.serial_numbers.len() > MAX_BATCH_SIZE {
            return Err(format!(
                "serialNumbers must not exceed {MAX_BATCH_SIZE} entries"
            ));
        }
        Ok(())
    }
}

/// Build the verification router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/certificates/:id/verify", get(verify_certificate))
        .route("/v1/certificates/verify/batch", post(verify_batch))
        .route("/v1/verify", get(verify_by_serial))
}

/// GET /v1/certificates/:id/verify — Verify a certificate by id.
#[utoipa::path(
    get,
    path = "/v1/certificates/{id}/verify",
    params(("id" = Uuid, Path, description = "Certificate ID")),
    responses(
        (status = 200, description = "Verification verdict"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "verification"
)]
pub async fn verify_certificate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VerificationResult>, AppError> {
    let result = state
        .verification
        .verify(&Locator::Id(CertificateId::from(id)))?;
    Ok(Json(result))
}

/// GET /v1/verify?serial=… — Verify a certificate by serial number.
#[utoipa::path(
    get,
    path = "/v1/verify",
    params(("serial" = String, Query, description = "Serial number, as printed")),
    responses(
        (status = 200, description = "Verification verdict"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 422, description = "Malformed serial number", body = crate::error::ErrorBody),
    ),
    tag = "verification"
)]
pub async fn verify_by_serial(
    State(state): State<AppState>,
    Query(query): Query<VerifySerialQuery>,
) -> Result<Json<VerificationResult>, AppError> {
    let serial =
        SerialNumber::new(query.serial).map_err(|err| AppError::Validation(err.to_string()))?;
    let result = state.verification.verify(&Locator::Serial(serial))?;
    Ok(Json(result))
}

/// POST /v1/certificates/verify/batch — Verify up to fifty certificates.
#[utoipa::path(
    post,
    path = "/v1/certificates/verify/batch",
    request_body = BatchVerifyRequest,
    responses(
        (status = 200, description = "Per-certificate outcomes and totals"),
        (status = 422, description = "Batch too large", body = crate::error::ErrorBody),
    ),
    tag = "verification"
)]
pub async fn verify_batch(
    State(state): State<AppState>,
    body: Result<Json<BatchVerifyRequest>, JsonRejection>,
) -> Result<Json<BatchVerificationReport>, AppError> {
    let req = extract_validated_json(body)?;
    let report = state.verification.verify_batch(&req.serial_numbers)?;
    Ok(Json(report))
}
