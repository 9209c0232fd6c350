//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CertChain Engine API",
        version = "0.3.0",
        description = "Certificate issuance, lifecycle, and verification for the CertChain digital-credential platform.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        crate::routes::certificates::issue_certificate,
        crate::routes::certificates::get_certificate,
        crate::routes::certificates::get_document,
        crate::routes::certificates::revoke_certificate,
        crate::routes::verify::verify_certificate,
        crate::routes::verify::verify_by_serial,
        crate::routes::verify::verify_batch,
        crate::routes::anchors::retry_anchors,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::certificates::IssueCertificateRequest,
        crate::routes::certificates::RevokeCertificateRequest,
        crate::routes::verify::BatchVerifyRequest,
    )),
    tags(
        (name = "certificates", description = "Certificate issuance and lifecycle"),
        (name = "verification", description = "Certificate verification"),
        (name = "anchors", description = "Deferred anchor maintenance"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router, serving the spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_contains_all_routes() {
        let spec = ApiDoc::openapi();
        let paths: Vec<&String> = spec.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/v1/certificates"));
        assert!(paths.iter().any(|p| p.as_str() == "/v1/verify"));
        assert!(paths
            .iter()
            .any(|p| p.as_str() == "/v1/certificates/verify/batch"));
        assert!(paths.iter().any(|p| p.as_str() == "/v1/anchors/retry"));
    }
}
