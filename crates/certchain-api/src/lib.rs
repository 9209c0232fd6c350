//! # certchain-api — Axum HTTP API for the CertChain Engine
//!
//! Exposes the issuance and verification services over HTTP.
//!
//! ## API Surface
//!
//! | Route                              | Method | Domain                     |
//! |------------------------------------|--------|----------------------------|
//! | `/v1/certificates`                 | POST   | Issue a certificate        |
//! | `/v1/certificates/:id`             | GET    | Fetch the stored record    |
//! | `/v1/certificates/:id/document`    | GET    | Fetch the rendered document|
//! | `/v1/certificates/:id/revoke`      | POST   | Revoke                     |
//! | `/v1/certificates/:id/verify`      | GET    | Verify by id               |
//! | `/v1/verify?serial=…`              | GET    | Verify by serial number    |
//! | `/v1/certificates/verify/batch`    | POST   | Verify up to 50 serials    |
//! | `/v1/anchors/retry`                | POST   | Deferred anchor sweep      |
//!
//! ## OpenAPI
//!
//! Auto-generated spec via utoipa derive macros at `/openapi.json`.

pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod seed;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router.
///
/// Health probes (`/health/*`) are mounted outside the traced API
/// router so orchestration traffic stays out of the request logs.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::certificates::router())
        .merge(routes::verify::router())
        .merge(routes::anchors::router())
        .merge(openapi::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
