//! # Anchor Maintenance API
//!
//! Operator endpoint that re-submits every deferred anchor. In
//! production this sits behind a scheduler; the endpoint exists so an
//! operator can force a sweep after a known ledger outage ends.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use certchain_engine::RetrySummary;

use crate::error::AppError;
use crate::state::AppState;

/// Build the anchors router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/anchors/retry", post(retry_anchors))
}

/// POST /v1/anchors/retry — Re-submit every deferred anchor.
#[utoipa::path(
    post,
    path = "/v1/anchors/retry",
    responses(
        (status = 200, description = "Sweep outcome counts"),
    ),
    tag = "anchors"
)]
pub async fn retry_anchors(
    State(state): State<AppState>,
) -> Result<Json<RetrySummary>, AppError> {
    let summary = state.issuance.retry_deferred_anchors();
    Ok(Json(summary))
}
