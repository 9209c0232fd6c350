//! # certchain-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the CertChain Engine API.
//! Binds to configurable port (default 8080).

use std::str::FromStr;

use certchain_api::state::AppConfig;
use certchain_engine::AnchorPolicy;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Build configuration from environment.
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let anchor_policy = match std::env::var("CERTCHAIN_ANCHOR_POLICY") {
        Ok(raw) => AnchorPolicy::from_str(&raw).map_err(|e| {
            tracing::error!("Invalid CERTCHAIN_ANCHOR_POLICY: {e}");
            e
        })?,
        Err(_) => AnchorPolicy::Always,
    };

    let seed_demo = std::env::var("CERTCHAIN_SEED_DEMO")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let config = AppConfig {
        port,
        anchor_policy,
        seed_demo,
    };

    let state = certchain_api::state::AppState::with_config(config);

    if state.config.seed_demo {
        let summary = certchain_api::seed::seed_demo(&state);
        tracing::info!(
            template_id = %summary.template_id,
            issuer_id = %summary.issuer_id,
            "demo data seeded"
        );
    }

    let app = certchain_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("CertChain API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
