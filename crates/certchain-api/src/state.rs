//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor. Holds the issuance and verification
//! services plus direct handles to the seams behind them so that seed
//! routines and tests can register users and templates.
//!
//! Clone-friendly via `Arc` internals.

use std::sync::Arc;

use certchain_anchor::{AnchorLedger, InMemoryLedger};
use certchain_engine::{
    AnchorPolicy, CertificateStore, InMemoryDirectory, InMemoryStore, InMemoryTemplates,
    IssuanceService, TemplateSource, UserDirectory, VerificationService,
};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// When the issuance pipeline anchors fingerprints.
    pub anchor_policy: AnchorPolicy,
    /// Whether to register demo users and a default template at startup.
    pub seed_demo: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            anchor_policy: AnchorPolicy::Always,
            seed_demo: false,
        }
    }
}

/// Shared application state accessible to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// The issuance service.
    pub issuance: Arc<IssuanceService>,
    /// The verification service.
    pub verification: Arc<VerificationService>,
    /// Certificate persistence seam.
    pub store: Arc<dyn CertificateStore>,
    /// Template registry seam.
    pub templates: Arc<dyn TemplateSource>,
    /// Identity service seam.
    pub users: Arc<dyn UserDirectory>,
    /// The anchoring ledger.
    pub ledger: Arc<dyn AnchorLedger>,
    /// Application configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Create a state with default configuration and in-memory seams.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a state with the given configuration and an in-memory
    /// ledger.
    pub fn with_config(config: AppConfig) -> Self {
        Self::with_ledger(config, Arc::new(InMemoryLedger::new()))
    }

    /// Create a state with the given configuration and ledger.
    pub fn with_ledger(config: AppConfig, ledger: Arc<dyn AnchorLedger>) -> Self {
        let store: Arc<dyn CertificateStore> = Arc::new(InMemoryStore::new());
        let templates: Arc<dyn TemplateSource> = Arc::new(InMemoryTemplates::new());
        let users: Arc<dyn UserDirectory> = Arc::new(InMemoryDirectory::new());

        let issuance = Arc::new(IssuanceService::new(
            store.clone(),
            templates.clone(),
            users.clone(),
            ledger.clone(),
            config.anchor_policy,
        ));
        let verification = Arc::new(VerificationService::new(
            store.clone(),
            templates.clone(),
            ledger.clone(),
        ));

        Self {
            issuance,
            verification,
            store,
            templates,
            users,
            ledger,
            config,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.anchor_policy, AnchorPolicy::Always);
        assert!(!config.seed_demo);
    }

    #[test]
    fn state_is_cloneable_and_shares_stores() {
        let state = AppState::new();
        let clone = state.clone();
        assert!(Arc::ptr_eq(&state.issuance, &clone.issuance));
    }
}
