//! # Demo Seed Data
//!
//! Registers a small set of users and a default template so a fresh
//! in-memory deployment can issue certificates immediately. Used by the
//! binary when `CERTCHAIN_SEED_DEMO` is set, and by the handler test
//! suite.

use certchain_core::{TemplateId, Timestamp, UserId};
use certchain_model::{Role, StyleSheet, Template, User};

use crate::state::AppState;

/// Identifiers of the seeded records.
#[derive(Debug, Clone, Copy)]
pub struct SeedSummary {
    /// The seeded admin.
    pub admin_id: UserId,
    /// The seeded issuer.
    pub issuer_id: UserId,
    /// The seeded holder.
    pub holder_id: UserId,
    /// The seeded default template.
    pub template_id: TemplateId,
}

fn make_user(email: &str, first: &str, last: &str, role: Role) -> User {
    User {
        id: UserId::new(),
        email: email.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        role,
        is_active: true,
        created_at: Timestamp::now(),
    }
}

/// Register demo users and the default template.
pub fn seed_demo(state: &AppState) -> SeedSummary {
    let admin = make_user("admin@certchain.local", "Avery", "Quinn", Role::Admin);
    let issuer = make_user("issuer@certchain.local", "Iris", "Moreno", Role::Issuer);
    let holder = make_user("holder@certchain.local", "Hugo", "Tanaka", Role::Holder);

    let template = Template {
        id: TemplateId::new(),
        name: "Classic Completion".to_string(),
        description: "Default completion certificate layout".to_string(),
        markup: concat!(
            "<div class=\"certificate\">",
            "<h1>{{title}}</h1>",
            "<p class=\"recipient\">Awarded to {{recipientName}}</p>",
            "<p class=\"description\">{{description}}</p>",
            "<p class=\"issuer\">Issued by {{issuerName}} on {{issueDate}}</p>",
            "<small class=\"serial\">{{serialNumber}}</small>",
            "</div>"
        )
        .to_string(),
        styles: StyleSheet::default(),
        placeholders: vec![
            "title".to_string(),
            "recipientName".to_string(),
            "description".to_string(),
            "issuerName".to_string(),
            "issueDate".to_string(),
            "serialNumber".to_string(),
        ],
        is_default: true,
        created_by: admin.id,
        created_at: Timestamp::now(),
    };

    let summary = SeedSummary {
        admin_id: admin.id,
        issuer_id: issuer.id,
        holder_id: holder.id,
        template_id: template.id,
    };

    state.users.register(admin);
    state.users.register(issuer);
    state.users.register(holder);
    state.templates.register(template);

    tracing::info!(
        issuer_id = %summary.issuer_id,
        template_id = %summary.template_id,
        "demo seed data registered"
    );
    summary
}
