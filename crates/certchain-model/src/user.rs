//! # User Identity
//!
//! Issuer and recipient identities. Users are owned by the external identity
//! service; the engine reads them through the `UserDirectory` seam and never
//! mutates them. A certificate references exactly one issuer and one
//! recipient by [`UserId`](certchain_core::UserId).

use serde::{Deserialize, Serialize};

use certchain_core::{Timestamp, UserId};

/// Platform role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Platform administrator — may issue and revoke any certificate.
    Admin,
    /// Certificate issuer.
    Issuer,
    /// Certificate holder (recipient).
    Holder,
}

impl Role {
    /// Whether this role is permitted to issue certificates.
    pub fn can_issue(&self) -> bool {
        matches!(self, Role::Admin | Role::Issuer)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Issuer => write!(f, "issuer"),
            Role::Holder => write!(f, "holder"),
        }
    }
}

/// A user as returned by the external identity service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Platform role.
    pub role: Role,
    /// Whether the account is active.
    pub is_active: bool,
    /// Account creation time.
    pub created_at: Timestamp,
}

impl User {
    /// Display name used when binding template placeholders.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user(role: Role) -> User {
        User {
            id: UserId::new(),
            email: "ada@example.org".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            role,
            is_active: true,
            created_at: Timestamp::now(),
        }
    }

    #[test]
    fn admin_and_issuer_can_issue() {
        assert!(Role::Admin.can_issue());
        assert!(Role::Issuer.can_issue());
        assert!(!Role::Holder.can_issue());
    }

    #[test]
    fn full_name_joins_parts() {
        let user = make_user(Role::Issuer);
        assert_eq!(user.full_name(), "Ada Lovelace");
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::Holder).unwrap(), "\"holder\"");
    }

    #[test]
    fn user_serializes_camel_case() {
        let user = make_user(Role::Holder);
        let val = serde_json::to_value(&user).unwrap();
        assert!(val.get("firstName").is_some());
        assert!(val.get("isActive").is_some());
        assert!(val.get("first_name").is_none());
    }
}
