//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the engine. Each
//! identifier is a distinct type — you cannot pass a [`UserId`] where a
//! [`TemplateId`] is expected.
//!
//! UUID-based identifiers are always valid by construction. The string-based
//! [`AnchorRef`] validates at construction time and at deserialization time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Helper macro to implement `Deserialize` for string newtypes that must
/// validate their contents. Deserializes as a plain `String`, then routes
/// through the type's `new()` constructor so that invalid values are
/// rejected at deserialization time — not silently accepted.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use impl_validating_deserialize;

/// Helper macro for UUID-backed identifier newtypes.
macro_rules! uuid_id {
    ($(#[$doc:meta])* $ty:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $ty(Uuid);

        impl $ty {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $ty {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::from_str(s).map(Self)
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for a certificate. Assigned at issuance and never
    /// reassigned.
    CertificateId
}

uuid_id! {
    /// Unique identifier for a user (issuer or recipient). Users are owned
    /// by the external identity service; the engine references them by id.
    UserId
}

uuid_id! {
    /// Unique identifier for a rendering template. Templates are immutable
    /// by id — an edit registers a new identifier.
    TemplateId
}

/// Opaque reference to a ledger transaction returned by an anchor write.
///
/// The engine does not interpret the reference; it only stores it alongside
/// the certificate and hands it back to the ledger adapter for confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AnchorRef(String);

impl_validating_deserialize!(AnchorRef);

impl AnchorRef {
    /// Create an anchor reference from a ledger-supplied token.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAnchorRef`] if the token is empty
    /// or whitespace-only.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.trim().is_empty() {
            return Err(ValidationError::InvalidAnchorRef);
        }
        Ok(Self(s))
    }

    /// Access the reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AnchorRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
