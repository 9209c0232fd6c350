#![deny(missing_docs)]

//! # certchain-model — Domain Records for the CertChain Engine
//!
//! The records the engine persists and exchanges:
//!
//! - **Certificate** ([`certificate`]): the central immutable record with a
//!   closed lifecycle enum (`Draft → Issued → Revoked`, expiry derived at
//!   read time, never written back) and an explicit [`AnchorState`] instead
//!   of a nullable hash field.
//!
//! - **Template** ([`template`]): rendering blueprint with a structured
//!   [`StyleSheet`] of named sections rather than a flat bag of style fields.
//!   Templates are immutable by id — edits register a new identifier.
//!
//! - **User** ([`user`]): issuer/recipient identity, owned by the external
//!   identity service and referenced by id.
//!
//! Invalid lifecycle transitions are runtime errors carrying the attempted
//! transition; content fields have no mutators at all — corrections require
//! issuing a superseding certificate.

pub mod certificate;
pub mod document;
pub mod template;
pub mod user;

pub use certificate::{
    AnchorState, Certificate, CertificateMetadata, CertificateStatus, EffectiveStatus,
    LifecycleError,
};
pub use document::DocumentBody;
pub use template::{SectionStyle, StyleSheet, Template};
pub use user::{Role, User};
