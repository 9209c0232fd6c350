//! Route modules for the CertChain API.
//!
//! | Prefix                          | Module           | Domain                 |
//! |---------------------------------|------------------|------------------------|
//! | `/v1/certificates/*`            | [`certificates`] | Issuance and lifecycle |
//! | `/v1/certificates/:id/verify`   | [`verify`]       | Verification           |
//! | `/v1/verify`                    | [`verify`]       | Verification by serial |
//! | `/v1/anchors/*`                 | [`anchors`]      | Deferred anchor sweep  |

pub mod anchors;
pub mod certificates;
pub mod verify;
