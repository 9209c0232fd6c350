#![deny(missing_docs)]

//! # certchain-render — Deterministic Template Renderer
//!
//! Binds a certificate's data to a template's markup and style sheet to
//! produce a fully resolved [`DocumentBody`](certchain_model::DocumentBody).
//!
//! ## Contract
//!
//! - Resolution is case-sensitive exact-name substitution of `{{name}}`
//!   tokens from a binding table built from the certificate record.
//! - Every name in `template.placeholders` and every token in the markup
//!   must resolve, or rendering fails with
//!   [`RenderError::MissingPlaceholder`].
//! - Rendering is pure: no I/O, no clock, no randomness. Identical
//!   (certificate, template) pairs yield byte-identical output — the
//!   fingerprint computed over the rendered body is therefore stable across
//!   machines and across time, which is what makes re-verification possible.

mod renderer;

pub use renderer::{binding_table, render, RenderError};
