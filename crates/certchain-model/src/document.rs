//! # Rendered Document Body
//!
//! The fully resolved output of the template renderer: markup with every
//! placeholder substituted, paired with the style sheet it was rendered
//! under. Downstream document export (PDF generation) consumes this value
//! unmodified; the engine fingerprints it as part of the certificate's
//! canonical content.

use serde::{Deserialize, Serialize};

use certchain_core::{CanonicalBytes, CanonicalizationError};

use crate::template::StyleSheet;

/// A fully resolved document body.
///
/// Byte-identical for identical (certificate data, template) inputs — the
/// renderer performs no I/O and consults no clock, so this value is safe to
/// include in fingerprint computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentBody {
    /// Markup with all placeholders substituted.
    pub content: String,
    /// The style sheet the document was rendered under.
    pub styles: StyleSheet,
}

impl DocumentBody {
    /// Canonical byte representation, used as the rendered-body component of
    /// the certificate fingerprint.
    pub fn canonical_bytes(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_bytes_deterministic() {
        let body = DocumentBody {
            content: "<h1>Rust Fundamentals</h1>".to_string(),
            styles: StyleSheet::default(),
        };
        assert_eq!(
            body.canonical_bytes().unwrap(),
            body.canonical_bytes().unwrap()
        );
    }

    #[test]
    fn canonical_bytes_differ_on_content_change() {
        let styles = StyleSheet::default();
        let a = DocumentBody {
            content: "alpha".to_string(),
            styles: styles.clone(),
        };
        let b = DocumentBody {
            content: "beta".to_string(),
            styles,
        };
        assert_ne!(a.canonical_bytes().unwrap(), b.canonical_bytes().unwrap());
    }
}
