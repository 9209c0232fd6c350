//! # Error Hierarchy
//!
//! Structured error types for the foundational crate, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests. Each variant carries
//! the invalid input and the expected format so operators can diagnose
//! failures without guesswork.

use thiserror::Error;

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Fractional values must be strings or integers.
    #[error("float values are not permitted in canonical representations; use string or integer: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Validation errors for domain primitive newtypes.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Serial number is malformed or its check character does not match.
    #[error("invalid serial number: \"{value}\" ({reason})")]
    InvalidSerialNumber {
        /// The string that failed validation.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Anchor reference must be a non-empty opaque token.
    #[error("invalid anchor reference: must be non-empty")]
    InvalidAnchorRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_rejected_display() {
        let err = CanonicalizationError::FloatRejected(1.5);
        assert!(format!("{err}").contains("1.5"));
    }

    #[test]
    fn invalid_serial_display_carries_value_and_reason() {
        let err = ValidationError::InvalidSerialNumber {
            value: "BAD".to_string(),
            reason: "wrong length".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("BAD"));
        assert!(msg.contains("wrong length"));
    }

    #[test]
    fn invalid_anchor_ref_display() {
        let err = ValidationError::InvalidAnchorRef;
        assert!(format!("{err}").contains("non-empty"));
    }
}
