//! # Checksummed Serial Numbers
//!
//! Globally unique, human-transcribable certificate serial numbers.
//!
//! ## Format
//!
//! `XXXXX-XXXXX-XXXXX-C` — fifteen data symbols in three groups of five,
//! plus one check symbol, all from the Crockford base32 alphabet (no `I`,
//! `L`, `O`, or `U`). The check symbol is a position-weighted sum of the
//! data symbols, so most single-symbol typos and adjacent transpositions
//! are caught at parse time instead of producing a "certificate not
//! found". The check is mod 32, so a typo whose weighted delta is a
//! multiple of 32 slips through; it is a transcription guard, not an
//! integrity guarantee.
//!
//! Parsing is forgiving the way Crockford intends: lowercase input and the
//! ambiguous glyphs `O`→`0`, `I`/`L`→`1` are normalized before validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::identity::impl_validating_deserialize;

/// Crockford base32 alphabet: digits and uppercase letters minus I, L, O, U.
const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Number of data symbols (excluding the check symbol).
const DATA_LEN: usize = 15;

/// A checksummed certificate serial number.
///
/// Unique and assigned at issuance, never reassigned. Only constructible in
/// valid checksummed form: [`SerialNumber::generate`] for new allocations,
/// [`SerialNumber::new`] for parsing user-presented values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SerialNumber(String);

impl_validating_deserialize!(SerialNumber);

impl SerialNumber {
    /// Allocate a fresh random serial number.
    pub fn generate() -> Self {
        let entropy = *Uuid::new_v4().as_bytes();
        let symbols: Vec<u8> = entropy[..DATA_LEN]
            .iter()
            .map(|b| ALPHABET[(b % 32) as usize])
            .collect();
        let check = check_symbol(&symbols);
        let mut out = String::with_capacity(DATA_LEN + 4);
        for (i, c) in symbols.iter().enumerate() {
            if i > 0 && i % 5 == 0 {
                out.push('-');
            }
            out.push(*c as char);
        }
        out.push('-');
        out.push(check as char);
        Self(out)
    }

    /// Parse and validate a user-presented serial number.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSerialNumber`] when the format or
    /// the check symbol does not match.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let invalid = |reason: &str| ValidationError::InvalidSerialNumber {
            value: raw.clone(),
            reason: reason.to_string(),
        };

        let mut symbols = Vec::with_capacity(DATA_LEN + 1);
        for ch in raw.chars() {
            match normalize_symbol(ch) {
                Some(c) => symbols.push(c),
                None if ch == '-' => continue,
                None => return Err(invalid(&format!("invalid symbol '{ch}'"))),
            }
        }
        if symbols.len() != DATA_LEN + 1 {
            return Err(invalid(&format!(
                "expected {} symbols, got {}",
                DATA_LEN + 1,
                symbols.len()
            )));
        }
        let (data, check) = symbols.split_at(DATA_LEN);
        if check[0] != check_symbol(data) {
            return Err(invalid("check symbol mismatch"));
        }

        // Re-group into canonical form regardless of how the input was spaced.
        let mut out = String::with_capacity(DATA_LEN + 4);
        for (i, c) in data.iter().enumerate() {
            if i > 0 && i % 5 == 0 {
                out.push('-');
            }
            out.push(*c as char);
        }
        out.push('-');
        out.push(check[0] as char);
        Ok(Self(out))
    }

    /// Access the canonical string form (`XXXXX-XXXXX-XXXXX-C`).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalize a transcribed character to its canonical alphabet symbol.
fn normalize_symbol(ch: char) -> Option<u8> {
    let up = ch.to_ascii_uppercase();
    let mapped = match up {
        'O' => '0',
        'I' | 'L' => '1',
        other => other,
    };
    ALPHABET.contains(&(mapped as u8)).then_some(mapped as u8)
}

/// Position-weighted check symbol over the data symbols.
///
/// Weighting by position makes adjacent transpositions change the sum,
/// which a plain mod-32 sum would miss.
fn check_symbol(data: &[u8]) -> u8 {
    let sum: usize = data
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let value = ALPHABET.iter().position(|a| a == c).unwrap_or(0);
            value * (i + 1)
        })
        .sum();
    ALPHABET[sum % 32]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn generated_serial_has_canonical_format() {
        let s = SerialNumber::generate();
        let text = s.as_str();
        assert_eq!(text.len(), 19);
        let parts: Vec<&str> = text.split('-').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0].len(), 5);
        assert_eq!(parts[1].len(), 5);
        assert_eq!(parts[2].len(), 5);
        assert_eq!(parts[3].len(), 1);
    }

    #[test]
    fn generated_serial_reparses() {
        let s = SerialNumber::generate();
        let parsed = SerialNumber::new(s.as_str()).unwrap();
        assert_eq!(s, parsed);
    }

    #[test]
    fn lowercase_input_normalizes() {
        let s = SerialNumber::generate();
        let parsed = SerialNumber::new(s.as_str().to_lowercase()).unwrap();
        assert_eq!(s, parsed);
    }

    #[test]
    fn ambiguous_glyphs_normalize() {
        let s = SerialNumber::generate();
        let confused = s.as_str().replace('0', "O").replace('1', "I");
        let parsed = SerialNumber::new(confused).unwrap();
        assert_eq!(s, parsed);
    }

    #[test]
    fn single_symbol_typo_is_caught() {
        let s = SerialNumber::generate();
        let mut chars: Vec<char> = s.as_str().chars().collect();
        // Flip the first data symbol to a different alphabet symbol.
        let original = chars[0];
        chars[0] = if original == '7' { '8' } else { '7' };
        let corrupted: String = chars.into_iter().collect();
        assert!(SerialNumber::new(corrupted).is_err());
    }

    #[test]
    fn adjacent_transposition_is_caught() {
        // Find a serial whose first two data symbols differ, then swap them.
        let s = loop {
            let candidate = SerialNumber::generate();
            let bytes = candidate.as_str().as_bytes();
            if bytes[0] != bytes[1] {
                break candidate;
            }
        };
        let mut chars: Vec<char> = s.as_str().chars().collect();
        chars.swap(0, 1);
        let swapped: String = chars.into_iter().collect();
        assert!(SerialNumber::new(swapped).is_err());
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(SerialNumber::new("ABCDE-FGHJK").is_err());
        assert!(SerialNumber::new("").is_err());
    }

    #[test]
    fn invalid_symbols_rejected() {
        assert!(SerialNumber::new("ABCD!-FGHJK-MNPQR-S").is_err());
    }

    #[test]
    fn deserialize_rejects_bad_checksum() {
        let result: Result<SerialNumber, _> =
            serde_json::from_str("\"AAAAA-AAAAA-AAAAA-Z\"");
        assert!(result.is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let s = SerialNumber::generate();
        let json = serde_json::to_string(&s).unwrap();
        let back: SerialNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }

    proptest! {
        #[test]
        fn generated_serials_always_reparse(_seed in 0u8..16) {
            let s = SerialNumber::generate();
            prop_assert!(SerialNumber::new(s.as_str()).is_ok());
        }
    }
}
