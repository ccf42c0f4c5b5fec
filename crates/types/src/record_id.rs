//! Opaque record identifiers.
//!
//! Every stored medicine record carries a unique identifier. Identifiers
//! generated by this crate use the 32-character lowercase hexadecimal form of
//! a v4 UUID (no hyphens), but identifiers arriving from outside (a backup
//! produced by another device or an older build) are treated as opaque: any
//! non-blank string is accepted and preserved verbatim. The only invariant
//! this type enforces is that an identifier is never empty.

use std::fmt;
use std::str::FromStr;

/// Error type for record identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// The supplied identifier was empty or contained only whitespace
    #[error("record id cannot be empty")]
    Empty,
}

/// A unique, opaque identifier for a stored medicine record.
///
/// # Construction
/// - [`RecordId::generate`] allocates a fresh identifier for a newly
///   inserted record.
/// - [`RecordId::parse`] validates an externally supplied identifier
///   (CLI input, a restored backup) without altering it.
///
/// Once constructed the identifier is immutable; comparisons are exact
/// string comparisons.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordId(String);

impl RecordId {
    /// Generates a fresh identifier for a newly created record.
    ///
    /// The result is the simple (hyphen-free, lowercase) form of a v4 UUID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Validates an externally supplied identifier.
    ///
    /// The input is accepted verbatim, with no trimming or case folding,
    /// so that identifiers survive an export/import round trip unchanged.
    ///
    /// # Errors
    ///
    /// Returns `IdError::Empty` if the input is empty or whitespace-only.
    pub fn parse(input: impl Into<String>) -> Result<Self, IdError> {
        let raw = input.into();
        if raw.trim().is_empty() {
            return Err(IdError::Empty);
        }
        Ok(Self(raw))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for RecordId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RecordId::parse(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod record_id_tests {
    use super::*;

    #[test]
    fn generate_produces_canonical_simple_form() {
        let id = RecordId::generate();
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!id.as_str().contains('-'));
    }

    #[test]
    fn generate_produces_distinct_ids() {
        let first = RecordId::generate();
        let second = RecordId::generate();
        assert_ne!(first, second);
    }

    #[test]
    fn parse_preserves_foreign_ids_verbatim() {
        let id = RecordId::parse("1712000000000-abc").expect("valid id");
        assert_eq!(id.as_str(), "1712000000000-abc");
    }

    #[test]
    fn parse_rejects_blank_input() {
        let err = RecordId::parse("  ").expect_err("expected rejection");
        assert!(matches!(err, IdError::Empty));
    }
}
