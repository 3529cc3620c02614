//! Domain identifier types with validation
//!
//! Newtype wrappers for the two identifier namespaces the coverage catalog
//! uses: the numeric document id and the family-prefixed display id.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numeric document identifier
///
/// The catalog serves this as a string of digits (e.g. `59636`), but some
/// report rows carry non-numeric values here, so only emptiness is rejected.
///
/// # Examples
///
/// ```
/// use covharvest::domain::ids::DocumentId;
/// use std::str::FromStr;
///
/// let id = DocumentId::from_str("59636").unwrap();
/// assert_eq!(id.as_str(), "59636");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates a new DocumentId, trimming surrounding whitespace
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err("Document ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the document ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Family-prefixed display identifier
///
/// Display ids are a letter prefix followed by digits: `A59636` for an
/// Article, `L36668` for a Determination.
///
/// # Examples
///
/// ```
/// use covharvest::domain::ids::DisplayId;
///
/// let id = DisplayId::new("A59636").unwrap();
/// assert_eq!(id.prefix(), Some('A'));
/// assert_eq!(id.numeric_part(), Some("59636"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DisplayId(String);

impl DisplayId {
    /// Creates a new DisplayId, trimming surrounding whitespace
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err("Display ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the display ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Uppercased leading letter, if the id starts with one
    pub fn prefix(&self) -> Option<char> {
        self.0
            .chars()
            .next()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_uppercase())
    }

    /// Digits following a single-letter prefix (`A59636` -> `59636`)
    ///
    /// Returns `None` unless the id is exactly one letter followed by at
    /// least one digit and nothing else.
    pub fn numeric_part(&self) -> Option<&str> {
        self.prefix()?;
        let rest = &self.0[1..];
        if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
            Some(rest)
        } else {
            None
        }
    }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DisplayId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for DisplayId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_creation() {
        let id = DocumentId::new(" 59636 ").unwrap();
        assert_eq!(id.as_str(), "59636");
        assert_eq!(format!("{id}"), "59636");
    }

    #[test]
    fn test_document_id_empty_fails() {
        assert!(DocumentId::new("").is_err());
        assert!(DocumentId::new("   ").is_err());
    }

    #[test]
    fn test_display_id_prefix_and_numeric_part() {
        let id = DisplayId::new("l36668").unwrap();
        assert_eq!(id.prefix(), Some('L'));
        assert_eq!(id.numeric_part(), Some("36668"));
    }

    #[test]
    fn test_display_id_without_prefix() {
        let id = DisplayId::new("36668").unwrap();
        assert_eq!(id.prefix(), None);
        assert_eq!(id.numeric_part(), None);
    }

    #[test]
    fn test_display_id_with_mixed_suffix() {
        let id = DisplayId::new("A5963X").unwrap();
        assert_eq!(id.prefix(), Some('A'));
        assert_eq!(id.numeric_part(), None);

        let bare = DisplayId::new("A").unwrap();
        assert_eq!(bare.numeric_part(), None);
    }

    #[test]
    fn test_display_id_serialization() {
        let id = DisplayId::new("A59636").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"A59636\"");
        let back: DisplayId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
