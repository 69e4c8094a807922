use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Store-assigned document identifier.
///
/// Identifiers are time-ordered UUIDv7 values rendered in hyphenated form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a valid document identifier")]
pub struct InvalidId(pub String);

impl FromStr for DocumentId {
    type Err = InvalidId;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| InvalidId(raw.to_string()))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parses_back() {
        let id = DocumentId::generate();
        let parsed: DocumentId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn rejects_malformed_keys() {
        for raw in ["", "123", "not-an-id", "64b7f0c2e4b0a1a2b3c4d5e6"] {
            assert_eq!(raw.parse::<DocumentId>(), Err(InvalidId(raw.to_string())));
        }
    }

    #[test]
    fn generated_ids_are_time_ordered() {
        let first = DocumentId::generate();
        let second = DocumentId::generate();
        assert!(first < second);
    }
}
