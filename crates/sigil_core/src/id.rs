//! Certificate identifiers.
//!
//! IDs are UUIDs and serialize in canonical hyphenated form, because the
//! ID is part of the signed payload: the serialized form must be stable.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Certificate identifier - primary lookup key and part of the signed payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertId(Uuid);

impl CertId {
    /// Create a new random CertId
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from UUID bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Get as UUID
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CertId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CertId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CertId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_id_creation() {
        let id = CertId::new();
        assert_ne!(id, CertId::new());
    }

    #[test]
    fn test_id_from_bytes() {
        let bytes = [1u8; 16];
        let id = CertId::from_bytes(bytes);
        assert_eq!(id.as_uuid().as_bytes(), &bytes);
    }

    #[test]
    fn test_id_display_roundtrip() {
        let id = CertId::new();
        let parsed = CertId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_id_from_str_invalid() {
        assert!(CertId::from_str("not-a-uuid").is_err());
    }

    #[test]
    fn test_id_serializes_as_string() {
        let id = CertId::from_bytes([0u8; 16]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }
}
