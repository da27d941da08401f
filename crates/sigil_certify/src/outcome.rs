//! Verification outcome classification.

use serde::{Deserialize, Serialize};

/// The result of verifying a certificate. Exactly one outcome per request.
///
/// Evaluation order is fixed and must not be reordered: existence first,
/// then cryptographic verification, then revocation. A revoked-but-valid
/// certificate is `Revoked`, never `Tampered`; a tampered certificate is
/// `Tampered` even if its stored revocation flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyOutcome {
    /// No record exists for the given identifier
    NotFound,
    /// The signature does not match the record bytes
    Tampered,
    /// Signature valid, but the issuer has revoked the certificate
    Revoked,
    /// Signature valid and the certificate is in good standing
    Authentic,
}

impl VerifyOutcome {
    /// Stable snake_case label, as used in API responses
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Tampered => "tampered",
            Self::Revoked => "revoked",
            Self::Authentic => "authentic",
        }
    }

    /// Human-readable explanation
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::NotFound => "Certificate not found",
            Self::Tampered => "Certificate has been tampered with or signature is invalid",
            Self::Revoked => "This certificate has been revoked by the issuer",
            Self::Authentic => "This certificate is authentic and valid",
        }
    }

    /// Whether the certificate verified and is in good standing
    #[must_use]
    pub const fn is_authentic(&self) -> bool {
        matches!(self, Self::Authentic)
    }
}

impl std::fmt::Display for VerifyOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(VerifyOutcome::NotFound.as_str(), "not_found");
        assert_eq!(VerifyOutcome::Tampered.as_str(), "tampered");
        assert_eq!(VerifyOutcome::Revoked.as_str(), "revoked");
        assert_eq!(VerifyOutcome::Authentic.as_str(), "authentic");
    }

    #[test]
    fn test_outcome_serde_snake_case() {
        let json = serde_json::to_string(&VerifyOutcome::NotFound).unwrap();
        assert_eq!(json, "\"not_found\"");
        let parsed: VerifyOutcome = serde_json::from_str("\"authentic\"").unwrap();
        assert_eq!(parsed, VerifyOutcome::Authentic);
    }

    #[test]
    fn test_is_authentic() {
        assert!(VerifyOutcome::Authentic.is_authentic());
        assert!(!VerifyOutcome::Revoked.is_authentic());
        assert!(!VerifyOutcome::Tampered.is_authentic());
        assert!(!VerifyOutcome::NotFound.is_authentic());
    }
}
