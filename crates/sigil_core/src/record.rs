//! Certificate records and their validating constructors.

use crate::id::CertId;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Timestamp format stamped into the signed payload.
const ISSUED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Validation errors raised at issuance time.
///
/// A rejected draft mutates no state: validation happens before any
/// signing or storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Recipient name is mandatory
    #[error("name must not be empty")]
    EmptyName,
}

/// Unvalidated issuance input.
///
/// The only way to obtain a draft is [`CertificateDraft::new`], which trims
/// all fields and rejects an empty name, so every draft that exists is
/// well-formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateDraft {
    name: String,
    course: String,
    cohort: String,
}

impl CertificateDraft {
    /// Validate issuance input.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] if `name` is empty after
    /// trimming. `course` and `cohort` may be empty.
    pub fn new(name: &str, course: &str, cohort: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self {
            name: name.to_string(),
            course: course.trim().to_string(),
            cohort: cohort.trim().to_string(),
        })
    }

    /// Recipient name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The logical fields of a certificate.
///
/// All five fields are part of the signed payload; after issuance they are
/// immutable. Only the store-side revocation flag changes later, and it is
/// deliberately not a field here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    /// Unique certificate ID, signed along with the content so that
    /// tampering with the ID also invalidates the signature
    pub id: CertId,
    /// Recipient name
    pub name: String,
    /// Course title
    pub course: String,
    /// Cohort label
    pub cohort: String,
    /// UTC issuance timestamp, fixed at creation
    pub issued_at: String,
}

impl CertificateRecord {
    /// Issue a record from a validated draft, stamping a fresh ID and the
    /// current UTC time.
    #[must_use]
    pub fn issue(draft: CertificateDraft) -> Self {
        Self::issue_at(draft, Utc::now().format(ISSUED_AT_FORMAT).to_string())
    }

    /// Issue a record with an explicit timestamp.
    ///
    /// Used by tests that need reproducible payload bytes.
    #[must_use]
    pub fn issue_at(draft: CertificateDraft, issued_at: String) -> Self {
        Self {
            id: CertId::new(),
            name: draft.name,
            course: draft.course,
            cohort: draft.cohort,
            issued_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_rejects_empty_name() {
        assert_eq!(
            CertificateDraft::new("", "Bitcoin 101", "2024-A"),
            Err(ValidationError::EmptyName)
        );
        assert_eq!(
            CertificateDraft::new("   ", "Bitcoin 101", "2024-A"),
            Err(ValidationError::EmptyName)
        );
    }

    #[test]
    fn test_draft_trims_fields() {
        let draft = CertificateDraft::new("  Ada Lovelace ", " Bitcoin 101", "2024-A ").unwrap();
        assert_eq!(draft.name, "Ada Lovelace");
        assert_eq!(draft.course, "Bitcoin 101");
        assert_eq!(draft.cohort, "2024-A");
    }

    #[test]
    fn test_draft_allows_empty_optionals() {
        let draft = CertificateDraft::new("Ada Lovelace", "", "").unwrap();
        assert_eq!(draft.course, "");
        assert_eq!(draft.cohort, "");
    }

    #[test]
    fn test_issue_stamps_id_and_time() {
        let draft = CertificateDraft::new("Ada Lovelace", "Bitcoin 101", "2024-A").unwrap();
        let record = CertificateRecord::issue(draft.clone());
        assert_eq!(record.name, "Ada Lovelace");
        assert!(record.issued_at.ends_with("UTC"));

        let again = CertificateRecord::issue(draft);
        assert_ne!(record.id, again.id);
    }

    #[test]
    fn test_issue_at_fixed_timestamp() {
        let draft = CertificateDraft::new("Ada Lovelace", "Bitcoin 101", "2024-A").unwrap();
        let record = CertificateRecord::issue_at(draft, "2024-06-01 12:00:00 UTC".to_string());
        assert_eq!(record.issued_at, "2024-06-01 12:00:00 UTC");
    }

    #[test]
    fn test_record_json_roundtrip() {
        let draft = CertificateDraft::new("Ada Lovelace", "Bitcoin 101", "2024-A").unwrap();
        let record = CertificateRecord::issue(draft);
        let json = serde_json::to_string(&record).unwrap();
        let restored: CertificateRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, restored);
    }
}
