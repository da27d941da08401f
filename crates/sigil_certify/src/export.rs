//! Self-contained certificate export.
//!
//! The export is the unit a certificate holder can hand to anyone: the
//! record's logical fields plus the issuance signature, verifiable without
//! the record store by re-encoding `data` and checking `signature` against
//! the issuer's published public key.

use serde::{Deserialize, Serialize};
use sigil_core::{CertId, CertificateRecord};
use sigil_store::StoredCertificate;

/// A certificate exported for offline or third-party verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateExport {
    /// Certificate ID (duplicated from `data` for lookup convenience)
    pub id: CertId,
    /// The signed logical fields
    pub data: CertificateRecord,
    /// Base64-encoded signature over the canonical encoding of `data`
    pub signature: String,
}

impl CertificateExport {
    /// Build the export for a stored certificate
    #[must_use]
    pub fn from_stored(stored: &StoredCertificate) -> Self {
        Self {
            id: stored.id(),
            data: stored.record.clone(),
            signature: stored.signature.clone(),
        }
    }

    /// Serialize to JSON
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json(&self) -> Result<String, ExportError> {
        serde_json::to_string(self).map_err(|_| ExportError::Serialization)
    }

    /// Serialize to pretty-printed JSON, for files meant for humans
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        serde_json::to_string_pretty(self).map_err(|_| ExportError::Serialization)
    }

    /// Parse an export from JSON.
    ///
    /// Only the `{id, data, signature}` envelope is accepted; malformed
    /// input is an input-format error, never a verification outcome.
    ///
    /// # Errors
    ///
    /// Returns error if the input is not valid JSON in the envelope shape
    pub fn from_json(json: &str) -> Result<Self, ExportError> {
        serde_json::from_str(json).map_err(|_| ExportError::Parse)
    }
}

/// Export format errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    /// Serialization error
    #[error("serialization error")]
    Serialization,
    /// Not a valid certificate export
    #[error("not a valid certificate export")]
    Parse,
}
