//! The unit of storage: a signed certificate record.

use serde::{Deserialize, Serialize};
use sigil_core::{CertId, CertificateRecord};

/// A certificate as it lives in the store: the immutable signed record,
/// its signature, and the one mutable bit - the revocation flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCertificate {
    /// The signed logical fields
    pub record: CertificateRecord,
    /// Base64-encoded Ed25519 signature over the record's canonical bytes,
    /// computed exactly once at issuance and never updated
    pub signature: String,
    /// Revocation flag; mutated only through `set_revoked`
    pub revoked: bool,
}

impl StoredCertificate {
    /// Create a freshly issued (non-revoked) stored certificate
    #[must_use]
    pub fn new(record: CertificateRecord, signature: String) -> Self {
        Self {
            record,
            signature,
            revoked: false,
        }
    }

    /// The certificate ID
    #[must_use]
    pub fn id(&self) -> CertId {
        self.record.id
    }
}
