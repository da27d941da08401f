//! The signature authority: issuance and verification against a store.

use crate::export::CertificateExport;
use crate::outcome::VerifyOutcome;
use crate::signature::{PublicKey, Signature, Signer, Verifier};
use sigil_core::{CertId, CertificateDraft, CertificateRecord, canonical_bytes};
use sigil_store::{RecordStore, StoreError, StoredCertificate};

/// Check a record/signature pair against a public key, with no store.
///
/// This is the offline half of the verification protocol: anyone holding
/// the published public key can validate an export's `data` against its
/// `signature`. Undecodable signature encoding counts as invalid.
#[must_use]
pub fn verify_detached(
    public_key: &PublicKey,
    record: &CertificateRecord,
    signature_b64: &str,
) -> bool {
    let Ok(signature) = Signature::from_base64(signature_b64) else {
        return false;
    };
    let Ok(verifier) = Verifier::new(public_key) else {
        return false;
    };
    verifier.verify(&canonical_bytes(record), &signature)
}

/// Holds the deployment keypair and performs issuance and verification.
///
/// Immutable after construction and safe to share across concurrent
/// requests; the private key never leaves this type.
pub struct CertificateAuthority {
    /// The deployment signer
    signer: Signer,
    /// Verifier under the signer's own public key
    verifier: Verifier,
}

impl CertificateAuthority {
    /// Create an authority from a loaded signer
    #[must_use]
    pub fn new(signer: Signer) -> Self {
        let verifier = signer.verifier();
        Self { signer, verifier }
    }

    /// The published verification key
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        self.signer.public_key()
    }

    /// The published verification key in its stable base64 form
    #[must_use]
    pub fn public_key_base64(&self) -> String {
        self.signer.public_key().to_base64()
    }

    /// Issue a certificate: stamp the draft, sign its canonical bytes, and
    /// insert record and signature as one unit.
    ///
    /// If the insert fails the record does not exist; there is no window
    /// where a record is readable without its signature.
    ///
    /// # Errors
    ///
    /// Returns error if the store insert fails
    pub fn issue(
        &self,
        store: &dyn RecordStore,
        draft: CertificateDraft,
    ) -> Result<StoredCertificate, StoreError> {
        let record = CertificateRecord::issue(draft);
        let signature = self.signer.sign(&canonical_bytes(&record));
        let stored = StoredCertificate::new(record, signature.to_base64());

        store.insert(&stored)?;
        tracing::info!(id = %stored.id(), name = %stored.record.name, "certificate issued");
        Ok(stored)
    }

    /// Verify a stored certificate by ID.
    ///
    /// The canonical bytes are reconstructed from the record's currently
    /// stored field values, never from caller-supplied data.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be queried; store failure is an
    /// operational problem, never reported as `NotFound`.
    pub fn verify_stored(
        &self,
        store: &dyn RecordStore,
        id: &CertId,
    ) -> Result<VerifyOutcome, StoreError> {
        let Some(stored) = store.get(id)? else {
            return Ok(VerifyOutcome::NotFound);
        };

        let Ok(signature) = Signature::from_base64(&stored.signature) else {
            return Ok(VerifyOutcome::Tampered);
        };
        if !self.verifier.verify(&canonical_bytes(&stored.record), &signature) {
            return Ok(VerifyOutcome::Tampered);
        }

        if stored.revoked {
            Ok(VerifyOutcome::Revoked)
        } else {
            Ok(VerifyOutcome::Authentic)
        }
    }

    /// Verify an uploaded export.
    ///
    /// The untrusted supplied fields are deliberately re-encoded and
    /// checked, which is exactly how tampering in exported files is
    /// detected. Revocation is consulted from the store only after the
    /// signature validates; an export absent from the store but validly
    /// signed is authentic.
    ///
    /// # Errors
    ///
    /// Returns error if the revocation lookup fails
    pub fn verify_export(
        &self,
        store: &dyn RecordStore,
        export: &CertificateExport,
    ) -> Result<VerifyOutcome, StoreError> {
        if !verify_detached(&self.public_key(), &export.data, &export.signature) {
            return Ok(VerifyOutcome::Tampered);
        }

        let revoked = store
            .get(&export.data.id)?
            .map(|stored| stored.revoked)
            .unwrap_or(false);

        if revoked {
            Ok(VerifyOutcome::Revoked)
        } else {
            Ok(VerifyOutcome::Authentic)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_store::MemoryStore;

    fn authority() -> CertificateAuthority {
        CertificateAuthority::new(Signer::new())
    }

    fn draft() -> CertificateDraft {
        CertificateDraft::new("Ada Lovelace", "Bitcoin 101", "2024-A").unwrap()
    }

    #[test]
    fn test_issue_then_verify_is_authentic() {
        let authority = authority();
        let store = MemoryStore::new();

        let stored = authority.issue(&store, draft()).unwrap();
        let outcome = authority.verify_stored(&store, &stored.id()).unwrap();
        assert_eq!(outcome, VerifyOutcome::Authentic);
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let authority = authority();
        let store = MemoryStore::new();

        let outcome = authority.verify_stored(&store, &CertId::new()).unwrap();
        assert_eq!(outcome, VerifyOutcome::NotFound);
    }

    #[test]
    fn test_revoked_certificate_is_revoked() {
        let authority = authority();
        let store = MemoryStore::new();

        let stored = authority.issue(&store, draft()).unwrap();
        store.set_revoked(&stored.id(), true).unwrap();

        let outcome = authority.verify_stored(&store, &stored.id()).unwrap();
        assert_eq!(outcome, VerifyOutcome::Revoked);

        store.set_revoked(&stored.id(), false).unwrap();
        let outcome = authority.verify_stored(&store, &stored.id()).unwrap();
        assert_eq!(outcome, VerifyOutcome::Authentic);
    }

    #[test]
    fn test_tampered_record_is_tampered_even_if_revoked() {
        let authority = authority();
        let store = MemoryStore::new();

        let stored = authority.issue(&store, draft()).unwrap();

        // Tamper with the stored record out-of-band, then revoke it.
        let mut forged = stored.clone();
        forged.record.name = "Charles Babbage".to_string();
        let forged_store = MemoryStore::new();
        forged_store.insert(&forged).unwrap();
        forged_store.set_revoked(&forged.id(), true).unwrap();

        // Cryptographic validity is evaluated before revocation.
        let outcome = authority.verify_stored(&forged_store, &forged.id()).unwrap();
        assert_eq!(outcome, VerifyOutcome::Tampered);
    }

    #[test]
    fn test_export_roundtrip_is_authentic() {
        let authority = authority();
        let store = MemoryStore::new();

        let stored = authority.issue(&store, draft()).unwrap();
        let export = CertificateExport::from_stored(&stored);

        let outcome = authority.verify_export(&store, &export).unwrap();
        assert_eq!(outcome, VerifyOutcome::Authentic);
    }

    #[test]
    fn test_export_single_character_flip_is_tampered() {
        let authority = authority();
        let store = MemoryStore::new();

        let stored = authority.issue(&store, draft()).unwrap();
        let mut export = CertificateExport::from_stored(&stored);
        export.data.name = export.data.name.replace("Ada", "Eda");

        let outcome = authority.verify_export(&store, &export).unwrap();
        assert_eq!(outcome, VerifyOutcome::Tampered);
    }

    #[test]
    fn test_export_garbage_signature_is_tampered() {
        let authority = authority();
        let store = MemoryStore::new();

        let stored = authority.issue(&store, draft()).unwrap();
        let mut export = CertificateExport::from_stored(&stored);
        export.signature = "!!! not base64 !!!".to_string();

        let outcome = authority.verify_export(&store, &export).unwrap();
        assert_eq!(outcome, VerifyOutcome::Tampered);
    }

    #[test]
    fn test_export_of_revoked_certificate_is_revoked() {
        let authority = authority();
        let store = MemoryStore::new();

        let stored = authority.issue(&store, draft()).unwrap();
        store.set_revoked(&stored.id(), true).unwrap();

        let export = CertificateExport::from_stored(&stored);
        let outcome = authority.verify_export(&store, &export).unwrap();
        assert_eq!(outcome, VerifyOutcome::Revoked);
    }

    #[test]
    fn test_export_absent_from_store_is_authentic() {
        let authority = authority();
        let store = MemoryStore::new();

        let stored = authority.issue(&store, draft()).unwrap();
        let export = CertificateExport::from_stored(&stored);

        // A validly signed export verifies even against an empty store;
        // absence only matters for the revocation lookup.
        let other_store = MemoryStore::new();
        let outcome = authority.verify_export(&other_store, &export).unwrap();
        assert_eq!(outcome, VerifyOutcome::Authentic);
    }

    #[test]
    fn test_wrong_key_rejection() {
        let issuing = authority();
        let other = authority();
        let store = MemoryStore::new();

        let stored = issuing.issue(&store, draft()).unwrap();

        // The other deployment's key never validates this signature.
        let outcome = other.verify_stored(&store, &stored.id()).unwrap();
        assert_eq!(outcome, VerifyOutcome::Tampered);
    }

    #[test]
    fn test_revocation_does_not_touch_signature_validity() {
        let authority = authority();
        let store = MemoryStore::new();

        let stored = authority.issue(&store, draft()).unwrap();
        let bytes = canonical_bytes(&stored.record);
        let signature = Signature::from_base64(&stored.signature).unwrap();

        store.set_revoked(&stored.id(), true).unwrap();
        assert!(authority.verifier.verify(&bytes, &signature));

        store.set_revoked(&stored.id(), false).unwrap();
        assert!(authority.verifier.verify(&bytes, &signature));
    }

    #[test]
    fn test_verify_detached_matches_published_key() {
        let authority = authority();
        let store = MemoryStore::new();
        let stored = authority.issue(&store, draft()).unwrap();

        let published = PublicKey::from_base64(&authority.public_key_base64()).unwrap();
        assert!(verify_detached(&published, &stored.record, &stored.signature));

        let mut forged = stored.record.clone();
        forged.cohort = "2024-B".to_string();
        assert!(!verify_detached(&published, &forged, &stored.signature));
    }
}
