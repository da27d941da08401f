//! Record store trait and backends.

use crate::record::StoredCertificate;
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use sigil_core::CertId;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

/// The one table: certificate ID string to JSON-encoded record.
const CERTS: TableDefinition<&str, &[u8]> = TableDefinition::new("certificates");

/// Store error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No record for the given ID. This is a content fact, distinct from
    /// the store being unreachable.
    #[error("certificate not found: {id}")]
    NotFound {
        /// The missing certificate ID
        id: String,
    },
    /// A record with this ID already exists
    #[error("certificate already exists: {id}")]
    AlreadyExists {
        /// The duplicate certificate ID
        id: String,
    },
    /// The underlying store cannot be reached or queried. Never collapsed
    /// into `NotFound`.
    #[error("record store unavailable: {reason}")]
    Unavailable {
        /// Backend failure description
        reason: String,
    },
    /// Stored bytes could not be decoded
    #[error("stored record corrupted: {reason}")]
    Corrupted {
        /// Decode failure description
        reason: String,
    },
}

/// Issuance statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Total certificates stored
    pub total: usize,
    /// Certificates not revoked
    pub active: usize,
    /// Certificates revoked
    pub revoked: usize,
}

/// The record store the signing core depends on.
///
/// `insert` is atomic from the caller's perspective: on error the record
/// does not exist, so verification can never observe a record without its
/// signature. A successful `insert` is visible to every subsequent `get`.
pub trait RecordStore: Send + Sync {
    /// Insert a freshly issued certificate.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` for a duplicate ID, `Unavailable` if the
    /// backend fails.
    fn insert(&self, cert: &StoredCertificate) -> Result<(), StoreError>;

    /// Fetch a certificate by ID. Absence is `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the backend fails, `Corrupted` if the
    /// stored bytes cannot be decoded.
    fn get(&self, id: &CertId) -> Result<Option<StoredCertificate>, StoreError>;

    /// Set the revocation flag. Idempotent; last write wins.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown ID, `Unavailable` if the backend
    /// fails.
    fn set_revoked(&self, id: &CertId, revoked: bool) -> Result<(), StoreError>;

    /// List all certificates, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the backend fails.
    fn list(&self) -> Result<Vec<StoredCertificate>, StoreError>;

    /// Issuance statistics.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the backend fails.
    fn stats(&self) -> Result<StoreStats, StoreError> {
        let all = self.list()?;
        let revoked = all.iter().filter(|c| c.revoked).count();
        Ok(StoreStats {
            total: all.len(),
            active: all.len() - revoked,
            revoked,
        })
    }
}

fn newest_first(certs: &mut [StoredCertificate]) {
    certs.sort_by(|a, b| {
        b.record
            .issued_at
            .cmp(&a.record.issued_at)
            .then_with(|| b.record.id.cmp(&a.record.id))
    });
}

/// In-memory record store, for tests and embedding
pub struct MemoryStore {
    certs: RwLock<HashMap<CertId, StoredCertificate>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            certs: RwLock::new(HashMap::new()),
        }
    }

    /// Number of certificates stored
    #[must_use]
    pub fn count(&self) -> usize {
        self.certs.read().unwrap().len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryStore {
    fn insert(&self, cert: &StoredCertificate) -> Result<(), StoreError> {
        let mut certs = self.certs.write().unwrap();
        if certs.contains_key(&cert.id()) {
            return Err(StoreError::AlreadyExists {
                id: cert.id().to_string(),
            });
        }
        certs.insert(cert.id(), cert.clone());
        Ok(())
    }

    fn get(&self, id: &CertId) -> Result<Option<StoredCertificate>, StoreError> {
        Ok(self.certs.read().unwrap().get(id).cloned())
    }

    fn set_revoked(&self, id: &CertId, revoked: bool) -> Result<(), StoreError> {
        let mut certs = self.certs.write().unwrap();
        match certs.get_mut(id) {
            Some(cert) => {
                cert.revoked = revoked;
                Ok(())
            }
            None => Err(StoreError::NotFound { id: id.to_string() }),
        }
    }

    fn list(&self) -> Result<Vec<StoredCertificate>, StoreError> {
        let mut all: Vec<_> = self.certs.read().unwrap().values().cloned().collect();
        newest_first(&mut all);
        Ok(all)
    }
}

/// Persistent record store backed by redb
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open (or create) a store at the given path.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the database cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(unavailable)?;
            }
        }

        let db = Database::create(path).map_err(unavailable)?;

        // Materialize the table so later read transactions always find it.
        let txn = db.begin_write().map_err(unavailable)?;
        txn.open_table(CERTS).map_err(unavailable)?;
        txn.commit().map_err(unavailable)?;

        tracing::debug!(path = %path.display(), "opened certificate store");
        Ok(Self { db })
    }
}

impl RecordStore for RedbStore {
    fn insert(&self, cert: &StoredCertificate) -> Result<(), StoreError> {
        let id = cert.id().to_string();
        let bytes = serde_json::to_vec(cert).map_err(|e| StoreError::Corrupted {
            reason: e.to_string(),
        })?;

        let txn = self.db.begin_write().map_err(unavailable)?;
        {
            let mut table = txn.open_table(CERTS).map_err(unavailable)?;
            let exists = table.get(id.as_str()).map_err(unavailable)?.is_some();
            if exists {
                return Err(StoreError::AlreadyExists { id });
            }
            table
                .insert(id.as_str(), bytes.as_slice())
                .map_err(unavailable)?;
        }
        txn.commit().map_err(unavailable)?;

        tracing::debug!(id = %id, "certificate stored");
        Ok(())
    }

    fn get(&self, id: &CertId) -> Result<Option<StoredCertificate>, StoreError> {
        let txn = self.db.begin_read().map_err(unavailable)?;
        let table = txn.open_table(CERTS).map_err(unavailable)?;

        let id = id.to_string();
        match table.get(id.as_str()).map_err(unavailable)? {
            Some(guard) => {
                let cert = serde_json::from_slice(guard.value()).map_err(|e| {
                    StoreError::Corrupted {
                        reason: e.to_string(),
                    }
                })?;
                Ok(Some(cert))
            }
            None => Ok(None),
        }
    }

    fn set_revoked(&self, id: &CertId, revoked: bool) -> Result<(), StoreError> {
        let id = id.to_string();
        let txn = self.db.begin_write().map_err(unavailable)?;
        {
            let mut table = txn.open_table(CERTS).map_err(unavailable)?;
            let updated = {
                let guard = table
                    .get(id.as_str())
                    .map_err(unavailable)?
                    .ok_or_else(|| StoreError::NotFound { id: id.clone() })?;
                let mut cert: StoredCertificate = serde_json::from_slice(guard.value())
                    .map_err(|e| StoreError::Corrupted {
                        reason: e.to_string(),
                    })?;
                cert.revoked = revoked;
                serde_json::to_vec(&cert).map_err(|e| StoreError::Corrupted {
                    reason: e.to_string(),
                })?
            };
            table
                .insert(id.as_str(), updated.as_slice())
                .map_err(unavailable)?;
        }
        txn.commit().map_err(unavailable)?;

        tracing::debug!(id = %id, revoked, "revocation flag updated");
        Ok(())
    }

    fn list(&self) -> Result<Vec<StoredCertificate>, StoreError> {
        let txn = self.db.begin_read().map_err(unavailable)?;
        let table = txn.open_table(CERTS).map_err(unavailable)?;

        let mut all = Vec::new();
        for entry in table.iter().map_err(unavailable)? {
            let (_, value) = entry.map_err(unavailable)?;
            let cert = serde_json::from_slice(value.value()).map_err(|e| {
                StoreError::Corrupted {
                    reason: e.to_string(),
                }
            })?;
            all.push(cert);
        }
        newest_first(&mut all);
        Ok(all)
    }
}

fn unavailable<E: std::fmt::Display>(err: E) -> StoreError {
    StoreError::Unavailable {
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_core::{CertificateDraft, CertificateRecord};

    fn sample_cert(name: &str, issued_at: &str) -> StoredCertificate {
        let draft = CertificateDraft::new(name, "Bitcoin 101", "2024-A").unwrap();
        let record = CertificateRecord::issue_at(draft, issued_at.to_string());
        StoredCertificate::new(record, "c2lnbmF0dXJl".to_string())
    }

    fn exercise_store(store: &dyn RecordStore) {
        let cert = sample_cert("Ada Lovelace", "2024-06-01 12:00:00 UTC");
        let id = cert.id();

        assert_eq!(store.get(&id).unwrap(), None);
        store.insert(&cert).unwrap();

        // Read-after-write
        let fetched = store.get(&id).unwrap().unwrap();
        assert_eq!(fetched, cert);

        // Duplicate insert rejected
        assert!(matches!(
            store.insert(&cert),
            Err(StoreError::AlreadyExists { .. })
        ));

        // Revocation toggles, idempotently
        store.set_revoked(&id, true).unwrap();
        store.set_revoked(&id, true).unwrap();
        assert!(store.get(&id).unwrap().unwrap().revoked);
        store.set_revoked(&id, false).unwrap();
        assert!(!store.get(&id).unwrap().unwrap().revoked);

        // Revoking an unknown ID is NotFound
        assert!(matches!(
            store.set_revoked(&CertId::new(), true),
            Err(StoreError::NotFound { .. })
        ));

        // Revocation never touches the signature or the record
        let after = store.get(&id).unwrap().unwrap();
        assert_eq!(after.record, cert.record);
        assert_eq!(after.signature, cert.signature);
    }

    #[test]
    fn test_memory_store_contract() {
        exercise_store(&MemoryStore::new());
    }

    #[test]
    fn test_redb_store_contract() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("certs.redb")).unwrap();
        exercise_store(&store);
    }

    #[test]
    fn test_redb_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("certs.redb");
        let cert = sample_cert("Ada Lovelace", "2024-06-01 12:00:00 UTC");

        {
            let store = RedbStore::open(&path).unwrap();
            store.insert(&cert).unwrap();
        }

        let store = RedbStore::open(&path).unwrap();
        assert_eq!(store.get(&cert.id()).unwrap(), Some(cert));
    }

    #[test]
    fn test_list_newest_first() {
        let store = MemoryStore::new();
        let older = sample_cert("Ada Lovelace", "2024-06-01 12:00:00 UTC");
        let newer = sample_cert("Grace Hopper", "2024-06-02 12:00:00 UTC");
        store.insert(&older).unwrap();
        store.insert(&newer).unwrap();

        let all = store.list().unwrap();
        assert_eq!(all[0].record.name, "Grace Hopper");
        assert_eq!(all[1].record.name, "Ada Lovelace");
    }

    #[test]
    fn test_stats() {
        let store = MemoryStore::new();
        let a = sample_cert("Ada Lovelace", "2024-06-01 12:00:00 UTC");
        let b = sample_cert("Grace Hopper", "2024-06-02 12:00:00 UTC");
        store.insert(&a).unwrap();
        store.insert(&b).unwrap();
        store.set_revoked(&a.id(), true).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.revoked, 1);
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Unavailable {
            reason: "disk on fire".to_string(),
        };
        assert!(err.to_string().contains("unavailable"));
    }
}
