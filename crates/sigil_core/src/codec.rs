//! Canonical byte encoding of certificate records.
//!
//! Signing and verification must always operate on identical bytes for
//! identical logical content, so the encoding is fixed: a JSON object with
//! the five record fields, keys sorted, compact separators. The map is
//! built from a `BTreeMap`, making key order a property of the encoding
//! rather than of how the record was assembled in memory.

use crate::record::CertificateRecord;
use std::collections::BTreeMap;

/// Encode a record's signed fields as canonical bytes.
///
/// The same logical content always produces the same bytes; any change to
/// any field changes the output.
#[must_use]
pub fn canonical_bytes(record: &CertificateRecord) -> Vec<u8> {
    canonical_json(record).into_bytes()
}

/// Canonical JSON form of a record's signed fields.
#[must_use]
pub fn canonical_json(record: &CertificateRecord) -> String {
    let id = record.id.to_string();
    let mut fields: BTreeMap<&str, &str> = BTreeMap::new();
    fields.insert("id", &id);
    fields.insert("name", &record.name);
    fields.insert("course", &record.course);
    fields.insert("cohort", &record.cohort);
    fields.insert("issued_at", &record.issued_at);

    // Fixed schema of string fields: serialization cannot fail.
    serde_json::to_string(&fields).expect("canonical encoding of string map")
}
