//! SIGIL Core Types
//!
//! This crate contains pure types and logic with no I/O: the certificate
//! record, its validating constructors, and the canonical byte encoding
//! that signatures are computed over.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod id;
pub mod record;

// Re-exports
pub use codec::{canonical_bytes, canonical_json};
pub use id::CertId;
pub use record::{CertificateDraft, CertificateRecord, ValidationError};
