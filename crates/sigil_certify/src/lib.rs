//! Certificate signing and verification for SIGIL.
//!
//! This crate owns the deployment's Ed25519 keypair and the integrity
//! protocol around it: signing canonical record bytes at issuance,
//! re-encoding stored or uploaded records at verification time, and
//! classifying every verification into exactly one outcome.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod authority;
pub mod export;
pub mod keyfile;
pub mod outcome;
pub mod signature;

pub use authority::{CertificateAuthority, verify_detached};
pub use export::{CertificateExport, ExportError};
pub use keyfile::{KeyError, SIGNING_KEY_ENV, init_signer, load_or_generate};
pub use outcome::VerifyOutcome;
pub use signature::{PublicKey, Signature, SignatureError, Signer, Verifier};
