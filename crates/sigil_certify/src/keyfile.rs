//! Signing key lifecycle.
//!
//! One keypair per deployment: loaded at startup from the environment or a
//! key file (base64-encoded raw key bytes at rest), generated once from OS
//! randomness if absent, never rotated.

use crate::signature::{SignatureError, Signer};
use std::path::Path;

/// Environment variable that can supply the signing key directly.
pub const SIGNING_KEY_ENV: &str = "SIGIL_SIGNING_KEY";

/// Key lifecycle errors
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// Key file could not be read or written
    #[error("key file {path}: {source}")]
    Io {
        /// The key file path
        path: String,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },
    /// Key material could not be decoded
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

/// Load the signing key from a file, generating and persisting a fresh one
/// if the file does not exist.
///
/// # Errors
///
/// Returns error if the file cannot be read or written, or holds
/// undecodable key material.
pub fn load_or_generate(path: &Path) -> Result<Signer, KeyError> {
    if path.exists() {
        let encoded = std::fs::read_to_string(path).map_err(|source| KeyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        return Ok(Signer::from_base64(&encoded)?);
    }

    let signer = Signer::new();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| KeyError::Io {
                path: path.display().to_string(),
                source,
            })?;
        }
    }
    std::fs::write(path, signer.secret_key_base64()).map_err(|source| KeyError::Io {
        path: path.display().to_string(),
        source,
    })?;

    tracing::info!(path = %path.display(), "generated new signing key");
    Ok(signer)
}

/// Initialize the deployment signer: the `SIGIL_SIGNING_KEY` environment
/// variable wins, otherwise the key file is loaded or created.
///
/// # Errors
///
/// Returns error if either source holds undecodable key material or the
/// key file cannot be accessed.
pub fn init_signer(path: &Path) -> Result<Signer, KeyError> {
    match std::env::var(SIGNING_KEY_ENV) {
        Ok(encoded) => Ok(Signer::from_base64(&encoded)?),
        Err(_) => load_or_generate(path),
    }
}
