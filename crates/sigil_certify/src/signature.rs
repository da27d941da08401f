//! Cryptographic signature support for certificates.
//!
//! One Ed25519 keypair per deployment. Key material is immutable once
//! loaded and safe for unsynchronized concurrent reads.

use base64::prelude::{BASE64_STANDARD, Engine as _};
use ed25519_dalek::Signature as DalekSignature;
use ed25519_dalek::Signer as DalekSigner;
use ed25519_dalek::SigningKey;
use ed25519_dalek::Verifier as DalekVerifier;
use ed25519_dalek::VerifyingKey;
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

/// A certificate signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Signature bytes
    pub bytes: Vec<u8>,
}

impl Signature {
    /// Create from raw bytes
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Get the signature bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Base64 transport form
    #[must_use]
    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(&self.bytes)
    }

    /// Parse from base64.
    ///
    /// # Errors
    ///
    /// Returns error if the input is not valid base64.
    pub fn from_base64(encoded: &str) -> Result<Self, SignatureError> {
        let bytes = BASE64_STANDARD
            .decode(encoded.trim())
            .map_err(|_| SignatureError::InvalidBase64)?;
        Ok(Self { bytes })
    }
}

/// A signer that holds the private key and creates signatures.
///
/// The private key never leaves this type except through
/// [`Signer::secret_key_base64`], which exists solely so the key file can
/// be persisted across restarts.
pub struct Signer {
    /// The signing key
    signing_key: SigningKey,
    /// The verifying key (derived)
    verifying_key: VerifyingKey,
}

impl Signer {
    /// Create a new signer with a random keypair
    #[must_use]
    pub fn new() -> Self {
        let mut rng = OsRng;
        // 32 bytes of OS randomness for the secret key
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        let signing_key = SigningKey::from_bytes(&bytes);
        let verifying_key = VerifyingKey::from(&signing_key);
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Create a signer from raw secret key bytes
    ///
    /// # Errors
    ///
    /// Returns error if the secret is not exactly 32 bytes
    pub fn from_secret(secret: &[u8]) -> Result<Self, SignatureError> {
        let bytes: [u8; 32] = secret
            .try_into()
            .map_err(|_| SignatureError::InvalidSecretKey)?;
        let signing_key = SigningKey::from_bytes(&bytes);
        let verifying_key = VerifyingKey::from(&signing_key);
        Ok(Self {
            signing_key,
            verifying_key,
        })
    }

    /// Create a signer from a base64-encoded secret (the at-rest format)
    ///
    /// # Errors
    ///
    /// Returns error if the input is not base64 or not 32 bytes
    pub fn from_base64(encoded: &str) -> Result<Self, SignatureError> {
        let bytes = BASE64_STANDARD
            .decode(encoded.trim())
            .map_err(|_| SignatureError::InvalidBase64)?;
        Self::from_secret(&bytes)
    }

    /// Base64 form of the secret key, for persisting to the key file
    #[must_use]
    pub fn secret_key_base64(&self) -> String {
        BASE64_STANDARD.encode(self.signing_key.to_bytes())
    }

    /// Get the public key
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.verifying_key.to_bytes())
    }

    /// Get a verifier for this signer's public key
    #[must_use]
    pub fn verifier(&self) -> Verifier {
        Verifier {
            verifying_key: self.verifying_key,
        }
    }

    /// Sign a message. Always succeeds with loaded key material.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Signature {
        let sig = self.signing_key.sign(message);
        Signature::new(sig.to_bytes().to_vec())
    }
}

impl Default for Signer {
    fn default() -> Self {
        Self::new()
    }
}

/// Public key for verification, published as base64
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    /// Create from raw bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The stable published encoding
    #[must_use]
    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(self.0)
    }

    /// Parse from base64
    ///
    /// # Errors
    ///
    /// Returns error if the input is not base64 or not 32 bytes
    pub fn from_base64(encoded: &str) -> Result<Self, SignatureError> {
        let bytes = BASE64_STANDARD
            .decode(encoded.trim())
            .map_err(|_| SignatureError::InvalidBase64)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| SignatureError::InvalidPublicKey)?;
        Ok(Self(arr))
    }
}

/// A verifier that checks signatures under one public key
pub struct Verifier {
    /// The public key for verification
    verifying_key: VerifyingKey,
}

impl Verifier {
    /// Create a verifier from a public key
    ///
    /// # Errors
    ///
    /// Returns error if the bytes are not a valid curve point
    pub fn new(public_key: &PublicKey) -> Result<Self, SignatureError> {
        let verifying_key = VerifyingKey::from_bytes(&public_key.0)
            .map_err(|_| SignatureError::InvalidPublicKey)?;
        Ok(Self { verifying_key })
    }

    /// Verify a signature on a message.
    ///
    /// Mismatched signature, malformed signature encoding, and a signature
    /// under a different key all return `false`; the distinction is
    /// irrelevant to callers.
    #[must_use]
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(sig) = DalekSignature::from_slice(&signature.bytes) else {
            return false;
        };
        self.verifying_key.verify(message, &sig).is_ok()
    }
}

/// Signature-related errors.
///
/// These cover key material problems only; a cryptographic mismatch is not
/// an error, it is a verification outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// Invalid secret key
    #[error("invalid secret key")]
    InvalidSecretKey,
    /// Invalid public key
    #[error("invalid public key")]
    InvalidPublicKey,
    /// Invalid base64 encoding
    #[error("invalid base64 encoding")]
    InvalidBase64,
}
