//! Cryptographic error types.

use thiserror::Error;

/// Errors from password hashing and storage-token encryption
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Key derivation failed
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// Token is not valid base64 or is too short for its format
    #[error("Malformed storage token")]
    MalformedToken,

    /// Leading discriminator byte does not name a known token format
    #[error("Unsupported storage token format: {0:#04x}")]
    UnsupportedFormat(u8),

    /// AEAD encryption failed
    #[error("Encryption failed")]
    EncryptFailed,

    /// AEAD tag verification failed
    #[error("Ciphertext integrity check failed (wrong key or tampered data)")]
    IntegrityFailure,
}

/// Result type for cryptographic operations
pub type CryptoResult<T> = Result<T, CryptoError>;
