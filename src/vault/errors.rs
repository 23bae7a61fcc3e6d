//! Vault codec error types.

use thiserror::Error;

/// Errors from vault export encryption and decryption
#[derive(Debug, Error)]
pub enum VaultError {
    /// Authentication tag did not verify; either the passphrase is wrong
    /// or the file was modified. No plaintext is ever returned.
    #[error("Wrong passphrase or corrupted file")]
    WrongPassphrase,

    /// Envelope declares a format version this build does not know
    #[error("Unsupported vault format version: {0}")]
    UnsupportedVersion(u32),

    /// Empty passphrases are never accepted
    #[error("Passphrase must not be empty")]
    EmptyPassphrase,

    /// An envelope field failed to decode or has the wrong length
    #[error("Malformed envelope field: {0}")]
    MalformedEnvelope(&'static str),

    /// Key derivation failed
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// AEAD encryption failed
    #[error("Encryption failed")]
    EncryptFailed,

    /// Vault payload (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading or writing the vault file failed
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for vault codec operations
pub type VaultResult<T> = Result<T, VaultError>;
