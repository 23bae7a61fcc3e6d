//! Authentication error types.

use thiserror::Error;

use crate::crypto::CryptoError;

use super::models::UserId;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Cryptographic failure while hashing or unwrapping secrets
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Password verification failed
    #[error("Invalid password")]
    InvalidPassword,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Email already registered
    #[error("Email already registered")]
    EmailTaken,

    /// Invalid username format
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    /// Invalid email format
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// Password too weak
    #[error("Password too weak: {0}")]
    WeakPassword(String),

    /// Wrong, expired, or already-used verification code
    #[error("Code invalid or expired")]
    InvalidTwoFactorCode,

    /// TOTP requested on an account with no enrolled authenticator
    #[error("Authenticator app is not enabled for this account")]
    TwoFactorNotEnabled,

    /// The account was created but the verification email could not be
    /// delivered; callers resend later with the embedded user id
    #[error("Could not send the verification email")]
    MailDispatchFailed { user_id: UserId },
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive
    /// information about the internal system structure.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Database(_) => "Internal error".to_string(),
            AuthError::Crypto(_) => "Internal error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
