//! Authentication data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User ID type
pub type UserId = i64;

/// Vault owner account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Stored lower-cased and trimmed; unique across accounts
    pub email: String,
    /// Argon2id PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub salt: String,
    pub email_verified: bool,
    /// Storage token wrapping the base32 TOTP secret; present only once
    /// an authenticator has been enrolled
    #[serde(skip_serializing)]
    pub totp_secret: Option<String>,
    pub totp_enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Login session. Rows are append-only; logout is revocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: UserId,
    pub device_info: String,
    pub created_at: DateTime<Utc>,
    pub revoked: bool,
}

/// A device marked to skip multi-factor prompts until expiry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceTrust {
    pub user_id: UserId,
    pub device_name: String,
    pub trust_expiry: DateTime<Utc>,
}

impl DeviceTrust {
    /// Whether the trust window is still open.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.trust_expiry > now
    }
}

/// What an email one-time code authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodePurpose {
    Login,
    Registration,
    SensitiveAction,
}

impl CodePurpose {
    /// Stable string form used as the persistence key.
    pub fn as_str(&self) -> &'static str {
        match self {
            CodePurpose::Login => "login",
            CodePurpose::Registration => "registration",
            CodePurpose::SensitiveAction => "sensitive-action",
        }
    }

    /// Parse the persistence key back into a purpose.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "login" => Some(CodePurpose::Login),
            "registration" => Some(CodePurpose::Registration),
            "sensitive-action" => Some(CodePurpose::SensitiveAction),
            _ => None,
        }
    }
}

/// One email one-time code. At most one live row exists per
/// `(user_id, purpose)`; storing a new code replaces the old row.
#[derive(Debug, Clone)]
pub struct TwoFactorCode {
    pub user_id: UserId,
    pub purpose: CodePurpose,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
}

impl TwoFactorCode {
    /// A code is live while it is unconsumed and unexpired.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.consumed && self.expires_at > now
    }
}

/// Second factor selected for a login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MfaMethod {
    Email,
    Totp,
}

/// Result of a password check plus MFA routing decision
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    /// Present only when no second factor is required (trusted device)
    pub session: Option<Session>,
    pub mfa_required: bool,
    /// `Totp` when an authenticator is enrolled, `Email` when a code was
    /// requested, `None` when the caller deferred the choice
    pub mfa_method: Option<MfaMethod>,
    /// Whether an email code was actually delivered
    pub code_sent: bool,
}

/// TOTP enrollment response: the shared secret and the otpauth URI to
/// render as a QR code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotpSetup {
    pub secret: String,
    pub provisioning_uri: String,
}
