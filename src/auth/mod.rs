//! Authentication module: registration, login, MFA, devices, sessions.
//!
//! This module implements the account-security core of the vault:
//! - Argon2id password hashing with per-user salts
//! - Email one-time codes (6 digits, short expiry, single use)
//! - TOTP authenticator enrollment and verification
//! - Device trust windows that waive the second factor
//! - Append-only session registry with monotonic revocation
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use password_guardian::auth::{AuthManager, TwoFactorConfig};
//! use password_guardian::crypto::StorageCipher;
//! use password_guardian::db::MemoryStore;
//! use password_guardian::mail::NullMailer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let auth = AuthManager::new(
//!         Arc::new(MemoryStore::new()),
//!         Arc::new(NullMailer),
//!         StorageCipher::new([0u8; 32]),
//!         TwoFactorConfig::default(),
//!     );
//!
//!     let outcome = auth
//!         .authenticate("owner@example.com", "Tr;v0se-Lampe!42", "laptop", false)
//!         .await?;
//!     if outcome.mfa_required {
//!         println!("Second factor needed: {:?}", outcome.mfa_method);
//!     }
//!     Ok(())
//! }
//! ```

pub mod devices;
pub mod errors;
pub mod manager;
pub mod models;
pub mod two_factor;

pub use errors::{AuthError, AuthResult};
pub use manager::{AuthManager, normalize_email};
pub use models::{
    CodePurpose, DeviceTrust, LoginOutcome, MfaMethod, Session, TotpSetup, TwoFactorCode, User,
    UserId,
};
pub use two_factor::TwoFactorConfig;
