//! # Password Guardian
//!
//! Authentication and vault-security engine for a personal credential
//! vault. The crate owns everything between "the user typed a password"
//! and "the vault may be opened": hashing and verification, email and
//! authenticator-app second factors, device trust, session bookkeeping,
//! encrypted storage tokens, portable encrypted exports, and password
//! health analysis.
//!
//! ## Core Modules
//!
//! - [`crypto`]: Argon2id password hashing and storage-token encryption
//! - [`security`]: offline strength scoring and k-anonymity breach lookup
//! - [`auth`]: MFA engine, device trust, sessions, and the orchestrator
//! - [`vault`]: passphrase-encrypted `.pgvault` export codec
//! - [`db`]: repository traits plus PostgreSQL and in-memory stores
//! - [`mail`]: outbound mail collaborator trait
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use password_guardian::auth::{AuthManager, MfaMethod, TwoFactorConfig};
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
//!     if let Some(MfaMethod::Totp) = outcome.mfa_method {
//!         println!("Enter the code from your authenticator app");
//!     }
//!     Ok(())
//! }
//! ```

/// Authentication: MFA engine, device trust, sessions, orchestrator.
pub mod auth;
pub use auth::{AuthError, AuthManager, AuthResult, LoginOutcome, MfaMethod, TwoFactorConfig};

/// Cryptographic primitives: hashing and storage encryption.
pub mod crypto;
pub use crypto::{CryptoError, StorageCipher};

/// Persistence collaborator: repository traits and bundled stores.
pub mod db;

/// Mail dispatch collaborator.
pub mod mail;

/// Password analysis: strength scoring and breach lookup.
pub mod security;
pub use security::{PasswordStrength, PwnedClient, PwnedConfig, strength};

/// Vault export codec.
pub mod vault;
pub use vault::{VaultData, VaultError, decrypt_vault_payload, encrypt_vault_payload};
