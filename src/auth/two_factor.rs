//! Email one-time codes and TOTP enrollment.
//!
//! Email codes are six decimal digits with a short expiry, single use,
//! and one live code per `(user, purpose)`. Dispatch happens before the
//! code is stored: a failed send can never leave a fresh usable code
//! behind, and the previous live code (if any) stays valid.
//!
//! TOTP follows RFC 6238 with SHA-1, 6 digits, a 30-second step, and a
//! tolerance of one step in either direction to absorb clock drift. An
//! enrollment stays pending until the first successful verification.

use chrono::{Duration, Utc};
use log::{info, warn};
use rand::Rng;
use subtle::ConstantTimeEq;
use totp_rs::{Algorithm, Secret, TOTP};

use crate::crypto::CryptoError;

use super::errors::{AuthError, AuthResult};
use super::manager::AuthManager;
use super::models::{CodePurpose, TotpSetup, TwoFactorCode, User, UserId};

/// Two-factor engine configuration
#[derive(Debug, Clone)]
pub struct TwoFactorConfig {
    /// How long an email code stays valid
    pub code_ttl: Duration,

    /// Hard cap on one mail dispatch; login must never stall on a slow
    /// transport
    pub mail_timeout: std::time::Duration,

    /// Issuer shown in authenticator apps
    pub issuer: String,
}

impl TwoFactorConfig {
    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `TWO_FACTOR_CODE_TTL_SECS`: email code lifetime (default: 600)
    /// - `TWO_FACTOR_MAIL_TIMEOUT_SECS`: dispatch timeout (default: 10)
    /// - `TWO_FACTOR_ISSUER`: issuer label for authenticator apps
    ///   (default: "Password Guardian")
    pub fn from_env() -> Self {
        Self {
            code_ttl: Duration::seconds(
                std::env::var("TWO_FACTOR_CODE_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(600),
            ),
            mail_timeout: std::time::Duration::from_secs(
                std::env::var("TWO_FACTOR_MAIL_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),
            issuer: std::env::var("TWO_FACTOR_ISSUER")
                .unwrap_or_else(|_| "Password Guardian".to_string()),
        }
    }
}

impl Default for TwoFactorConfig {
    fn default() -> Self {
        Self {
            code_ttl: Duration::seconds(600),
            mail_timeout: std::time::Duration::from_secs(10),
            issuer: "Password Guardian".to_string(),
        }
    }
}

impl AuthManager {
    /// Issue an email one-time code for a purpose.
    ///
    /// The code is dispatched through the mail collaborator first and
    /// stored only once delivery is confirmed, replacing any previous
    /// code for the same `(user, purpose)`.
    ///
    /// # Returns
    ///
    /// * `AuthResult<bool>` - `false` when the mail could not be
    ///   delivered; no code was issued in that case
    pub async fn send_code(&self, user: &User, purpose: CodePurpose) -> AuthResult<bool> {
        let code = format!("{:06}", rand::rng().random_range(0..1_000_000));
        let ttl_minutes = self.two_factor.code_ttl.num_minutes().max(1);

        let subject = match purpose {
            CodePurpose::Login => "Your sign-in verification code",
            CodePurpose::Registration => "Confirm your email address",
            CodePurpose::SensitiveAction => "Confirm this vault operation",
        };
        let body = format!(
            "Your verification code is {code}. It expires in {ttl_minutes} minute(s).\n\
             If you did not request this code, you can ignore this message."
        );

        let delivered = tokio::time::timeout(
            self.two_factor.mail_timeout,
            self.mailer.send(&user.email, subject, &body),
        )
        .await
        .unwrap_or(false);
        if !delivered {
            warn!(
                "Code dispatch failed for user {} (purpose {})",
                user.id,
                purpose.as_str()
            );
            return Ok(false);
        }

        let record = TwoFactorCode {
            user_id: user.id,
            purpose,
            code,
            expires_at: Utc::now() + self.two_factor.code_ttl,
            consumed: false,
        };
        self.store.store_code(&record).await?;
        info!(
            "Issued {} code for user {}",
            purpose.as_str(),
            user.id
        );
        Ok(true)
    }

    /// Verify an email one-time code.
    ///
    /// True only when a live code exists for `(user, purpose)` and the
    /// candidate matches under a constant-time comparison; the code is
    /// marked consumed before returning, so a replay inside the expiry
    /// window fails. Expired, consumed, and missing codes all answer
    /// `false`, indistinguishable from a wrong code.
    pub async fn verify_code(
        &self,
        user_id: UserId,
        purpose: CodePurpose,
        candidate: &str,
    ) -> AuthResult<bool> {
        let Some(record) = self.store.find_code(user_id, purpose).await? else {
            return Ok(false);
        };
        if !record.is_live(Utc::now()) {
            return Ok(false);
        }

        let matches: bool = record
            .code
            .as_bytes()
            .ct_eq(candidate.as_bytes())
            .into();
        if !matches {
            return Ok(false);
        }

        self.store.consume_code(user_id, purpose).await?;
        Ok(true)
    }

    /// Enroll an authenticator app for a user.
    ///
    /// Generates a fresh shared secret and stores it encrypted, with the
    /// enrollment left pending until the first successful
    /// [`verify_totp`](Self::verify_totp) flips `totp_enabled`.
    ///
    /// # Returns
    ///
    /// * `AuthResult<TotpSetup>` - The base32 secret and the otpauth URI
    pub async fn enable_totp(&self, user_id: UserId) -> AuthResult<TotpSetup> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let base32 = match Secret::generate_secret().to_encoded() {
            Secret::Encoded(value) => value,
            Secret::Raw(_) => {
                return Err(AuthError::Crypto(CryptoError::KeyDerivation(
                    "TOTP secret encoding failed".to_string(),
                )));
            }
        };

        let totp = self.build_totp(&base32, &user.email)?;
        let provisioning_uri = totp.get_url();

        let token = self.cipher.encrypt_for_storage(base32.as_bytes())?;
        self.store.set_totp(user_id, Some(&token), false).await?;
        info!("TOTP enrollment pending for user {user_id}");

        Ok(TotpSetup {
            secret: base32,
            provisioning_uri,
        })
    }

    /// Verify a TOTP code with one step of clock-drift tolerance.
    ///
    /// The first success after enrollment confirms it and sets
    /// `totp_enabled`. Returns `false` when no authenticator is enrolled.
    pub async fn verify_totp(&self, user_id: UserId, code: &str) -> AuthResult<bool> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        let Some(token) = user.totp_secret.as_deref() else {
            return Ok(false);
        };

        let base32 = self.cipher.decrypt_any_string(token)?;
        let totp = self.build_totp(&base32, &user.email)?;
        let verified = totp.check_current(code).unwrap_or(false);

        if verified && !user.totp_enabled {
            self.store.set_totp(user_id, Some(token), true).await?;
            info!("TOTP enrollment confirmed for user {user_id}");
        }
        Ok(verified)
    }

    /// Drop the authenticator enrollment entirely.
    pub async fn disable_totp(&self, user_id: UserId) -> AuthResult<()> {
        self.store.set_totp(user_id, None, false).await?;
        info!("TOTP disabled for user {user_id}");
        Ok(())
    }

    fn build_totp(&self, base32_secret: &str, account: &str) -> AuthResult<TOTP> {
        let secret = Secret::Encoded(base32_secret.to_string())
            .to_bytes()
            .map_err(|_| AuthError::InvalidTwoFactorCode)?;
        TOTP::new(
            Algorithm::SHA1,
            6,
            1,
            30,
            secret,
            Some(self.two_factor.issuer.clone()),
            account.to_string(),
        )
        .map_err(|_| AuthError::InvalidTwoFactorCode)
    }
}
