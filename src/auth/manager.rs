//! Authentication manager implementation.

use std::sync::Arc;

use log::{info, warn};

use crate::crypto::{self, StorageCipher};
use crate::db::AuthStore;
use crate::mail::MailSender;
use crate::security::{PasswordStrength, strength};

use super::errors::{AuthError, AuthResult};
use super::models::{CodePurpose, LoginOutcome, MfaMethod, Session, User, UserId};
use super::two_factor::TwoFactorConfig;

/// Authentication orchestrator
///
/// Composes password verification, device trust, the two-factor engine,
/// and the session registry into the register/login/unlock flows consumed
/// by the UI. All collaborators are injected; the manager holds no
/// ambient state and no long-lived locks.
#[derive(Clone)]
pub struct AuthManager {
    pub(super) store: Arc<dyn AuthStore>,
    pub(super) mailer: Arc<dyn MailSender>,
    pub(super) cipher: Arc<StorageCipher>,
    pub(super) two_factor: TwoFactorConfig,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `store` - Persistence for users, sessions, devices, and codes
    /// * `mailer` - Outbound mail transport for email codes
    /// * `cipher` - Cipher for secrets at rest (TOTP secrets)
    /// * `two_factor` - Code lifetime and authenticator issuer
    pub fn new(
        store: Arc<dyn AuthStore>,
        mailer: Arc<dyn MailSender>,
        cipher: StorageCipher,
        two_factor: TwoFactorConfig,
    ) -> Self {
        Self {
            store,
            mailer,
            cipher: Arc::new(cipher),
            two_factor,
        }
    }

    /// Register a new vault owner
    ///
    /// Validates the username, email, and password strength, stores the
    /// account unverified, and dispatches the email verification code.
    ///
    /// # Returns
    ///
    /// * `AuthResult<User>` - Created user or error
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidUsername` - Username format invalid
    /// * `AuthError::InvalidEmail` - Email format invalid
    /// * `AuthError::WeakPassword` - Password scored weak
    /// * `AuthError::EmailTaken` - Email already registered
    /// * `AuthError::MailDispatchFailed` - Account was created but the
    ///   verification email could not be delivered; resend later
    pub async fn register_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> AuthResult<User> {
        validate_username(username)?;
        let email = normalize_email(email);
        validate_email(&email)?;
        validate_password(password)?;

        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let (password_hash, salt) = crypto::hash_password(password)?;
        let user = self
            .store
            .create_user(username, &email, &password_hash, &salt)
            .await?;
        info!("Registered user {} ({})", user.id, user.username);

        if !self.send_code(&user, CodePurpose::Registration).await? {
            return Err(AuthError::MailDispatchFailed { user_id: user.id });
        }
        Ok(user)
    }

    /// Confirm the address of a freshly registered account.
    ///
    /// Consumes the registration code; on success the account is marked
    /// email-verified.
    pub async fn verify_registration(&self, email: &str, code: &str) -> AuthResult<bool> {
        let user = self.user_by_email(email).await?;
        let verified = self
            .verify_code(user.id, CodePurpose::Registration, code)
            .await?;
        if verified {
            self.store.set_email_verified(user.id, true).await?;
            info!("Email verified for user {}", user.id);
        }
        Ok(verified)
    }

    /// Reissue the registration code. Returns `false` when the account is
    /// already verified or the mail could not be delivered.
    pub async fn resend_verification(&self, email: &str) -> AuthResult<bool> {
        let user = self.user_by_email(email).await?;
        if user.email_verified {
            return Ok(false);
        }
        self.send_code(&user, CodePurpose::Registration).await
    }

    /// Verify credentials and decide the second-factor route.
    ///
    /// # Arguments
    ///
    /// * `email` - Account email (normalized internally)
    /// * `password` - Plaintext candidate
    /// * `device_name` - Name of the calling device, matched against the
    ///   trust registry
    /// * `send_2fa` - Whether to dispatch an email code right away when
    ///   email is the applicable method; pass `false` to let the user
    ///   pick a method first
    ///
    /// # Returns
    ///
    /// * `AuthResult<LoginOutcome>` - Routing decision:
    ///   - trusted device: `mfa_required = false` and a fresh session,
    ///     nothing dispatched
    ///   - authenticator enrolled: `mfa_required = true`,
    ///     `mfa_method = Totp`, nothing dispatched (no silent fallback
    ///     to email)
    ///   - otherwise with `send_2fa`: an email code is issued and
    ///     `code_sent` reports delivery
    ///   - otherwise: `mfa_required = true` with no side effects
    ///
    /// # Errors
    ///
    /// * `AuthError::UserNotFound` - No account for this email
    /// * `AuthError::InvalidPassword` - Password mismatch
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        device_name: &str,
        send_2fa: bool,
    ) -> AuthResult<LoginOutcome> {
        let user = self.user_by_email(email).await?;

        if !crypto::verify_password(&user.password_hash, password) {
            warn!("Password verification failed for user {}", user.id);
            return Err(AuthError::InvalidPassword);
        }

        if self.is_device_trusted(user.id, device_name).await? {
            let session = self.create_session(user.id, device_name).await?;
            info!("Trusted device login for user {}", user.id);
            return Ok(LoginOutcome {
                user,
                session: Some(session),
                mfa_required: false,
                mfa_method: None,
                code_sent: false,
            });
        }

        if user.totp_enabled {
            return Ok(LoginOutcome {
                user,
                session: None,
                mfa_required: true,
                mfa_method: Some(MfaMethod::Totp),
                code_sent: false,
            });
        }

        if send_2fa {
            let code_sent = self.send_code(&user, CodePurpose::Login).await?;
            return Ok(LoginOutcome {
                user,
                session: None,
                mfa_required: true,
                mfa_method: Some(MfaMethod::Email),
                code_sent,
            });
        }

        Ok(LoginOutcome {
            user,
            session: None,
            mfa_required: true,
            mfa_method: None,
            code_sent: false,
        })
    }

    /// Finish a login that required a second factor.
    ///
    /// Verifies the email or authenticator code and opens the session.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidTwoFactorCode` - Wrong, expired, or reused
    pub async fn complete_login(
        &self,
        user_id: UserId,
        method: MfaMethod,
        code: &str,
        device_info: &str,
    ) -> AuthResult<Session> {
        let verified = match method {
            MfaMethod::Email => self.verify_code(user_id, CodePurpose::Login, code).await?,
            MfaMethod::Totp => self.verify_totp(user_id, code).await?,
        };
        if !verified {
            return Err(AuthError::InvalidTwoFactorCode);
        }
        let session = self.create_session(user_id, device_info).await?;
        info!("Login completed for user {user_id}");
        Ok(session)
    }

    /// Dispatch a confirmation code before a sensitive operation
    /// (vault export, secret reveal).
    pub async fn send_sensitive_action_code(&self, user_id: UserId) -> AuthResult<bool> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        self.send_code(&user, CodePurpose::SensitiveAction).await
    }

    /// Confirm a sensitive operation with either factor.
    pub async fn confirm_sensitive_action(
        &self,
        user_id: UserId,
        method: MfaMethod,
        code: &str,
    ) -> AuthResult<bool> {
        match method {
            MfaMethod::Email => {
                self.verify_code(user_id, CodePurpose::SensitiveAction, code)
                    .await
            }
            MfaMethod::Totp => self.verify_totp(user_id, code).await,
        }
    }

    /// Change the account password after re-verifying the current one.
    pub async fn change_password(
        &self,
        user_id: UserId,
        current: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if !crypto::verify_password(&user.password_hash, current) {
            return Err(AuthError::InvalidPassword);
        }
        validate_password(new_password)?;

        let (password_hash, salt) = crypto::hash_password(new_password)?;
        self.store.set_password(user_id, &password_hash, &salt).await?;
        info!("Password changed for user {user_id}");
        Ok(())
    }

    async fn user_by_email(&self, email: &str) -> AuthResult<User> {
        let email = normalize_email(email);
        self.store
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Lower-case and trim an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_username(username: &str) -> AuthResult<()> {
    let len = username.chars().count();
    if !(3..=20).contains(&len) {
        return Err(AuthError::InvalidUsername(
            "Username must be 3-20 characters".to_string(),
        ));
    }
    if !username.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(AuthError::InvalidUsername(
            "Username can only contain letters, numbers, and underscores".to_string(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> AuthResult<()> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AuthError::InvalidEmail("missing '@'".to_string()));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.starts_with('.') {
        return Err(AuthError::InvalidEmail(
            "address is not deliverable".to_string(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> AuthResult<()> {
    if strength(password) == PasswordStrength::Weak {
        return Err(AuthError::WeakPassword(
            "Use at least 8 characters mixing upper case, lower case, digits, and symbols"
                .to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn username_rules() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("al").is_err());
        assert!(validate_username("alice!").is_err());
        assert!(validate_username(&"a".repeat(21)).is_err());
    }

    #[test]
    fn email_rules() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("alice").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice@nodot").is_err());
    }

    #[test]
    fn weak_passwords_rejected() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("Tr;v0se-Lampe!42").is_ok());
    }
}
