//! Repository trait definitions for testability and dependency injection.
//!
//! The engine never talks to a database directly; it goes through these
//! traits, so callers can plug in the bundled PostgreSQL implementation,
//! the in-memory store, or their own backend. Any implementation must be
//! consistent read-after-write from the same process and must resolve
//! concurrent code issuance for one `(user, purpose)` to a single winner
//! (last write wins).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::auth::{AuthResult, CodePurpose, DeviceTrust, Session, TwoFactorCode, User, UserId};

/// Trait for user account repository operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user with `email_verified = false` and no TOTP
    /// enrollment. The email is expected pre-normalized.
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        salt: &str,
    ) -> AuthResult<User>;

    /// Find user by normalized email
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>>;

    /// Flip the email-verified flag
    async fn set_email_verified(&self, user_id: UserId, verified: bool) -> AuthResult<()>;

    /// Replace the password hash and salt
    async fn set_password(
        &self,
        user_id: UserId,
        password_hash: &str,
        salt: &str,
    ) -> AuthResult<()>;

    /// Store or clear the (encrypted) TOTP secret and its enabled flag
    async fn set_totp(
        &self,
        user_id: UserId,
        secret: Option<&str>,
        enabled: bool,
    ) -> AuthResult<()>;
}

/// Trait for session repository operations. Sessions are append-only;
/// revocation never deletes a row.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert a new session row
    async fn insert_session(&self, session: &Session) -> AuthResult<()>;

    /// Find a session by id
    async fn find_session(&self, session_id: &str) -> AuthResult<Option<Session>>;

    /// All sessions for a user, revoked ones included
    async fn list_sessions(&self, user_id: UserId) -> AuthResult<Vec<Session>>;

    /// Mark one session revoked. Idempotent: revoking a revoked or
    /// unknown session is a no-op success.
    async fn revoke_session(&self, session_id: &str) -> AuthResult<()>;

    /// Mark every session for `(user, device)` revoked. Idempotent.
    async fn revoke_device_sessions(&self, user_id: UserId, device_info: &str) -> AuthResult<()>;
}

/// Trait for device trust repository operations
#[async_trait]
pub trait DeviceTrustRepository: Send + Sync {
    /// Insert or refresh the trust record for `(user, device)`
    async fn upsert_trust(&self, trust: &DeviceTrust) -> AuthResult<()>;

    /// Find the trust record for `(user, device)`, expired or not
    async fn find_trust(
        &self,
        user_id: UserId,
        device_name: &str,
    ) -> AuthResult<Option<DeviceTrust>>;
}

/// Trait for email one-time code repository operations
#[async_trait]
pub trait TwoFactorCodeRepository: Send + Sync {
    /// Store a code, replacing any existing row for `(user, purpose)`.
    /// Under concurrency exactly one writer wins; a replaced code is
    /// never accepted afterwards.
    async fn store_code(&self, code: &TwoFactorCode) -> AuthResult<()>;

    /// Fetch the current code row for `(user, purpose)`
    async fn find_code(
        &self,
        user_id: UserId,
        purpose: CodePurpose,
    ) -> AuthResult<Option<TwoFactorCode>>;

    /// Mark the current code row consumed. The flip is irreversible.
    async fn consume_code(&self, user_id: UserId, purpose: CodePurpose) -> AuthResult<()>;
}

/// Umbrella trait for everything the authentication engine needs from
/// persistence. Blanket-implemented for any type providing the four
/// repositories.
pub trait AuthStore:
    UserRepository + SessionRepository + DeviceTrustRepository + TwoFactorCodeRepository
{
}

impl<T> AuthStore for T where
    T: UserRepository + SessionRepository + DeviceTrustRepository + TwoFactorCodeRepository
{
}

/// PostgreSQL implementation of the auth store
pub struct PgAuthStore {
    pool: PgPool,
}

impl PgAuthStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &sqlx::postgres::PgRow) -> User {
        User {
            id: row.get("id"),
            username: row.get("username"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            salt: row.get("salt"),
            email_verified: row.get("email_verified"),
            totp_secret: row.get("totp_secret"),
            totp_enabled: row.get("totp_enabled"),
            created_at: row.get::<DateTime<Utc>, _>("created_at"),
        }
    }

    fn row_to_session(row: &sqlx::postgres::PgRow) -> Session {
        Session {
            id: row.get("id"),
            user_id: row.get("user_id"),
            device_info: row.get("device_info"),
            created_at: row.get::<DateTime<Utc>, _>("created_at"),
            revoked: row.get("revoked"),
        }
    }
}

#[async_trait]
impl UserRepository for PgAuthStore {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        salt: &str,
    ) -> AuthResult<User> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, salt, email_verified, totp_enabled)
            VALUES ($1, $2, $3, $4, FALSE, FALSE)
            RETURNING id, username, email, password_hash, salt, email_verified,
                      totp_secret, totp_enabled, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(salt)
        .fetch_one(&self.pool)
        .await?;

        Ok(Self::row_to_user(&row))
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, salt, email_verified,
                   totp_secret, totp_enabled, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Self::row_to_user))
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, salt, email_verified,
                   totp_secret, totp_enabled, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Self::row_to_user))
    }

    async fn set_email_verified(&self, user_id: UserId, verified: bool) -> AuthResult<()> {
        sqlx::query("UPDATE users SET email_verified = $2 WHERE id = $1")
            .bind(user_id)
            .bind(verified)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_password(
        &self,
        user_id: UserId,
        password_hash: &str,
        salt: &str,
    ) -> AuthResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2, salt = $3 WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .bind(salt)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_totp(
        &self,
        user_id: UserId,
        secret: Option<&str>,
        enabled: bool,
    ) -> AuthResult<()> {
        sqlx::query("UPDATE users SET totp_secret = $2, totp_enabled = $3 WHERE id = $1")
            .bind(user_id)
            .bind(secret)
            .bind(enabled)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for PgAuthStore {
    async fn insert_session(&self, session: &Session) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, device_info, created_at, revoked)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&session.id)
        .bind(session.user_id)
        .bind(&session.device_info)
        .bind(session.created_at)
        .bind(session.revoked)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_session(&self, session_id: &str) -> AuthResult<Option<Session>> {
        let row = sqlx::query(
            "SELECT id, user_id, device_info, created_at, revoked FROM sessions WHERE id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Self::row_to_session))
    }

    async fn list_sessions(&self, user_id: UserId) -> AuthResult<Vec<Session>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, device_info, created_at, revoked
            FROM sessions
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::row_to_session).collect())
    }

    async fn revoke_session(&self, session_id: &str) -> AuthResult<()> {
        sqlx::query("UPDATE sessions SET revoked = TRUE WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn revoke_device_sessions(&self, user_id: UserId, device_info: &str) -> AuthResult<()> {
        sqlx::query("UPDATE sessions SET revoked = TRUE WHERE user_id = $1 AND device_info = $2")
            .bind(user_id)
            .bind(device_info)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl DeviceTrustRepository for PgAuthStore {
    async fn upsert_trust(&self, trust: &DeviceTrust) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO device_trust (user_id, device_name, trust_expiry)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, device_name)
            DO UPDATE SET trust_expiry = EXCLUDED.trust_expiry
            "#,
        )
        .bind(trust.user_id)
        .bind(&trust.device_name)
        .bind(trust.trust_expiry)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_trust(
        &self,
        user_id: UserId,
        device_name: &str,
    ) -> AuthResult<Option<DeviceTrust>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, device_name, trust_expiry
            FROM device_trust
            WHERE user_id = $1 AND device_name = $2
            "#,
        )
        .bind(user_id)
        .bind(device_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| DeviceTrust {
            user_id: row.get("user_id"),
            device_name: row.get("device_name"),
            trust_expiry: row.get::<DateTime<Utc>, _>("trust_expiry"),
        }))
    }
}

#[async_trait]
impl TwoFactorCodeRepository for PgAuthStore {
    async fn store_code(&self, code: &TwoFactorCode) -> AuthResult<()> {
        // Single row per (user, purpose); the upsert makes concurrent
        // issuance resolve to the last writer.
        sqlx::query(
            r#"
            INSERT INTO two_factor_codes (user_id, purpose, code, expires_at, consumed)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, purpose)
            DO UPDATE SET
                code = EXCLUDED.code,
                expires_at = EXCLUDED.expires_at,
                consumed = EXCLUDED.consumed
            "#,
        )
        .bind(code.user_id)
        .bind(code.purpose.as_str())
        .bind(&code.code)
        .bind(code.expires_at)
        .bind(code.consumed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_code(
        &self,
        user_id: UserId,
        purpose: CodePurpose,
    ) -> AuthResult<Option<TwoFactorCode>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, purpose, code, expires_at, consumed
            FROM two_factor_codes
            WHERE user_id = $1 AND purpose = $2
            "#,
        )
        .bind(user_id)
        .bind(purpose.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| TwoFactorCode {
            user_id: row.get("user_id"),
            purpose,
            code: row.get("code"),
            expires_at: row.get::<DateTime<Utc>, _>("expires_at"),
            consumed: row.get("consumed"),
        }))
    }

    async fn consume_code(&self, user_id: UserId, purpose: CodePurpose) -> AuthResult<()> {
        sqlx::query(
            "UPDATE two_factor_codes SET consumed = TRUE WHERE user_id = $1 AND purpose = $2",
        )
        .bind(user_id)
        .bind(purpose.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
