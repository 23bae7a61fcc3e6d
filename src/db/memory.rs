//! In-memory implementation of the auth store.
//!
//! Backs the engine's test suite and embedded single-process callers.
//! Semantics mirror the PostgreSQL implementation: read-after-write
//! consistency, append-only sessions, and last-write-wins replacement of
//! one-time codes per `(user, purpose)`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::auth::{
    AuthError, AuthResult, CodePurpose, DeviceTrust, Session, TwoFactorCode, User, UserId,
};

use super::repository::{
    DeviceTrustRepository, SessionRepository, TwoFactorCodeRepository, UserRepository,
};

/// Thread-safe in-memory auth store
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    next_user_id: RwLock<UserId>,
    sessions: RwLock<HashMap<String, Session>>,
    trusts: RwLock<HashMap<(UserId, String), DeviceTrust>>,
    codes: RwLock<HashMap<(UserId, CodePurpose), TwoFactorCode>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        salt: &str,
    ) -> AuthResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|user| user.email == email) {
            return Err(AuthError::EmailTaken);
        }

        let mut next_id = self.next_user_id.write().await;
        *next_id += 1;
        let user = User {
            id: *next_id,
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            salt: salt.to_string(),
            email_verified: false,
            totp_secret: None,
            totp_enabled: false,
            created_at: chrono::Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn set_email_verified(&self, user_id: UserId, verified: bool) -> AuthResult<()> {
        if let Some(user) = self.users.write().await.get_mut(&user_id) {
            user.email_verified = verified;
        }
        Ok(())
    }

    async fn set_password(
        &self,
        user_id: UserId,
        password_hash: &str,
        salt: &str,
    ) -> AuthResult<()> {
        if let Some(user) = self.users.write().await.get_mut(&user_id) {
            user.password_hash = password_hash.to_string();
            user.salt = salt.to_string();
        }
        Ok(())
    }

    async fn set_totp(
        &self,
        user_id: UserId,
        secret: Option<&str>,
        enabled: bool,
    ) -> AuthResult<()> {
        if let Some(user) = self.users.write().await.get_mut(&user_id) {
            user.totp_secret = secret.map(str::to_string);
            user.totp_enabled = enabled;
        }
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn insert_session(&self, session: &Session) -> AuthResult<()> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn find_session(&self, session_id: &str) -> AuthResult<Option<Session>> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn list_sessions(&self, user_id: UserId) -> AuthResult<Vec<Session>> {
        let sessions = self.sessions.read().await;
        let mut rows: Vec<Session> = sessions
            .values()
            .filter(|session| session.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn revoke_session(&self, session_id: &str) -> AuthResult<()> {
        if let Some(session) = self.sessions.write().await.get_mut(session_id) {
            session.revoked = true;
        }
        Ok(())
    }

    async fn revoke_device_sessions(&self, user_id: UserId, device_info: &str) -> AuthResult<()> {
        for session in self.sessions.write().await.values_mut() {
            if session.user_id == user_id && session.device_info == device_info {
                session.revoked = true;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DeviceTrustRepository for MemoryStore {
    async fn upsert_trust(&self, trust: &DeviceTrust) -> AuthResult<()> {
        self.trusts
            .write()
            .await
            .insert((trust.user_id, trust.device_name.clone()), trust.clone());
        Ok(())
    }

    async fn find_trust(
        &self,
        user_id: UserId,
        device_name: &str,
    ) -> AuthResult<Option<DeviceTrust>> {
        Ok(self
            .trusts
            .read()
            .await
            .get(&(user_id, device_name.to_string()))
            .cloned())
    }
}

#[async_trait]
impl TwoFactorCodeRepository for MemoryStore {
    async fn store_code(&self, code: &TwoFactorCode) -> AuthResult<()> {
        self.codes
            .write()
            .await
            .insert((code.user_id, code.purpose), code.clone());
        Ok(())
    }

    async fn find_code(
        &self,
        user_id: UserId,
        purpose: CodePurpose,
    ) -> AuthResult<Option<TwoFactorCode>> {
        Ok(self.codes.read().await.get(&(user_id, purpose)).cloned())
    }

    async fn consume_code(&self, user_id: UserId, purpose: CodePurpose) -> AuthResult<()> {
        if let Some(code) = self.codes.write().await.get_mut(&(user_id, purpose)) {
            code.consumed = true;
        }
        Ok(())
    }
}
