//! Device trust and the session registry.
//!
//! Trusting a device is the only way the second factor is skipped;
//! password verification alone never is enough. Sessions are append-only
//! rows and logout is revocation, so the audit trail survives.

use chrono::{Duration, Utc};
use log::info;
use uuid::Uuid;

use super::errors::AuthResult;
use super::manager::AuthManager;
use super::models::{DeviceTrust, Session, UserId};

impl AuthManager {
    /// Mark a device as trusted for `days` days, refreshing any existing
    /// trust window for the same device.
    pub async fn trust_device(
        &self,
        user_id: UserId,
        device_name: &str,
        days: i64,
    ) -> AuthResult<bool> {
        let trust = DeviceTrust {
            user_id,
            device_name: device_name.to_string(),
            trust_expiry: Utc::now() + Duration::days(days),
        };
        self.store.upsert_trust(&trust).await?;
        info!("Device '{device_name}' trusted for user {user_id} ({days} days)");
        Ok(true)
    }

    /// Whether `(user, device)` has an unexpired trust record.
    pub async fn is_device_trusted(&self, user_id: UserId, device_name: &str) -> AuthResult<bool> {
        let trust = self.store.find_trust(user_id, device_name).await?;
        Ok(trust.map(|t| t.is_active(Utc::now())).unwrap_or(false))
    }

    /// Open a new session for a user on a device.
    pub async fn create_session(&self, user_id: UserId, device_info: &str) -> AuthResult<Session> {
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id,
            device_info: device_info.to_string(),
            created_at: Utc::now(),
            revoked: false,
        };
        self.store.insert_session(&session).await?;
        Ok(session)
    }

    /// Revoke one session. Idempotent: revoking an already-revoked or
    /// unknown session succeeds without effect, and other sessions of the
    /// same user are untouched.
    pub async fn revoke_session(&self, session_id: &str) -> AuthResult<()> {
        self.store.revoke_session(session_id).await
    }

    /// Revoke every session opened from a device. Idempotent.
    pub async fn revoke_device_sessions(
        &self,
        user_id: UserId,
        device_name: &str,
    ) -> AuthResult<()> {
        self.store.revoke_device_sessions(user_id, device_name).await
    }

    /// All sessions for a user, newest first, revoked ones included.
    pub async fn list_sessions(&self, user_id: UserId) -> AuthResult<Vec<Session>> {
        self.store.list_sessions(user_id).await
    }
}
