//! Mail dispatch collaborator.
//!
//! The engine only ever needs one operation from a mail system: deliver a
//! short verification message to one address and report success. The
//! transport itself (SMTP relay, provider API) lives outside this crate.

use async_trait::async_trait;

/// Outbound mail delivery, used for email one-time codes.
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Deliver a message. Returns `false` on any delivery failure; the
    /// engine treats a `false` as "no code was issued".
    async fn send(&self, to: &str, subject: &str, body: &str) -> bool;
}

/// Mailer that drops every message and reports failure. Stands in when
/// no transport has been configured.
#[derive(Debug, Default)]
pub struct NullMailer;

#[async_trait]
impl MailSender for NullMailer {
    async fn send(&self, to: &str, _subject: &str, _body: &str) -> bool {
        log::warn!("No mail transport configured, dropping message to {to}");
        false
    }
}
