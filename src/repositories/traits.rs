use std::time::Duration;

use async_trait::async_trait;

use crate::{
    error::Result,
    models::{
        audit::{NewAuditLog, NewLoginLog},
        dashboard::Counter,
        session::SessionRecord,
        user::User,
    },
};

/// Read-only access to user records.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Finds the user whose email matches, ignoring case.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}

/// Server-side session persistence keyed by opaque token.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Loads a live record. Expired records are reported as absent.
    async fn load(&self, token: &str) -> Result<Option<SessionRecord>>;

    /// Writes a record that expires after `ttl` without activity.
    async fn save(&self, token: &str, record: &SessionRecord, ttl: Duration) -> Result<()>;

    /// Overwrites a record only if it still exists, resetting its expiry.
    /// Returns `false` when there was nothing to overwrite.
    async fn update(&self, token: &str, record: &SessionRecord, ttl: Duration) -> Result<bool>;

    /// Pushes the idle expiry of an existing record out to `ttl`.
    async fn touch(&self, token: &str, ttl: Duration) -> Result<()>;

    /// Removes a record. Removing an unknown token is not an error.
    async fn delete(&self, token: &str) -> Result<()>;
}

/// Append-only storage for the audit trail.
#[async_trait]
pub trait AuditStore: Send + Sync + 'static {
    /// Appends one login attempt.
    async fn insert_login(&self, entry: NewLoginLog) -> Result<()>;

    /// Appends one audit log entry.
    async fn insert_action(&self, entry: NewAuditLog) -> Result<()>;
}

/// Headline counters for the admin dashboard.
#[async_trait]
pub trait DashboardStore: Send + Sync + 'static {
    /// Current value of one counter.
    async fn count(&self, counter: Counter) -> Result<i64>;
}
