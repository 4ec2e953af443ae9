use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    crypto::password::hash_password,
    error::{AppError, Result},
    models::{
        audit::{AuditLogEntry, LoginLogEntry, NewAuditLog, NewLoginLog},
        dashboard::Counter,
        session::SessionRecord,
        user::{Role, User},
    },
    repositories::traits::{AuditStore, CredentialStore, DashboardStore, SessionStore},
};

/// Process-local backend implementing every store seam. Used by
/// `STORAGE_BACKEND=memory` and by the test suites.
///
/// Individual stores can be switched into a failing mode to exercise the
/// storage-fault paths.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    sessions: RwLock<HashMap<String, (SessionRecord, Instant)>>,
    login_logs: RwLock<Vec<LoginLogEntry>>,
    audit_logs: RwLock<Vec<AuditLogEntry>>,
    fail_credentials: AtomicBool,
    fail_sessions: AtomicBool,
    fail_audit: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the two demo accounts.
    pub fn with_demo_users() -> Result<Self> {
        let users = vec![
            User::new(1, "admin@securecrm.com", Some(hash_password("admin123")?), 1, "Admin User"),
            User::new(2, "john@example.com", Some(hash_password("customer123")?), 2, "John Doe"),
        ];
        tracing::info!("✅ In-memory store seeded with {} demo users", users.len());

        Ok(Self {
            users: RwLock::new(users),
            ..Self::default()
        })
    }

    /// Adds a user record.
    pub async fn insert_user(&self, user: User) {
        self.users.write().await.push(user);
    }

    /// All login attempts recorded so far, oldest first.
    pub async fn login_logs(&self) -> Vec<LoginLogEntry> {
        self.login_logs.read().await.clone()
    }

    /// All audit log entries recorded so far, oldest first.
    pub async fn audit_logs(&self) -> Vec<AuditLogEntry> {
        self.audit_logs.read().await.clone()
    }

    /// Number of live session records.
    pub async fn session_count(&self) -> usize {
        let now = Instant::now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|(_, deadline)| *deadline > now)
            .count()
    }

    pub fn set_fail_credentials(&self, fail: bool) {
        self.fail_credentials.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_sessions(&self, fail: bool) {
        self.fail_sessions.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_audit(&self, fail: bool) {
        self.fail_audit.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, store: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(AppError::Unavailable(format!("{} store is offline", store)));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Self::check(&self.fail_credentials, "credential")?;
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self, token: &str) -> Result<Option<SessionRecord>> {
        Self::check(&self.fail_sessions, "session")?;
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(token)
            .filter(|(_, deadline)| *deadline > Instant::now())
            .map(|(record, _)| record.clone()))
    }

    async fn save(&self, token: &str, record: &SessionRecord, ttl: Duration) -> Result<()> {
        Self::check(&self.fail_sessions, "session")?;
        self.sessions
            .write()
            .await
            .insert(token.to_string(), (record.clone(), Instant::now() + ttl));
        Ok(())
    }

    async fn update(&self, token: &str, record: &SessionRecord, ttl: Duration) -> Result<bool> {
        Self::check(&self.fail_sessions, "session")?;
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(token) {
            Some(entry) if entry.1 > Instant::now() => {
                *entry = (record.clone(), Instant::now() + ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn touch(&self, token: &str, ttl: Duration) -> Result<()> {
        Self::check(&self.fail_sessions, "session")?;
        if let Some((_, deadline)) = self.sessions.write().await.get_mut(token) {
            *deadline = Instant::now() + ttl;
        }
        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<()> {
        Self::check(&self.fail_sessions, "session")?;
        self.sessions.write().await.remove(token);
        Ok(())
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn insert_login(&self, entry: NewLoginLog) -> Result<()> {
        Self::check(&self.fail_audit, "audit")?;
        self.login_logs.write().await.push(LoginLogEntry {
            user_id: entry.user_id,
            status: entry.status,
            ip_address: entry.ip_address,
            user_agent: entry.user_agent,
            logged_at: Utc::now(),
        });
        Ok(())
    }

    async fn insert_action(&self, entry: NewAuditLog) -> Result<()> {
        Self::check(&self.fail_audit, "audit")?;
        self.audit_logs.write().await.push(AuditLogEntry {
            user_id: entry.user_id,
            action: entry.action,
            ip_address: entry.ip_address,
            logged_at: Utc::now(),
        });
        Ok(())
    }
}

#[async_trait]
impl DashboardStore for MemoryStore {
    async fn count(&self, counter: Counter) -> Result<i64> {
        Self::check(&self.fail_credentials, "credential")?;
        let users = self.users.read().await;
        let value = match counter {
            Counter::Users => users.len(),
            Counter::Customers => users.iter().filter(|user| user.role() == Role::Customer).count(),
            Counter::Orders => 0,
        };
        Ok(value as i64)
    }
}
