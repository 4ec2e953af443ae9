use std::sync::Arc;

use crate::{
    models::audit::{ClientInfo, LoginStatus, NewAuditLog, NewLoginLog},
    repositories::traits::AuditStore,
};

/// Best-effort writer for the audit trail.
///
/// Every write is a single independent append. A failed write is reported
/// on the diagnostic channel and as a `false` return, and never propagates
/// to the operation that triggered it.
#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn AuditStore>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Records an authentication attempt.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The resolved user, if any.
    /// * `status` - Whether the attempt succeeded.
    /// * `client` - Where the attempt came from.
    ///
    /// # Returns
    ///
    /// `true` if the entry was stored.
    pub async fn log_login(&self, user_id: Option<i32>, status: LoginStatus, client: &ClientInfo) -> bool {
        let entry = NewLoginLog {
            user_id,
            status,
            ip_address: client.ip.clone(),
            user_agent: client.user_agent.clone(),
        };

        match self.store.insert_login(entry).await {
            Ok(()) => {
                tracing::debug!("📝 Login {} recorded for user {:?}", status.as_str(), user_id);
                true
            }
            Err(e) => {
                tracing::error!("Audit log error (login {}): {}", status.as_str(), e);
                false
            }
        }
    }

    /// Records a security-relevant action.
    ///
    /// # Returns
    ///
    /// `true` if the entry was stored.
    pub async fn log_action(&self, user_id: i32, action: &str, client: &ClientInfo) -> bool {
        let entry = NewAuditLog {
            user_id,
            action: action.to_string(),
            ip_address: client.ip.clone(),
        };

        match self.store.insert_action(entry).await {
            Ok(()) => {
                tracing::debug!("📝 Audit: user {} - {}", user_id, action);
                true
            }
            Err(e) => {
                tracing::error!("Audit log error: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::MemoryStore;

    #[tokio::test]
    async fn writes_carry_client_metadata() {
        let store = Arc::new(MemoryStore::new());
        let audit = AuditRecorder::new(store.clone());
        let client = ClientInfo::new("10.0.0.9", "curl/8.0");

        assert!(audit.log_login(Some(3), LoginStatus::Failure, &client).await);
        assert!(audit.log_action(3, "User logged out", &client).await);

        let logins = store.login_logs().await;
        assert_eq!(logins.len(), 1);
        assert_eq!(logins[0].user_id, Some(3));
        assert_eq!(logins[0].status, LoginStatus::Failure);
        assert_eq!(logins[0].ip_address, "10.0.0.9");
        assert_eq!(logins[0].user_agent, "curl/8.0");

        let actions = store.audit_logs().await;
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action, "User logged out");
        assert_eq!(actions[0].ip_address, "10.0.0.9");
    }

    #[tokio::test]
    async fn failures_are_swallowed() {
        let store = Arc::new(MemoryStore::new());
        store.set_fail_audit(true);
        let audit = AuditRecorder::new(store.clone());

        assert!(!audit.log_login(None, LoginStatus::Success, &ClientInfo::unknown()).await);
        assert!(!audit.log_action(1, "anything", &ClientInfo::unknown()).await);
    }
}
