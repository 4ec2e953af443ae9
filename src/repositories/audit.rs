use async_trait::async_trait;
use deadpool_postgres::Pool;

use crate::{
    error::Result,
    models::audit::{NewAuditLog, NewLoginLog},
    repositories::traits::AuditStore,
};

const INSERT_LOGIN_LOG: &str = r#"
    INSERT INTO login_logs (user_id, status, ip_address, user_agent)
    VALUES ($1, $2, $3, $4)
"#;

const INSERT_AUDIT_LOG: &str = r#"
    INSERT INTO audit_log (user_id, action, ip_address)
    VALUES ($1, $2, $3)
"#;

/// Audit storage on the `login_logs` and `audit_log` tables. Timestamps
/// come from the column defaults so they reflect write time.
#[derive(Clone)]
pub struct PgAuditStore {
    pool: Pool,
}

impl PgAuditStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for PgAuditStore {
    async fn insert_login(&self, entry: NewLoginLog) -> Result<()> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(INSERT_LOGIN_LOG).await?;
        client
            .execute(
                &statement,
                &[
                    &entry.user_id,
                    &entry.status.as_str(),
                    &entry.ip_address,
                    &entry.user_agent,
                ],
            )
            .await?;
        Ok(())
    }

    async fn insert_action(&self, entry: NewAuditLog) -> Result<()> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(INSERT_AUDIT_LOG).await?;
        client
            .execute(&statement, &[&entry.user_id, &entry.action, &entry.ip_address])
            .await?;
        Ok(())
    }
}
