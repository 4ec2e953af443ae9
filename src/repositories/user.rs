use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::Row;

use crate::{
    error::{AppError, Result},
    models::user::User,
    repositories::traits::CredentialStore,
};

const FIND_BY_EMAIL: &str = r#"
    SELECT u.user_id, u.email, u.password_hash, u.role_id, u.user_name, r.role_name
    FROM users u
    LEFT JOIN roles r ON u.role_id = r.role_id
    WHERE LOWER(u.email) = LOWER($1)
"#;

/// A helper function to map a `tokio_postgres::Row` to a `User`.
fn row_to_user(row: &Row) -> Result<User> {
    Ok(User {
        id: row.try_get("user_id").map_err(|_| AppError::MissingData("user_id".to_string()))?,
        email: row.try_get("email").map_err(|_| AppError::MissingData("email".to_string()))?,
        password_hash: row.try_get("password_hash").map_err(|_| AppError::MissingData("password_hash".to_string()))?,
        role_id: row.try_get("role_id").map_err(|_| AppError::MissingData("role_id".to_string()))?,
        role_name: row.try_get("role_name").map_err(|_| AppError::MissingData("role_name".to_string()))?,
        display_name: row.try_get("user_name").map_err(|_| AppError::MissingData("user_name".to_string()))?,
    })
}

/// Credential Store backed by the `users` and `roles` tables.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: Pool,
}

impl PgCredentialStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(FIND_BY_EMAIL).await?;
        let row = client.query_opt(&statement, &[&email]).await?;
        row.map(|r| row_to_user(&r)).transpose()
    }
}
