use std::sync::Arc;

use redis::aio::ConnectionManager;

use crate::config::{Config, StorageBackend};
use crate::error::{AppError, Result};
use crate::repositories::{
    audit::PgAuditStore,
    dashboard::PgDashboardStore,
    memory::MemoryStore,
    session::RedisSessionStore,
    traits::{AuditStore, CredentialStore, DashboardStore, SessionStore},
    user::PgCredentialStore,
};
use crate::services::{audit::AuditRecorder, csrf::CsrfTokenManager, session::SessionManager};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Config,
    /// Where user records are looked up.
    pub credentials: Arc<dyn CredentialStore>,
    /// Session lifecycle.
    pub sessions: SessionManager,
    /// Audit trail writer.
    pub audit: AuditRecorder,
    /// Anti-forgery tokens.
    pub csrf: CsrfTokenManager,
    /// Admin dashboard counters.
    pub dashboard: Arc<dyn DashboardStore>,
}

impl AppState {
    /// Creates a new `AppState` for the configured backend.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        match config.storage_backend {
            StorageBackend::Postgres => {
                let database_url = config
                    .database_url
                    .as_deref()
                    .ok_or_else(|| AppError::Internal("DATABASE_URL must be set".to_string()))?;
                let db = crate::db::create_pool(database_url, config.database_pool_size)?;
                tracing::info!("✅ PostgreSQL Pool initialized with deadpool-postgres");

                let redis_client = redis::Client::open(config.redis_url.as_str())?;
                let redis = ConnectionManager::new(redis_client).await?;
                tracing::info!("✅ Redis Connection Manager initialized (pooled)");

                Ok(Self::from_stores(
                    config.clone(),
                    Arc::new(PgCredentialStore::new(db.clone())),
                    Arc::new(RedisSessionStore::new(redis)),
                    Arc::new(PgAuditStore::new(db.clone())),
                    Arc::new(PgDashboardStore::new(db)),
                ))
            }
            StorageBackend::Memory => {
                tracing::warn!("⚠️ Using in-memory storage; data is lost on restart");
                let store = Arc::new(MemoryStore::with_demo_users()?);
                Ok(Self::in_memory(config.clone(), store))
            }
        }
    }

    /// Builds a state where every store is the given in-memory backend.
    pub fn in_memory(config: Config, store: Arc<MemoryStore>) -> Self {
        Self::from_stores(config, store.clone(), store.clone(), store.clone(), store)
    }

    fn from_stores(
        config: Config,
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        audit: Arc<dyn AuditStore>,
        dashboard: Arc<dyn DashboardStore>,
    ) -> Self {
        let sessions = SessionManager::new(
            sessions,
            config.session_idle_timeout,
            config.session_absolute_timeout,
        );

        AppState {
            csrf: CsrfTokenManager::new(sessions.clone()),
            audit: AuditRecorder::new(audit),
            sessions,
            credentials,
            dashboard,
            config,
        }
    }
}
