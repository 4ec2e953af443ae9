use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Where credentials, sessions and audit records live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL for users and audit logs, Redis for sessions.
    Postgres,
    /// Process-local maps seeded with the demo accounts.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => anyhow::bail!("unknown STORAGE_BACKEND '{}' (expected postgres or memory)", other),
        }
    }
}

/// Login throttling parameters, applied per peer IP.
#[derive(Clone, Copy, Debug)]
pub struct LoginRateLimit {
    /// Seconds needed to replenish one attempt.
    pub refill_seconds: u64,
    /// Attempts allowed in a burst.
    pub burst: u32,
}

/// The application's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The storage backend.
    pub storage_backend: StorageBackend,
    /// The URL of the PostgreSQL database.
    pub database_url: Option<String>,
    /// The most PostgreSQL connections kept open at once.
    pub database_pool_size: usize,
    /// The URL of the Redis server.
    pub redis_url: String,
    /// The address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Whether cookies carry the `Secure` attribute.
    pub secure_cookies: bool,
    /// The name of the session cookie.
    pub session_cookie_name: String,
    /// How long a session survives without requests.
    pub session_idle_timeout: Duration,
    /// How long a session survives after login, regardless of activity.
    pub session_absolute_timeout: Duration,
    /// Login throttling; `None` disables it.
    pub login_rate_limit: Option<LoginRateLimit>,
    /// Directory served for unmatched paths.
    pub static_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_backend: StorageBackend::Memory,
            database_url: None,
            database_pool_size: 16,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            secure_cookies: false,
            session_cookie_name: "crm_session".to_string(),
            session_idle_timeout: Duration::from_secs(30 * 60),
            session_absolute_timeout: Duration::from_secs(8 * 3600),
            login_rate_limit: None,
            static_dir: PathBuf::from("public"),
        }
    }
}

/// Reads `key` and parses it, falling back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}", key)),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let storage_backend: StorageBackend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse()?;

        let database_url = match storage_backend {
            StorageBackend::Postgres => {
                Some(env::var("DATABASE_URL").context("DATABASE_URL must be set")?)
            }
            StorageBackend::Memory => env::var("DATABASE_URL").ok(),
        };

        let is_production = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            == "production";

        let idle_minutes: u64 = env_or("SESSION_IDLE_MINUTES", 30)?;
        let absolute_hours: u64 = env_or("SESSION_ABSOLUTE_HOURS", 8)?;
        if idle_minutes == 0 || absolute_hours == 0 {
            anyhow::bail!("SESSION_IDLE_MINUTES and SESSION_ABSOLUTE_HOURS must be positive");
        }

        let refill_seconds: u64 = env_or("LOGIN_RATE_REFILL_SECONDS", 2)?;
        let burst: u32 = env_or("LOGIN_RATE_BURST", 10)?;
        let login_rate_limit = (refill_seconds > 0 && burst > 0).then_some(LoginRateLimit {
            refill_seconds,
            burst,
        });

        Ok(Self {
            storage_backend,
            database_url,
            database_pool_size: env_or("DATABASE_POOL_SIZE", defaults.database_pool_size)?,
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            bind_addr: env_or("BIND_ADDR", defaults.bind_addr)?,
            secure_cookies: is_production,
            session_cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or(defaults.session_cookie_name),
            session_idle_timeout: Duration::from_secs(idle_minutes * 60),
            session_absolute_timeout: Duration::from_secs(absolute_hours * 3600),
            login_rate_limit,
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
        })
    }

    /// Whether the login page may show the seeded demo accounts.
    pub fn shows_demo_credentials(&self) -> bool {
        self.storage_backend == StorageBackend::Memory
    }
}
