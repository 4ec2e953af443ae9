use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of an authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginStatus {
    Success,
    Failure,
}

impl LoginStatus {
    /// The value stored in the `status` column.
    pub fn as_str(self) -> &'static str {
        match self {
            LoginStatus::Success => "Success",
            LoginStatus::Failure => "Failure",
        }
    }
}

/// Network origin of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    /// Peer IP address, or `"Unknown"`.
    pub ip: String,
    /// `User-Agent` header, or `"Unknown"`.
    pub user_agent: String,
}

impl ClientInfo {
    pub const UNKNOWN: &'static str = "Unknown";

    pub fn new(ip: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            user_agent: user_agent.into(),
        }
    }

    pub fn unknown() -> Self {
        Self::new(Self::UNKNOWN, Self::UNKNOWN)
    }
}

/// A login attempt about to be appended.
#[derive(Debug, Clone)]
pub struct NewLoginLog {
    pub user_id: Option<i32>,
    pub status: LoginStatus,
    pub ip_address: String,
    pub user_agent: String,
}

/// An action about to be appended to the audit log.
#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub user_id: i32,
    pub action: String,
    pub ip_address: String,
}

/// A stored login attempt.
#[derive(Debug, Clone)]
pub struct LoginLogEntry {
    pub user_id: Option<i32>,
    pub status: LoginStatus,
    pub ip_address: String,
    pub user_agent: String,
    pub logged_at: DateTime<Utc>,
}

/// A stored audit log entry.
#[derive(Debug, Clone)]
pub struct AuditLogEntry {
    pub user_id: i32,
    pub action: String,
    pub ip_address: String,
    pub logged_at: DateTime<Utc>,
}
