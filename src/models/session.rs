use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::user::Role;

/// The authenticated identity held by a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// The ID of the user this session belongs to.
    pub user_id: i32,
    /// The user's role identifier.
    pub role_id: i32,
    /// The user's display name.
    pub display_name: String,
    /// The user's email address.
    pub email: String,
}

impl SessionUser {
    /// The user's role.
    pub fn role(&self) -> Role {
        Role::from_id(self.role_id)
    }
}

/// What the session store persists under a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Present once a login has succeeded.
    pub user: Option<SessionUser>,
    /// Anti-forgery token, generated on first use.
    pub csrf_token: Option<String>,
    /// When the record was first written; drives the absolute timeout.
    pub created_at: DateTime<Utc>,
}
