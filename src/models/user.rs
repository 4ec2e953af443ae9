use std::fmt;

use serde::{Deserialize, Serialize};

/// Role identifier reserved for administrators.
pub const ADMIN_ROLE_ID: i32 = 1;

/// Authorization class of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Role 1.
    Administrator,
    /// Every other assigned role.
    Customer,
}

impl Role {
    /// Maps a stored role identifier to its role.
    pub fn from_id(role_id: i32) -> Self {
        if role_id == ADMIN_ROLE_ID {
            Role::Administrator
        } else {
            Role::Customer
        }
    }

    /// The page a user of this role lands on after login.
    pub fn landing_page(self) -> &'static str {
        match self {
            Role::Administrator => "/admin/dashboard",
            Role::Customer => "/customer/dashboard",
        }
    }
}

/// Represents a user in the system.
#[derive(Clone)]
pub struct User {
    /// The unique identifier for the user.
    pub id: i32,
    /// The user's email address, used as the login key.
    pub email: String,
    /// The user's hashed password (PHC string). `None` means the account
    /// cannot log in.
    pub(crate) password_hash: Option<String>,
    /// The user's role identifier.
    pub role_id: i32,
    /// The role's name, if the role row exists.
    pub role_name: Option<String>,
    /// The user's display name.
    pub display_name: String,
}

impl User {
    /// Creates a user record.
    pub fn new(
        id: i32,
        email: impl Into<String>,
        password_hash: Option<String>,
        role_id: i32,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            password_hash,
            role_id,
            role_name: None,
            display_name: display_name.into(),
        }
    }

    /// The user's role.
    pub fn role(&self) -> Role {
        Role::from_id(self.role_id)
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[redacted]")
            .field("role_id", &self.role_id)
            .field("role_name", &self.role_name)
            .field("display_name", &self.display_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_role_one_is_administrator() {
        assert_eq!(Role::from_id(1), Role::Administrator);
        assert_eq!(Role::from_id(2), Role::Customer);
        assert_eq!(Role::from_id(0), Role::Customer);
        assert_eq!(Role::from_id(-1), Role::Customer);
    }

    #[test]
    fn landing_pages_follow_role() {
        assert_eq!(Role::Administrator.landing_page(), "/admin/dashboard");
        assert_eq!(Role::Customer.landing_page(), "/customer/dashboard");
    }

    #[test]
    fn debug_output_hides_the_hash() {
        let user = User::new(7, "a@b.co", Some("$argon2id$secret".into()), 2, "A");
        let rendered = format!("{:?}", user);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("[redacted]"));
    }
}
