use crate::{models::user::Role, services::session::Session};

/// Where the login surface lives.
pub const LOGIN_PATH: &str = "/auth/login";

/// Result of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Redirect(&'static str),
}

/// Requires a logged-in user.
pub fn require_session(session: &Session) -> Access {
    if session.is_active() {
        Access::Granted
    } else {
        Access::Redirect(LOGIN_PATH)
    }
}

/// Requires a logged-in user of `role`. A user of another role is sent to
/// their own landing page.
pub fn require_role(session: &Session, role: Role) -> Access {
    match session.role() {
        None => Access::Redirect(LOGIN_PATH),
        Some(actual) if actual == role => Access::Granted,
        Some(actual) => Access::Redirect(actual.landing_page()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::SessionUser;
    use crate::repositories::memory::MemoryStore;
    use crate::services::session::SessionManager;
    use std::sync::Arc;
    use std::time::Duration;

    async fn logged_in(role_id: i32) -> Session {
        let sessions = SessionManager::new(
            Arc::new(MemoryStore::new()),
            Duration::from_secs(60),
            Duration::from_secs(3600),
        );
        let mut session = Session::default();
        sessions
            .establish(
                &mut session,
                SessionUser {
                    user_id: 9,
                    role_id,
                    display_name: "Someone".into(),
                    email: "someone@example.com".into(),
                },
            )
            .await
            .unwrap();
        session
    }

    #[tokio::test]
    async fn anonymous_callers_go_to_login() {
        let session = Session::default();
        assert_eq!(require_session(&session), Access::Redirect("/auth/login"));
        assert_eq!(require_role(&session, Role::Administrator), Access::Redirect("/auth/login"));
    }

    #[tokio::test]
    async fn customers_are_sent_home_from_admin_pages() {
        let session = logged_in(2).await;
        assert_eq!(require_session(&session), Access::Granted);
        assert_eq!(
            require_role(&session, Role::Administrator),
            Access::Redirect("/customer/dashboard")
        );
    }

    #[tokio::test]
    async fn administrators_pass_both_checks() {
        let session = logged_in(1).await;
        assert_eq!(require_session(&session), Access::Granted);
        assert_eq!(require_role(&session, Role::Administrator), Access::Granted);
        assert_eq!(require_role(&session, Role::Customer), Access::Redirect("/admin/dashboard"));
    }
}
