use zeroize::Zeroizing;

use crate::{
    crypto::password::{verify_dummy, verify_password},
    error::{AppError, Result},
    models::{
        audit::{ClientInfo, LoginStatus},
        session::SessionUser,
    },
    services::session::Session,
    state::AppState,
    validation::auth::validate_login,
};

/// Shown for both unknown emails and wrong passwords.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password.";
/// Shown when a backing store failed during login.
pub const TRY_AGAIN: &str = "Login failed. Please try again.";

/// The audit action written after a successful login.
pub const LOGIN_ACTION: &str = "User logged in successfully";
/// The audit action written on logout.
pub const LOGOUT_ACTION: &str = "User logged out";

/// The outcome of a login attempt, already classified for the page layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The session now belongs to this user.
    Success(SessionUser),
    /// Unknown email or wrong password.
    InvalidCredentials,
    /// The submission was blank or malformed.
    ValidationError(String),
    /// A store failed; the detail went to the diagnostic channel.
    StorageFault,
}

impl LoginOutcome {
    /// The message the login form shows, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            LoginOutcome::Success(_) => None,
            LoginOutcome::InvalidCredentials => Some(INVALID_CREDENTIALS),
            LoginOutcome::ValidationError(msg) => Some(msg.as_str()),
            LoginOutcome::StorageFault => Some(TRY_AGAIN),
        }
    }
}

/// Checks `password` against `hash` off the async runtime.
///
/// Without a hash the check runs against a throwaway one and fails, so an
/// unknown email costs as much as a wrong password.
async fn verify_blocking(
    password: &str,
    hash: Option<String>,
) -> std::result::Result<bool, tokio::task::JoinError> {
    let password = Zeroizing::new(password.to_string());
    tokio::task::spawn_blocking(move || match hash {
        Some(hash) => verify_password(&password, &hash),
        None => {
            verify_dummy(&password);
            false
        }
    })
    .await
}

/// Authenticates a user and logs them in on `session`.
///
/// On success the session is established (new token) before the success
/// entries are written. A wrong password for a known email writes one
/// failure entry for that user; an unknown email writes nothing.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `session` - The caller's session handle.
/// * `client` - Where the request came from.
/// * `email` - The submitted email.
/// * `password` - The submitted password.
///
/// # Returns
///
/// The classified `LoginOutcome`.
pub async fn login(
    state: &AppState,
    session: &mut Session,
    client: &ClientInfo,
    email: &str,
    password: &str,
) -> LoginOutcome {
    let email = crate::validation::auth::normalize_email(email);

    if let Err(e) = validate_login(email, password) {
        return match e {
            AppError::Validation(msg) => LoginOutcome::ValidationError(msg),
            other => {
                tracing::error!("Login error: {}", other);
                LoginOutcome::StorageFault
            }
        };
    }

    tracing::debug!("🔐 Authenticating user: {}", email);

    let user = match state.credentials.find_by_email(email).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Login error: {}", e);
            return LoginOutcome::StorageFault;
        }
    };

    let Some(user) = user else {
        let _ = verify_blocking(password, None).await;
        tracing::info!("❌ Login failed: unknown email");
        return LoginOutcome::InvalidCredentials;
    };

    if user.password_hash.is_none() {
        tracing::warn!("⚠️ User {} has no password hash", user.id);
    }
    let verified = match verify_blocking(password, user.password_hash.clone()).await {
        Ok(verified) => verified,
        Err(e) => {
            tracing::error!("Login error: password verification task failed: {}", e);
            return LoginOutcome::StorageFault;
        }
    };

    if !verified {
        tracing::info!("❌ Login failed: wrong password for user {}", user.id);
        state
            .audit
            .log_login(Some(user.id), LoginStatus::Failure, client)
            .await;
        return LoginOutcome::InvalidCredentials;
    }

    let session_user = SessionUser {
        user_id: user.id,
        role_id: user.role_id,
        display_name: user.display_name.clone(),
        email: user.email.clone(),
    };

    if let Err(e) = state.sessions.establish(session, session_user.clone()).await {
        tracing::error!("Login error: could not establish session: {}", e);
        return LoginOutcome::StorageFault;
    }

    state
        .audit
        .log_login(Some(user.id), LoginStatus::Success, client)
        .await;
    state.audit.log_action(user.id, LOGIN_ACTION, client).await;

    tracing::info!("✅ User authenticated: {}", user.id);
    LoginOutcome::Success(session_user)
}

/// Logs the caller out.
///
/// An active session gets a logout audit entry before it is destroyed; an
/// inactive one is simply cleared. The audit write never blocks the logout.
pub async fn logout(state: &AppState, session: &mut Session, client: &ClientInfo) -> Result<()> {
    if let Some(user_id) = session.user().map(|user| user.user_id) {
        state.audit.log_action(user_id, LOGOUT_ACTION, client).await;
        tracing::info!("👋 User {} logged out", user_id);
    }

    state.sessions.destroy(session).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::user::Role;
    use crate::repositories::memory::MemoryStore;
    use std::sync::Arc;

    fn setup() -> (Arc<MemoryStore>, AppState) {
        let store = Arc::new(MemoryStore::with_demo_users().unwrap());
        let state = AppState::in_memory(Config::default(), store.clone());
        (store, state)
    }

    fn client() -> ClientInfo {
        ClientInfo::new("192.0.2.10", "test-agent")
    }

    #[tokio::test]
    async fn valid_credentials_establish_a_session() {
        let (store, state) = setup();
        let mut session = Session::default();

        let outcome = login(&state, &mut session, &client(), "admin@securecrm.com", "admin123").await;

        let LoginOutcome::Success(user) = outcome.clone() else {
            panic!("expected success, got {:?}", outcome);
        };
        assert_eq!(user.role(), Role::Administrator);
        assert_eq!(user.display_name, "Admin User");
        assert!(session.is_active());
        assert_eq!(session.user(), Some(&user));

        let logins = store.login_logs().await;
        assert_eq!(logins.len(), 1);
        assert_eq!(logins[0].status, LoginStatus::Success);
        assert_eq!(logins[0].user_id, Some(1));

        let actions = store.audit_logs().await;
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action, LOGIN_ACTION);
    }

    #[tokio::test]
    async fn email_match_ignores_case_and_whitespace() {
        let (_, state) = setup();
        let mut session = Session::default();

        let outcome = login(&state, &mut session, &client(), "  John@Example.com ", "customer123").await;
        assert!(matches!(outcome, LoginOutcome::Success(ref u) if u.user_id == 2));
        assert_eq!(session.role(), Some(Role::Customer));
    }

    #[tokio::test]
    async fn unknown_email_writes_no_login_entry() {
        let (store, state) = setup();
        let mut session = Session::default();

        let outcome = login(&state, &mut session, &client(), "ghost@example.com", "admin123").await;

        assert_eq!(outcome, LoginOutcome::InvalidCredentials);
        assert_eq!(outcome.message(), Some(INVALID_CREDENTIALS));
        assert!(!session.is_active());
        assert!(store.login_logs().await.is_empty());
        assert!(store.audit_logs().await.is_empty());
    }

    #[tokio::test]
    async fn verification_without_a_hash_always_fails() {
        assert!(!verify_blocking("admin123", None).await.unwrap());
        let stored = crate::crypto::password::hash_password("admin123").unwrap();
        assert!(verify_blocking("admin123", Some(stored)).await.unwrap());
    }

    #[tokio::test]
    async fn wrong_password_writes_one_failure_for_that_user() {
        let (store, state) = setup();
        let mut session = Session::default();

        let outcome = login(&state, &mut session, &client(), "john@example.com", "wrongpass").await;

        assert_eq!(outcome, LoginOutcome::InvalidCredentials);
        assert!(!session.is_active());
        let logins = store.login_logs().await;
        assert_eq!(logins.len(), 1);
        assert_eq!(logins[0].status, LoginStatus::Failure);
        assert_eq!(logins[0].user_id, Some(2));
        assert_eq!(logins[0].ip_address, "192.0.2.10");
        assert!(store.audit_logs().await.is_empty());
    }

    #[tokio::test]
    async fn account_without_hash_cannot_log_in() {
        let (store, state) = setup();
        store
            .insert_user(crate::models::user::User::new(3, "nohash@example.com", None, 2, "No Hash"))
            .await;
        let mut session = Session::default();

        let outcome = login(&state, &mut session, &client(), "nohash@example.com", "anything").await;

        assert_eq!(outcome, LoginOutcome::InvalidCredentials);
        assert_eq!(store.login_logs().await[0].user_id, Some(3));
    }

    #[tokio::test]
    async fn malformed_input_is_a_validation_error() {
        let (store, state) = setup();
        let mut session = Session::default();

        let empty = login(&state, &mut session, &client(), "", "admin123").await;
        assert_eq!(empty, LoginOutcome::ValidationError("Please fill in all fields.".into()));

        let malformed = login(&state, &mut session, &client(), "admin@localhost", "admin123").await;
        assert_eq!(
            malformed,
            LoginOutcome::ValidationError("Please enter a valid email address.".into())
        );
        assert!(store.login_logs().await.is_empty());
    }

    #[tokio::test]
    async fn credential_store_fault_is_generic() {
        let (store, state) = setup();
        store.set_fail_credentials(true);
        let mut session = Session::default();

        let outcome = login(&state, &mut session, &client(), "admin@securecrm.com", "admin123").await;

        assert_eq!(outcome, LoginOutcome::StorageFault);
        assert_eq!(outcome.message(), Some(TRY_AGAIN));
        assert!(!session.is_active());
    }

    #[tokio::test]
    async fn session_fault_leaves_no_success_entry() {
        let (store, state) = setup();
        store.set_fail_sessions(true);
        let mut session = Session::default();

        let outcome = login(&state, &mut session, &client(), "admin@securecrm.com", "admin123").await;

        assert_eq!(outcome, LoginOutcome::StorageFault);
        assert!(!session.is_active());
        assert!(store.login_logs().await.is_empty());
    }

    #[tokio::test]
    async fn audit_fault_does_not_block_login() {
        let (store, state) = setup();
        store.set_fail_audit(true);
        let mut session = Session::default();

        let outcome = login(&state, &mut session, &client(), "admin@securecrm.com", "admin123").await;

        assert!(matches!(outcome, LoginOutcome::Success(_)));
        assert!(session.is_active());
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn every_login_gets_a_new_token() {
        let (_, state) = setup();
        let mut session = Session::default();

        login(&state, &mut session, &client(), "admin@securecrm.com", "admin123").await;
        let first = session.token().map(str::to_string);
        login(&state, &mut session, &client(), "admin@securecrm.com", "admin123").await;

        assert!(first.is_some());
        assert_ne!(session.token().map(str::to_string), first);
    }

    #[tokio::test]
    async fn logout_records_and_destroys() {
        let (store, state) = setup();
        let mut session = Session::default();
        login(&state, &mut session, &client(), "john@example.com", "customer123").await;

        logout(&state, &mut session, &client()).await.unwrap();

        assert!(!session.is_active());
        assert_eq!(store.session_count().await, 0);
        let actions = store.audit_logs().await;
        assert_eq!(actions.last().map(|a| a.action.as_str()), Some(LOGOUT_ACTION));
        assert_eq!(actions.last().map(|a| a.user_id), Some(2));
    }

    #[tokio::test]
    async fn logout_without_session_writes_nothing() {
        let (store, state) = setup();
        let mut session = Session::default();

        logout(&state, &mut session, &client()).await.unwrap();

        assert!(store.audit_logs().await.is_empty());
    }
}
