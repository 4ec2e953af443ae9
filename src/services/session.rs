use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::{
    crypto::token::generate_token,
    error::{AppError, Result},
    models::{
        session::{SessionRecord, SessionUser},
        user::Role,
    },
    repositories::traits::SessionStore,
};

/// The per-request view of the caller's session.
///
/// Built once at request entry by [`SessionManager::start`] and passed
/// explicitly to whatever needs it. Mutations go through the manager so the
/// store and the handle never disagree.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<String>,
    record: Option<SessionRecord>,
    token_changed: bool,
}

impl Session {
    /// The opaque token the client holds, if a record exists.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// True iff a user is logged in on this session.
    pub fn is_active(&self) -> bool {
        self.user().is_some()
    }

    /// The logged-in user.
    pub fn user(&self) -> Option<&SessionUser> {
        self.record.as_ref().and_then(|record| record.user.as_ref())
    }

    /// The logged-in user's role.
    pub fn role(&self) -> Option<Role> {
        self.user().map(SessionUser::role)
    }

    /// The anti-forgery token, if one has been issued.
    pub fn csrf_token(&self) -> Option<&str> {
        self.record
            .as_ref()
            .and_then(|record| record.csrf_token.as_deref())
    }

    /// Whether the client's cookie must be rewritten (new token or cleared).
    pub fn token_changed(&self) -> bool {
        self.token_changed
    }

    pub(crate) fn set_csrf_token(&mut self, token: String) {
        self.record
            .get_or_insert_with(|| SessionRecord {
                user: None,
                csrf_token: None,
                created_at: Utc::now(),
            })
            .csrf_token = Some(token);
    }
}

/// Owns session lifecycle against a [`SessionStore`].
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    idle_timeout: Duration,
    absolute_timeout: Duration,
}

impl SessionManager {
    /// Creates a new `SessionManager`.
    ///
    /// # Arguments
    ///
    /// * `store` - Where session records live.
    /// * `idle_timeout` - Lifetime without requests.
    /// * `absolute_timeout` - Lifetime since the record was created.
    pub fn new(store: Arc<dyn SessionStore>, idle_timeout: Duration, absolute_timeout: Duration) -> Self {
        Self {
            store,
            idle_timeout,
            absolute_timeout,
        }
    }

    /// Loads the session the client's token points at.
    ///
    /// Unknown or expired tokens yield an empty handle; the stale token is
    /// dropped so a fresh one is minted if anything is stored later. Loading
    /// a live record refreshes its idle expiry.
    pub async fn start(&self, token: Option<&str>) -> Result<Session> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(Session::default());
        };

        let Some(record) = self.store.load(token).await? else {
            tracing::debug!("🔑 Session token not found or expired");
            return Ok(Session {
                token_changed: true,
                ..Session::default()
            });
        };

        let age = Utc::now().signed_duration_since(record.created_at);
        let limit = chrono::Duration::from_std(self.absolute_timeout).unwrap_or(chrono::Duration::MAX);
        if age >= limit {
            tracing::info!("⌛ Session reached its absolute lifetime, discarding");
            self.store.delete(token).await?;
            return Ok(Session {
                token_changed: true,
                ..Session::default()
            });
        }

        self.store.touch(token, self.idle_timeout).await?;

        Ok(Session {
            token: Some(token.to_string()),
            record: Some(record),
            token_changed: false,
        })
    }

    /// Logs `user` in on `session`.
    ///
    /// The prior token is invalidated and a new one minted before anything is
    /// stored, so data tied to a pre-login token is unreachable afterwards.
    /// Returns once the new record is durable.
    pub async fn establish(&self, session: &mut Session, user: SessionUser) -> Result<()> {
        if let Some(old_token) = session.token.take() {
            self.store.delete(&old_token).await?;
        }
        session.record = None;

        let token = generate_token();
        let record = SessionRecord {
            user: Some(user),
            csrf_token: None,
            created_at: Utc::now(),
        };
        self.store.save(&token, &record, self.idle_timeout).await?;

        session.token = Some(token);
        session.record = Some(record);
        session.token_changed = true;
        Ok(())
    }

    /// Writes the handle's current record.
    ///
    /// A handle without a token gets a fresh one and a new record. A handle
    /// with a token only overwrites a record that still exists; if it was
    /// destroyed or expired meanwhile the handle is cleared and the request
    /// fails as unauthenticated.
    pub(crate) async fn persist(&self, session: &mut Session) -> Result<()> {
        let Some(record) = session.record.as_ref() else {
            return Ok(());
        };

        let Some(token) = session.token.as_deref() else {
            let token = generate_token();
            self.store.save(&token, record, self.idle_timeout).await?;
            session.token = Some(token);
            session.token_changed = true;
            return Ok(());
        };

        if self.store.update(token, record, self.idle_timeout).await? {
            return Ok(());
        }

        tracing::info!("⌛ Session ended while the request was in flight");
        session.token = None;
        session.record = None;
        session.token_changed = true;
        Err(AppError::Unauthorized)
    }

    /// Clears every attribute and invalidates the token.
    pub async fn destroy(&self, session: &mut Session) -> Result<()> {
        if let Some(token) = session.token.take() {
            self.store.delete(&token).await?;
        }
        session.record = None;
        session.token_changed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::MemoryStore;

    fn manager(store: Arc<MemoryStore>) -> SessionManager {
        SessionManager::new(store, Duration::from_secs(60), Duration::from_secs(3600))
    }

    fn admin() -> SessionUser {
        SessionUser {
            user_id: 1,
            role_id: 1,
            display_name: "Admin User".into(),
            email: "admin@securecrm.com".into(),
        }
    }

    #[tokio::test]
    async fn no_token_means_inactive() {
        let sessions = manager(Arc::new(MemoryStore::new()));
        let session = sessions.start(None).await.unwrap();
        assert!(!session.is_active());
        assert!(session.token().is_none());
        assert!(!session.token_changed());
    }

    #[tokio::test]
    async fn establish_then_start_round_trips() {
        let store = Arc::new(MemoryStore::new());
        let sessions = manager(store.clone());

        let mut session = sessions.start(None).await.unwrap();
        sessions.establish(&mut session, admin()).await.unwrap();
        assert!(session.is_active());
        assert!(session.token_changed());

        let reloaded = sessions.start(session.token()).await.unwrap();
        assert_eq!(reloaded.user(), Some(&admin()));
        assert_eq!(reloaded.role(), Some(Role::Administrator));
        assert!(!reloaded.token_changed());
    }

    #[tokio::test]
    async fn establish_regenerates_a_preseeded_token() {
        let store = Arc::new(MemoryStore::new());
        let sessions = manager(store.clone());

        let mut planted = Session::default();
        planted.set_csrf_token("attacker".into());
        sessions.persist(&mut planted).await.unwrap();
        let planted_token = planted.token().unwrap().to_string();

        let mut victim = sessions.start(Some(planted_token.as_str())).await.unwrap();
        sessions.establish(&mut victim, admin()).await.unwrap();

        assert_ne!(victim.token(), Some(planted_token.as_str()));
        assert!(victim.csrf_token().is_none());
        let stale = sessions.start(Some(planted_token.as_str())).await.unwrap();
        assert!(!stale.is_active());
        assert!(stale.csrf_token().is_none());
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn destroy_invalidates_the_token() {
        let store = Arc::new(MemoryStore::new());
        let sessions = manager(store.clone());

        let mut session = Session::default();
        sessions.establish(&mut session, admin()).await.unwrap();
        let token = session.token().unwrap().to_string();

        sessions.destroy(&mut session).await.unwrap();
        assert!(!session.is_active());
        assert!(session.token().is_none());
        assert!(session.token_changed());

        assert!(!sessions.start(Some(token.as_str())).await.unwrap().is_active());
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn persist_does_not_revive_a_destroyed_session() {
        let store = Arc::new(MemoryStore::new());
        let sessions = manager(store.clone());

        let mut session = Session::default();
        sessions.establish(&mut session, admin()).await.unwrap();
        let token = session.token().unwrap().to_string();

        let mut stale = sessions.start(Some(token.as_str())).await.unwrap();
        let mut logout = sessions.start(Some(token.as_str())).await.unwrap();
        sessions.destroy(&mut logout).await.unwrap();

        stale.set_csrf_token("late".into());
        let err = sessions.persist(&mut stale).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
        assert!(!stale.is_active());
        assert!(stale.token_changed());

        assert!(!sessions.start(Some(token.as_str())).await.unwrap().is_active());
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn absolute_lifetime_is_enforced() {
        let store = Arc::new(MemoryStore::new());
        let sessions = SessionManager::new(store.clone(), Duration::from_secs(60), Duration::ZERO);

        let mut session = Session::default();
        sessions.establish(&mut session, admin()).await.unwrap();

        let reloaded = sessions.start(session.token()).await.unwrap();
        assert!(!reloaded.is_active());
        assert!(reloaded.token_changed());
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn store_faults_surface_as_errors() {
        let store = Arc::new(MemoryStore::new());
        let sessions = manager(store.clone());
        store.set_fail_sessions(true);

        let mut session = Session::default();
        let err = sessions.establish(&mut session, admin()).await.unwrap_err();
        assert!(err.is_storage_fault());
        assert!(!session.is_active());
    }
}
