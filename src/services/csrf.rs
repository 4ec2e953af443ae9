use crate::{
    crypto::token::{generate_token, tokens_match},
    error::Result,
    services::session::{Session, SessionManager},
};

/// Issues and checks the per-session anti-forgery token.
#[derive(Clone)]
pub struct CsrfTokenManager {
    sessions: SessionManager,
}

impl CsrfTokenManager {
    pub fn new(sessions: SessionManager) -> Self {
        Self { sessions }
    }

    /// Returns the session's token, generating and storing one on first use.
    ///
    /// Repeated calls return the same token until the session is destroyed.
    /// A session without a record gets one (and a session token) so the
    /// CSRF token survives to the next request.
    pub async fn issue(&self, session: &mut Session) -> Result<String> {
        if let Some(token) = session.csrf_token() {
            return Ok(token.to_string());
        }

        let token = generate_token();
        session.set_csrf_token(token.clone());
        self.sessions.persist(session).await?;
        tracing::debug!("🔐 CSRF token issued");
        Ok(token)
    }

    /// True iff the session holds a token and `candidate` equals it.
    pub fn verify(session: &Session, candidate: &str) -> bool {
        match session.csrf_token() {
            Some(expected) => tokens_match(expected, candidate),
            None => false,
        }
    }
}
