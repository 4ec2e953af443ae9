use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts},
};
use std::convert::Infallible;
use tower_cookies::Cookies;

use crate::{
    error::AppError,
    models::audit::ClientInfo,
    services::session::Session,
    state::AppState,
};

/// Loads the caller's session once per request.
///
/// The first extraction reads the session cookie and asks the
/// `SessionManager` for the record; later extractions in the same request
/// (guards, handler) reuse the handle stored in the request extensions.
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(session.clone());
        }

        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(msg.to_string()))?;

        let token = cookies
            .get(&state.config.session_cookie_name)
            .map(|cookie| cookie.value().to_string());

        let session = state.sessions.start(token.as_deref()).await?;
        parts.extensions.insert(session.clone());
        Ok(session)
    }
}

/// Extracts the peer IP from the connection info.
///
/// # Returns
///
/// The IP address as a string, or `"Unknown"` if not found.
fn extract_real_ip(parts: &Parts) -> String {
    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| ClientInfo::UNKNOWN.to_string())
}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .unwrap_or(ClientInfo::UNKNOWN);

        Ok(ClientInfo::new(extract_real_ip(parts), user_agent))
    }
}
