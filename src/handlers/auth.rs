use axum::{Form, extract::State};
use tower_cookies::cookie::{SameSite, time::Duration};
use tower_cookies::{Cookie, Cookies};

use crate::{
    config::Config,
    error::{AppError, Result},
    handlers::page::Page,
    models::audit::ClientInfo,
    services::{
        auth::{self as auth_service, LoginOutcome, TRY_AGAIN},
        guard::LOGIN_PATH,
        session::Session,
    },
    state::AppState,
    validation::auth::{LoginForm, normalize_email},
    views,
};

/// Creates the session cookie with the attributes every session cookie
/// carries.
fn create_session_cookie(config: &Config, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(config.session_cookie_name.clone(), value);

    cookie.set_http_only(true);
    if config.secure_cookies {
        cookie.set_secure(true);
    }
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");

    let max_age = i64::try_from(config.session_absolute_timeout.as_secs()).unwrap_or(i64::MAX);
    cookie.set_max_age(Duration::seconds(max_age));

    cookie
}

/// Mirrors the handle's token onto the client after a mutation.
///
/// Nothing is sent unless the token changed. A handle without a token
/// clears the cookie.
pub(crate) fn sync_session_cookie(cookies: &Cookies, config: &Config, session: &Session) {
    if !session.token_changed() {
        return;
    }

    match session.token() {
        Some(token) => cookies.add(create_session_cookie(config, token.to_string())),
        None => cookies.remove(create_session_cookie(config, String::new())),
    }
}

/// The form shown when the caller's session could not be loaded.
fn session_unavailable(state: &AppState, error: AppError, email: &str) -> Page {
    tracing::error!("Login error: could not load session: {}", error);
    Page::render(views::login_page(
        Some(TRY_AGAIN),
        email,
        state.config.shows_demo_credentials(),
    ))
}

/// Renders the login form, or sends a logged-in user to their dashboard.
pub async fn login_page(
    State(state): State<AppState>,
    cookies: Cookies,
    session: std::result::Result<Session, AppError>,
) -> Page {
    let session = match session {
        Ok(session) => session,
        Err(e) => return session_unavailable(&state, e, ""),
    };

    // A stale cookie is dropped even when only the form is shown.
    sync_session_cookie(&cookies, &state.config, &session);

    match session.role() {
        Some(role) => Page::Redirect(role.landing_page()),
        None => Page::render(views::login_page(
            None,
            "",
            state.config.shows_demo_credentials(),
        )),
    }
}

/// Handles a login submission.
///
/// A session store that cannot be reached leaves the caller on the form
/// with the generic retry message.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `cookies` - The cookie jar.
/// * `client` - The caller's address and user agent.
/// * `session` - The caller's session, if it could be loaded.
/// * `form` - The submitted email and password.
///
/// # Returns
///
/// A redirect to the user's dashboard, or the form re-rendered with a
/// message.
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    client: ClientInfo,
    session: std::result::Result<Session, AppError>,
    Form(form): Form<LoginForm>,
) -> Page {
    let mut session = match session {
        Ok(session) => session,
        Err(e) => return session_unavailable(&state, e, normalize_email(&form.email)),
    };

    if let Some(role) = session.role() {
        return Page::Redirect(role.landing_page());
    }

    tracing::info!("🔐 Login attempt from {}", client.ip);

    let outcome = auth_service::login(&state, &mut session, &client, &form.email, &form.password).await;
    sync_session_cookie(&cookies, &state.config, &session);

    match outcome {
        LoginOutcome::Success(user) => Page::Redirect(user.role().landing_page()),
        failed => Page::render(views::login_page(
            failed.message(),
            normalize_email(&form.email),
            state.config.shows_demo_credentials(),
        )),
    }
}

/// Logs the caller out and returns them to the login form.
///
/// Mounted behind the session guard for GET and, with CSRF verification,
/// for POST.
pub async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
    client: ClientInfo,
    mut session: Session,
) -> Result<Page> {
    auth_service::logout(&state, &mut session, &client).await?;
    sync_session_cookie(&cookies, &state.config, &session);

    Ok(Page::Redirect(LOGIN_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    #[test]
    fn session_cookie_attributes() {
        let config = Config {
            secure_cookies: true,
            session_absolute_timeout: StdDuration::from_secs(3600),
            ..Config::default()
        };
        let cookie = create_session_cookie(&config, "abc".into());

        assert_eq!(cookie.name(), "crm_session");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(3600)));
    }

    #[test]
    fn development_cookies_are_not_secure() {
        let cookie = create_session_cookie(&Config::default(), "abc".into());
        assert_eq!(cookie.secure(), None);
    }
}
