use axum::{extract::State, http::StatusCode, response::{Html, IntoResponse}};
use tower_cookies::Cookies;

use crate::{
    error::Result,
    handlers::{auth::sync_session_cookie, page::Page},
    models::user::Role,
    services::{dashboard as dashboard_service, guard::LOGIN_PATH, session::Session},
    state::AppState,
    views,
};

/// Sends the caller to wherever they belong.
pub async fn home(session: Session) -> Page {
    Page::Redirect(session.role().map_or(LOGIN_PATH, Role::landing_page))
}

/// The administrator overview.
///
/// Each counter that cannot be loaded renders as zero.
pub async fn admin_dashboard(
    State(state): State<AppState>,
    cookies: Cookies,
    mut session: Session,
) -> Result<Page> {
    let Some(user) = session.user().cloned() else {
        return Ok(Page::Redirect(LOGIN_PATH));
    };

    let issued = state.csrf.issue(&mut session).await;
    sync_session_cookie(&cookies, &state.config, &session);
    let csrf_token = issued?;

    let counts = dashboard_service::load_counts(state.dashboard.as_ref()).await;

    Ok(Page::render(views::admin_dashboard(&user, &counts, &csrf_token)))
}

pub async fn customer_dashboard(
    State(state): State<AppState>,
    cookies: Cookies,
    mut session: Session,
) -> Result<Page> {
    let Some(user) = session.user().cloned() else {
        return Ok(Page::Redirect(LOGIN_PATH));
    };

    let issued = state.csrf.issue(&mut session).await;
    sync_session_cookie(&cookies, &state.config, &session);
    let csrf_token = issued?;

    Ok(Page::render(views::customer_dashboard(&user, &csrf_token)))
}

/// Fallback for unknown paths inside a guarded area.
pub async fn page_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(views::not_found_page()))
}
