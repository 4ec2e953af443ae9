use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_cookies::CookieManagerLayer;
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    handlers::{auth, dashboard},
    middleware_layer::{self, rate_limit::throttle_login},
    state::AppState,
};

/// Builds the application router.
///
/// `/admin/*` requires an administrator, `/customer/*` any logged-in user.
/// Both areas and `POST /auth/logout` verify the CSRF token on
/// state-changing requests. Unmatched paths fall through to the static
/// directory.
pub fn router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/dashboard", get(dashboard::admin_dashboard))
        .fallback(dashboard::page_not_found)
        .layer(from_fn_with_state(
            state.clone(),
            middleware_layer::csrf::verify_csrf,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_admin,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_session,
        ));

    let customer_routes = Router::new()
        .route("/dashboard", get(dashboard::customer_dashboard))
        .fallback(dashboard::page_not_found)
        .layer(from_fn_with_state(
            state.clone(),
            middleware_layer::csrf::verify_csrf,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_session,
        ));

    let logout = get(auth::logout)
        .post(auth::logout)
        .layer(from_fn_with_state(
            state.clone(),
            middleware_layer::csrf::verify_csrf,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_session,
        ));

    let login = get(auth::login_page).merge(throttle_login(
        post(auth::login),
        state.config.login_rate_limit,
    ));

    Router::new()
        .route("/", get(dashboard::home))
        .route("/auth/login", login)
        .route("/auth/logout", logout)
        .nest("/admin", admin_routes)
        .nest("/customer", customer_routes)
        .fallback_service(ServeDir::new(&state.config.static_dir))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false))
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
