use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    models::user::Role,
    services::{
        guard::{self, Access},
        session::Session,
    },
};

async fn enforce(access: Access, request: Request<Body>, next: Next) -> Response {
    match access {
        Access::Granted => next.run(request).await,
        Access::Redirect(path) => {
            tracing::debug!("🔒 {} redirected to {}", request.uri().path(), path);
            Redirect::to(path).into_response()
        }
    }
}

/// A middleware that requires a logged-in user.
///
/// # Arguments
///
/// * `session` - The caller's session.
/// * `request` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// The downstream response, or a redirect to the login page.
pub async fn require_session(session: Session, request: Request<Body>, next: Next) -> Response {
    enforce(guard::require_session(&session), request, next).await
}

/// A middleware that requires an administrator. Other users are redirected
/// to their own landing page.
pub async fn require_admin(session: Session, request: Request<Body>, next: Next) -> Response {
    enforce(guard::require_role(&session, Role::Administrator), request, next).await
}
