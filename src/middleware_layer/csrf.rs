use axum::{
    Form,
    body::{Body, to_bytes},
    extract::FromRequest,
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::{Method, Request, header};
use serde::Deserialize;

use crate::{
    error::AppError,
    services::{csrf::CsrfTokenManager, session::Session},
};

/// The header a script-driven request carries the token in.
pub const CSRF_HEADER: &str = "x-csrf-token";
/// The form field a rendered form carries the token in.
pub const CSRF_FIELD: &str = "csrf_token";

/// The largest form body inspected for a token.
const MAX_FORM_BYTES: usize = 64 * 1024;

#[derive(Deserialize)]
struct CsrfField {
    #[serde(default)]
    csrf_token: String,
}

fn is_form(req: &Request<Body>) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"))
}

/// Pulls the candidate token from the header, or else from the form body.
/// The body is buffered and handed back so the handler can still read it.
async fn extract_candidate(req: Request<Body>) -> Result<(Option<String>, Request<Body>), AppError> {
    let header_token = req
        .headers()
        .get(CSRF_HEADER)
        .map(|value| value.to_str().map(str::to_string));

    if let Some(token) = header_token {
        let token =
            token.map_err(|_| AppError::CsrfRejected("Invalid CSRF header format".to_string()))?;
        return Ok((Some(token), req));
    }

    if !is_form(&req) {
        return Ok((None, req));
    }

    let (parts, body) = req.into_parts();
    let body_bytes = to_bytes(body, MAX_FORM_BYTES)
        .await
        .map_err(|e| AppError::CsrfRejected(format!("Unreadable form body: {}", e)))?;

    let form_request = Request::builder()
        .method(Method::POST)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body_bytes.clone()))
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let candidate = Form::<CsrfField>::from_request(form_request, &())
        .await
        .ok()
        .map(|Form(field)| field.csrf_token)
        .filter(|token| !token.is_empty());

    Ok((candidate, Request::from_parts(parts, Body::from(body_bytes))))
}

/// A middleware that verifies the CSRF token on state-changing requests.
///
/// GET, HEAD and OPTIONS pass through untouched.
///
/// # Arguments
///
/// * `session` - The caller's session.
/// * `req` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// The downstream response, or a 403 page.
pub async fn verify_csrf(session: Session, req: Request<Body>, next: Next) -> Response {
    if req.method() == Method::GET
        || req.method() == Method::HEAD
        || req.method() == Method::OPTIONS
    {
        return next.run(req).await;
    }

    let (candidate, req) = match extract_candidate(req).await {
        Ok(extracted) => extracted,
        Err(e) => return e.into_response(),
    };

    let Some(candidate) = candidate else {
        return AppError::CsrfRejected("Missing CSRF token".to_string()).into_response();
    };

    if !CsrfTokenManager::verify(&session, &candidate) {
        return AppError::CsrfRejected("CSRF token mismatch".to_string()).into_response();
    }

    tracing::debug!("✅ CSRF token valid");
    next.run(req).await
}
