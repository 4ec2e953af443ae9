use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::views;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection pool error.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// A Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// An I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A column was missing or had an unexpected type.
    #[error("Missing data: {0}")]
    MissingData(String),

    /// Session state could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A backing store refused the operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No authenticated session.
    #[error("Authentication required")]
    Unauthorized,

    /// The anti-forgery token was missing or did not match.
    #[error("CSRF verification failed: {0}")]
    CsrfRejected(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Whether this error came from a backing store (credentials, sessions, audit).
    pub fn is_storage_fault(&self) -> bool {
        matches!(
            self,
            AppError::Database(_)
                | AppError::Pool(_)
                | AppError::Redis(_)
                | AppError::Io(_)
                | AppError::MissingData(_)
                | AppError::Serialization(_)
                | AppError::Unavailable(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthorized => {
                tracing::debug!("Unauthenticated request, redirecting to login");
                return Redirect::to("/auth/login").into_response();
            }

            AppError::Validation(ref msg) => {
                tracing::debug!("Validation error: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }

            AppError::CsrfRejected(ref msg) => {
                tracing::warn!("CSRF rejected: {}", msg);
                (
                    StatusCode::FORBIDDEN,
                    "Your form has expired. Please reload the page and try again.".to_string(),
                )
            }

            ref e if e.is_storage_fault() => {
                tracing::error!("Storage fault: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again.".to_string(),
                )
            }

            ref e => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again.".to_string(),
                )
            }
        };

        (status, Html(views::error_page(&message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_faults_are_classified() {
        assert!(AppError::Unavailable("down".into()).is_storage_fault());
        assert!(AppError::MissingData("email".into()).is_storage_fault());
        assert!(!AppError::Validation("bad".into()).is_storage_fault());
        assert!(!AppError::Unauthorized.is_storage_fault());
    }

    #[test]
    fn storage_detail_never_reaches_the_body() {
        let response = AppError::Unavailable("relation users does not exist".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unauthorized_redirects_to_login() {
        let response = AppError::Unauthorized.into_response();
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()["location"], "/auth/login");
    }
}
