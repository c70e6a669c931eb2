//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures internal errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`; client-facing bodies never leak internal detail.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::db::orders::OrderError;
use crate::db::trolley::TrolleyError;
use crate::services::auth::AuthError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Trolley operation failed.
    #[error("trolley error: {0}")]
    Trolley(#[from] TrolleyError),

    /// Order placement failed.
    #[error("order error: {0}")]
    Order(#[from] OrderError),

    /// Authentication operation failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Session store failure.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but lacks the required role.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error is the server's fault and worth alerting on.
    fn is_internal(&self) -> bool {
        match self {
            Self::Internal(_) | Self::Session(_) => true,
            Self::Repository(e) => repository_is_internal(e),
            Self::Trolley(TrolleyError::Repository(e))
            | Self::Order(OrderError::Repository(e))
            | Self::Auth(AuthError::Repository(e)) => repository_is_internal(e),
            Self::Auth(AuthError::PasswordHash) => true,
            _ => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Repository(e) => repository_status(e),
            Self::Trolley(err) => match err {
                TrolleyError::InvalidQuantity(_) => StatusCode::UNPROCESSABLE_ENTITY,
                TrolleyError::ProductNotFound | TrolleyError::NotInTrolley => {
                    StatusCode::NOT_FOUND
                }
                TrolleyError::Repository(e) => repository_status(e),
            },
            Self::Order(err) => match err {
                OrderError::ForeignAddress
                | OrderError::EmptyTrolley
                | OrderError::ProductUnavailable(_)
                | OrderError::InsufficientStock(_) => StatusCode::UNPROCESSABLE_ENTITY,
                OrderError::Conflict(_) => StatusCode::CONFLICT,
                OrderError::Repository(e) => repository_status(e),
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::AccountDisabled => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::AccountAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                AuthError::AccountNotFound => StatusCode::NOT_FOUND,
                AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
                AuthError::Repository(e) => repository_status(e),
            },
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// The client-facing message. Internal errors get a generic body.
    fn message(&self) -> String {
        if self.is_internal() {
            return "internal server error".to_owned();
        }
        match self {
            Self::Repository(RepositoryError::Unavailable)
            | Self::Trolley(TrolleyError::Repository(RepositoryError::Unavailable))
            | Self::Order(OrderError::Repository(RepositoryError::Unavailable))
            | Self::Auth(AuthError::Repository(RepositoryError::Unavailable)) => {
                "service temporarily unavailable, try again".to_owned()
            }
            Self::Trolley(err) => err.to_string(),
            Self::Order(err) => err.to_string(),
            Self::Auth(err) => err.to_string(),
            Self::Repository(err) => err.to_string(),
            other => other.to_string(),
        }
    }
}

const fn repository_status(e: &RepositoryError) -> StatusCode {
    match e {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RepositoryError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

const fn repository_is_internal(e: &RepositoryError) -> bool {
    matches!(
        e,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_)
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_internal() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "request error"
            );
        }

        let status = self.status();
        let body = Json(json!({ "error": self.message() }));

        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_validation_errors_are_unprocessable() {
        assert_eq!(
            status_of(AppError::Trolley(TrolleyError::InvalidQuantity(0))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(AppError::Order(OrderError::EmptyTrolley)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(AppError::Order(OrderError::ForeignAddress)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_conflicts_are_retryable_409() {
        assert_eq!(
            status_of(AppError::Order(OrderError::Conflict("race".to_owned()))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::AccountAlreadyExists)),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_pool_exhaustion_is_503() {
        assert_eq!(
            status_of(AppError::Repository(RepositoryError::Unavailable)),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_not_found_vs_forbidden() {
        assert_eq!(
            status_of(AppError::Trolley(TrolleyError::NotInTrolley)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Forbidden("admins only".to_owned())),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_internal_detail_not_leaked() {
        let err = AppError::Repository(RepositoryError::DataCorruption(
            "row 17 has bad price".to_owned(),
        ));
        assert_eq!(err.message(), "internal server error");
    }
}
