use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use petparadise_auth::{AuthError, TokenError};
use petparadise_core::DomainError;
use petparadise_infra::RepositoryError;

use crate::app::services::ServiceError;

const INTERNAL: &str = "Internal server error";

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, axum::Json(json!({ "error": message.into() }))).into_response()
}

pub fn json_error_with_code(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": message.into(),
            "code": code,
        })),
    )
        .into_response()
}

pub fn invalid_body() -> Response {
    json_error(StatusCode::BAD_REQUEST, "Invalid request body")
}

pub fn invalid_id() -> Response {
    json_error(StatusCode::BAD_REQUEST, "Invalid ID")
}

pub fn forbidden() -> Response {
    json_error(StatusCode::FORBIDDEN, "Insufficient permissions")
}

pub fn not_found(what: &'static str) -> Response {
    json_error(StatusCode::NOT_FOUND, format!("{what} not found"))
}

/// `what` names the record kind in 404 bodies.
pub fn repository_error_to_response(err: RepositoryError, what: &'static str) -> Response {
    match err {
        RepositoryError::NotFound => not_found(what),
        RepositoryError::Conflict(msg) => json_error(StatusCode::CONFLICT, msg),
        RepositoryError::Storage(msg) => {
            error!(error = %msg, "repository failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL)
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, msg),
        DomainError::InvalidVariant { kind, .. } => json_error(StatusCode::BAD_REQUEST, format!("Invalid {kind}")),
        DomainError::InvalidId(_) => invalid_id(),
    }
}

pub fn auth_error_to_response(err: AuthError) -> Response {
    match err {
        AuthError::InvalidCredentials | AuthError::AccountInactive => {
            json_error(StatusCode::UNAUTHORIZED, err.to_string())
        }
        AuthError::MissingCredential => json_error(StatusCode::UNAUTHORIZED, "Missing authorization header"),
        AuthError::MalformedCredential => json_error(StatusCode::UNAUTHORIZED, "Invalid authorization format"),
        AuthError::Token(TokenError::Expired) => json_error(StatusCode::UNAUTHORIZED, "Token has expired"),
        AuthError::Token(TokenError::Invalid | TokenError::Revoked) => {
            json_error(StatusCode::UNAUTHORIZED, "Invalid token")
        }
        AuthError::UserInvalid => json_error(StatusCode::UNAUTHORIZED, "User not found"),
        AuthError::UserInactive => json_error(StatusCode::UNAUTHORIZED, "User account is not active"),
        AuthError::Token(TokenError::Signing(msg)) | AuthError::Hashing(msg) => {
            error!(error = %msg, "credential processing failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL)
        }
        AuthError::Directory(e) => {
            error!(error = %e, "user directory failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL)
        }
    }
}

/// Refresh reports a machine-readable `code` next to the message.
pub fn refresh_error_to_response(err: AuthError) -> Response {
    match err {
        AuthError::Token(TokenError::Invalid | TokenError::Expired | TokenError::Revoked) => json_error_with_code(
            StatusCode::UNAUTHORIZED,
            "refresh_token_invalid",
            "Invalid or expired refresh token",
        ),
        AuthError::UserInvalid => json_error_with_code(StatusCode::UNAUTHORIZED, "user_invalid", "User not found"),
        AuthError::UserInactive => {
            json_error_with_code(StatusCode::UNAUTHORIZED, "user_inactive", "User account is not active")
        }
        other => auth_error_to_response(other),
    }
}

pub fn service_error_to_response(err: ServiceError, what: &'static str) -> Response {
    match err {
        ServiceError::Auth(e) => auth_error_to_response(e),
        ServiceError::Repository(e) => repository_error_to_response(e, what),
        ServiceError::IncorrectPassword => json_error(StatusCode::UNAUTHORIZED, "incorrect password"),
        ServiceError::Background(msg) => {
            error!(error = %msg, "background task failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL)
        }
    }
}
