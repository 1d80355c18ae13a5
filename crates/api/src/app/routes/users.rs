use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use chrono::Utc;
use serde_json::json;

use petparadise_auth::{AuthError, Role, UserDirectory, UserStatus};
use petparadise_core::UserId;
use petparadise_infra::UserRepository;

use crate::app::services::{AppServices, Registration};
use crate::app::{dto, errors};
use crate::context::PrincipalContext;
use crate::middleware::{RoleGate, require_roles};

pub fn public_router() -> Router {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/refresh", post(refresh))
}

pub fn router() -> Router {
    let admin = Router::new()
        .route("/users/:id/role", patch(update_role))
        .route("/users/:id/status", patch(update_status))
        .route("/users/:id", axum::routing::delete(delete_user))
        .route_layer(axum::middleware::from_fn_with_state(RoleGate::admin_only(), require_roles));

    Router::new()
        .route("/users/logout", post(logout))
        .route("/users", get(list_users))
        .route("/users/", get(list_users))
        .route("/users/email", get(user_by_email))
        .route("/users/status", get(users_by_status))
        .route("/users/:id", get(get_user).put(update_user))
        .route("/users/:id/password", post(change_password))
        .route("/users/:id/revoke-tokens", post(revoke_tokens))
        .merge(admin)
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> Response {
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    if body.name.trim().is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "Name is required");
    }
    if body.email.trim().is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "Email is required");
    }
    if body.password.is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "Password is required");
    }

    let role = match body.role.as_deref().filter(|r| !r.is_empty()) {
        None => Role::default(),
        Some(raw) => match raw.parse::<Role>() {
            Ok(role) => role,
            Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "Invalid role"),
        },
    };

    let input = Registration {
        name: body.name,
        email: body.email,
        password: body.password,
        role,
        address: body.address,
        phone: body.phone,
        documents: body.documents,
    };

    match services.register(input).await {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(e) => errors::service_error_to_response(e, "User"),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> Response {
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    if body.email.trim().is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "Email is required");
    }
    if body.password.is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "Password is required");
    }

    match services.login(&body.email, body.password).await {
        Ok((user, tokens)) => Json(dto::LoginResponse { user, tokens }).into_response(),
        Err(e) => errors::service_error_to_response(e, "User"),
    }
}

pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::RefreshRequest>, JsonRejection>,
) -> Response {
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    if body.refresh_token.is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "Refresh token is required");
    }

    match services.refresh(&body.refresh_token).await {
        Ok(tokens) => Json(dto::TokensResponse { tokens }).into_response(),
        Err(e) => errors::refresh_error_to_response(e),
    }
}

/// The body is optional; when present it may name a refresh credential to
/// retire along with the access credential.
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    principal: Option<Extension<PrincipalContext>>,
    raw: Bytes,
) -> Response {
    let Some(Extension(principal)) = principal else {
        return errors::json_error(StatusCode::BAD_REQUEST, "No active session");
    };

    let body = if raw.is_empty() {
        dto::LogoutRequest::default()
    } else {
        match serde_json::from_slice::<dto::LogoutRequest>(&raw) {
            Ok(b) => b,
            Err(_) => return errors::invalid_body(),
        }
    };

    let refresh_token = body.refresh_token.as_deref().filter(|t| !t.is_empty());
    match services.tokens.logout(principal.token(), refresh_token) {
        Ok(()) => Json(json!({ "message": "Successfully logged out" })).into_response(),
        Err(e) => errors::auth_error_to_response(e.into()),
    }
}

pub async fn revoke_tokens(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let user_id: UserId = match dto::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if !principal.is_self_or_admin(user_id) {
        return errors::forbidden();
    }

    if let Err(e) = services.load_user(user_id).await {
        return errors::service_error_to_response(e, "User");
    }

    services.tokens.revoke_all_for_user(user_id);
    Json(json!({ "message": "Token revocation requested" })).into_response()
}

// ─────────────────────────────────────────────────────────────────────────────
// Queries
// ─────────────────────────────────────────────────────────────────────────────

pub async fn list_users(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.repos.users.find_all().await {
        Ok(users) => Json(users).into_response(),
        Err(e) => errors::repository_error_to_response(e, "User"),
    }
}

pub async fn user_by_email(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::EmailQuery>,
) -> Response {
    let Some(email) = query.email.filter(|e| !e.is_empty()) else {
        return errors::json_error(StatusCode::BAD_REQUEST, "Email query parameter is required");
    };

    match services.repos.users.find_by_email(&email).await {
        Ok(Some(user)) => Json(user).into_response(),
        Ok(None) => errors::not_found("User"),
        Err(e) => errors::auth_error_to_response(AuthError::Directory(e)),
    }
}

pub async fn users_by_status(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::StatusQuery>,
) -> Response {
    let Some(raw) = query.status.filter(|s| !s.is_empty()) else {
        return errors::json_error(StatusCode::BAD_REQUEST, "Status query parameter is required");
    };
    let Ok(status) = raw.parse::<UserStatus>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "Invalid status");
    };

    match services.repos.users.find_by_status(status).await {
        Ok(users) => Json(users).into_response(),
        Err(e) => errors::repository_error_to_response(e, "User"),
    }
}

pub async fn get_user(Extension(services): Extension<Arc<AppServices>>, Path(id): Path<String>) -> Response {
    let user_id: UserId = match dto::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.load_user(user_id).await {
        Ok(user) => Json(user).into_response(),
        Err(e) => errors::service_error_to_response(e, "User"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Self-service updates
// ─────────────────────────────────────────────────────────────────────────────

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    payload: Result<Json<dto::UpdateUserRequest>, JsonRejection>,
) -> Response {
    let user_id: UserId = match dto::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if !principal.is_self_or_admin(user_id) {
        return errors::forbidden();
    }
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    if body.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return errors::json_error(StatusCode::BAD_REQUEST, "Name is required");
    }
    if body.email.as_deref().is_some_and(|e| e.trim().is_empty()) {
        return errors::json_error(StatusCode::BAD_REQUEST, "Email is required");
    }

    let mut user = match services.load_user(user_id).await {
        Ok(user) => user,
        Err(e) => return errors::service_error_to_response(e, "User"),
    };

    if let Some(name) = body.name {
        user.name = name;
    }
    if let Some(email) = body.email {
        user.email = email;
    }
    if let Some(address) = body.address {
        user.address = address;
    }
    if let Some(phone) = body.phone {
        user.phone = phone;
    }
    if let Some(documents) = body.documents {
        user.documents = documents;
    }
    user.updated_at = Utc::now();

    match services.repos.users.update(&user).await {
        Ok(()) => Json(user).into_response(),
        Err(e) => errors::repository_error_to_response(e, "User"),
    }
}

pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    payload: Result<Json<dto::ChangePasswordRequest>, JsonRejection>,
) -> Response {
    let user_id: UserId = match dto::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if !principal.is_self_or_admin(user_id) {
        return errors::forbidden();
    }
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    if body.old_password.is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "Old password is required");
    }
    if body.new_password.is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "New password is required");
    }

    match services
        .change_password(user_id, body.old_password, body.new_password)
        .await
    {
        Ok(()) => Json(json!({ "message": "Password changed successfully" })).into_response(),
        Err(e) => errors::service_error_to_response(e, "User"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Administration
// ─────────────────────────────────────────────────────────────────────────────

pub async fn update_role(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<dto::RoleRequest>, JsonRejection>,
) -> Response {
    let user_id: UserId = match dto::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    if body.role.is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "Role is required");
    }
    let Ok(role) = body.role.parse::<Role>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "Invalid role");
    };

    match services.set_role(user_id, role).await {
        Ok(user) => Json(user).into_response(),
        Err(e) => errors::service_error_to_response(e, "User"),
    }
}

pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<dto::StatusRequest>, JsonRejection>,
) -> Response {
    let user_id: UserId = match dto::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    if body.status.is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "Status is required");
    }
    let Ok(status) = body.status.parse::<UserStatus>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "Invalid status");
    };

    match services.set_status(user_id, status).await {
        Ok(user) => Json(user).into_response(),
        Err(e) => errors::service_error_to_response(e, "User"),
    }
}

pub async fn delete_user(Extension(services): Extension<Arc<AppServices>>, Path(id): Path<String>) -> Response {
    let user_id: UserId = match dto::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.repos.users.delete(user_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::repository_error_to_response(e, "User"),
    }
}
