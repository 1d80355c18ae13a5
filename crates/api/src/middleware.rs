use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use petparadise_auth::{AuthError, AuthzError, Principal, Role, TokenError, TokenService, authorize_role, parse_bearer};

use crate::app::errors::json_error;
use crate::context::PrincipalContext;

/// Roles admitted to staff-only routes. Admin is implicit but listed for
/// handlers that check staff membership directly.
pub const STAFF: [Role; 3] = [Role::Admin, Role::Vet, Role::Volunteer];

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenService>,
}

/// Validate the bearer credential and attach the principal to the request.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = match extract_bearer(req.headers()) {
        Ok(token) => token.to_owned(),
        Err(e) => return unauthorized(&e),
    };

    let claims = match state.tokens.validate_access(&token) {
        Ok(claims) => claims,
        Err(e) => {
            debug!(error = %e, "access credential rejected");
            return unauthorized(&AuthError::Token(e));
        }
    };

    req.extensions_mut()
        .insert(PrincipalContext::new(Principal::from_claims(claims, token)));

    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = match headers.get(axum::http::header::AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| AuthError::MalformedCredential)?),
        None => None,
    };
    parse_bearer(header)
}

fn unauthorized(err: &AuthError) -> Response {
    let message = match err {
        AuthError::MissingCredential => "Missing authorization header",
        AuthError::MalformedCredential => "Invalid authorization format",
        AuthError::Token(TokenError::Expired) => "Token has expired",
        _ => "Invalid token",
    };
    json_error(StatusCode::UNAUTHORIZED, message)
}

/// Per-route allow-list. Admin is always admitted.
#[derive(Clone)]
pub struct RoleGate {
    allowed: Arc<[Role]>,
}

impl RoleGate {
    pub fn new(allowed: &[Role]) -> Self {
        Self {
            allowed: allowed.into(),
        }
    }

    pub fn admin_only() -> Self {
        Self::new(&[Role::Admin])
    }

    pub fn staff() -> Self {
        Self::new(&STAFF)
    }
}

/// Must run after [`auth_middleware`].
pub async fn require_roles(
    State(gate): State<RoleGate>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let role = req.extensions().get::<PrincipalContext>().map(|p| p.role());

    match authorize_role(role, &gate.allowed) {
        Ok(()) => next.run(req).await,
        Err(AuthzError::MissingRole) => json_error(StatusCode::UNAUTHORIZED, "Failed to get user role"),
        Err(AuthzError::Forbidden) => json_error(StatusCode::FORBIDDEN, "Insufficient permissions"),
    }
}
