use petparadise_auth::{Principal, Role};
use petparadise_core::UserId;

/// Principal context for a request (authenticated identity + role).
///
/// Inserted by the auth middleware; handlers treat it as read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn user_id(&self) -> UserId {
        self.principal.user_id
    }

    pub fn role(&self) -> Role {
        self.principal.role
    }

    /// Raw access credential presented with the request.
    pub fn token(&self) -> &str {
        &self.principal.token
    }

    pub fn is_self_or_admin(&self, user_id: UserId) -> bool {
        self.principal.is_self_or_admin(user_id)
    }

    /// Admin, vet, or volunteer.
    pub fn is_staff(&self) -> bool {
        crate::middleware::STAFF.contains(&self.role())
    }
}
