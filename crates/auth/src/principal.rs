use chrono::{DateTime, Utc};

use petparadise_core::UserId;

use crate::claims::{AccessClaims, Claims};
use crate::Role;

/// Authenticated identity derived from a validated access credential.
///
/// Lives only as long as the request it was extracted for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    /// The raw access credential, kept so logout can revoke it.
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Principal {
    pub fn from_claims(claims: AccessClaims, token: impl Into<String>) -> Self {
        let expires_at = claims.expires_at();
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
            token: token.into(),
            expires_at,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// The principal is `user_id` or an administrator.
    pub fn is_self_or_admin(&self, user_id: UserId) -> bool {
        self.user_id == user_id || self.is_admin()
    }
}
