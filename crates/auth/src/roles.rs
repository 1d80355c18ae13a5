use core::str::FromStr;

use serde::{Deserialize, Serialize};

use petparadise_core::DomainError;

/// Role carried by a user record and by access credentials.
///
/// `Admin` is a super-role: every role gate admits it regardless of the
/// route's allow-list (see [`crate::authorize_role`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
    Volunteer,
    Vet,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::User, Role::Volunteer, Role::Vet];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Volunteer => "volunteer",
            Role::Vet => "vet",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| DomainError::invalid_variant("role", s))
    }
}
