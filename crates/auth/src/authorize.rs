use thiserror::Error;

use crate::Role;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthzError {
    /// No authenticated role was available to check.
    #[error("failed to get user role")]
    MissingRole,

    #[error("insufficient permissions")]
    Forbidden,
}

/// Role-gate decision for one route.
///
/// - No IO
/// - No panics
/// - `Admin` is admitted by every gate, whatever `allowed` contains.
pub fn authorize_role(role: Option<Role>, allowed: &[Role]) -> Result<(), AuthzError> {
    let role = role.ok_or(AuthzError::MissingRole)?;
    if role == Role::Admin || allowed.contains(&role) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden)
    }
}
