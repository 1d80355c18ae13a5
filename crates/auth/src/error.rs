use thiserror::Error;

use crate::user::DirectoryError;

/// Failure of a credential check (signer or token service).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Shape, algorithm, signature, or claims-kind failure.
    #[error("invalid token")]
    Invalid,

    /// Signature is valid but `exp` is not in the future.
    #[error("token has expired")]
    Expired,

    /// Present in the revocation registry.
    #[error("token has been revoked")]
    Revoked,

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Error kinds surfaced by the session core.
///
/// The HTTP boundary is the only place these are translated to status codes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingCredential,

    #[error("invalid authorization format")]
    MalformedCredential,

    #[error(transparent)]
    Token(#[from] TokenError),

    /// Refresh subject no longer exists.
    #[error("user not found")]
    UserInvalid,

    /// Refresh subject exists but is not active.
    #[error("user is not active")]
    UserInactive,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("user account is not active")]
    AccountInactive,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}
