//! `petparadise-auth`: authentication and session core.
//!
//! This crate is intentionally decoupled from HTTP and storage: the API layer
//! feeds it header values and a [`UserDirectory`] implementation, and maps the
//! returned error kinds onto responses.

pub mod authorize;
pub mod bearer;
pub mod claims;
pub mod error;
pub mod password;
pub mod principal;
pub mod revocation;
pub mod roles;
pub mod signer;
pub mod tokens;
pub mod user;

pub use authorize::{AuthzError, authorize_role};
pub use bearer::parse_bearer;
pub use claims::{AccessClaims, Claims, RefreshClaims, TokenKind};
pub use error::{AuthError, TokenError};
pub use password::{HashCost, PasswordHasher};
pub use principal::Principal;
pub use revocation::{RevocationRegistry, RevocationSweeper, SweeperHandle};
pub use roles::Role;
pub use signer::Signer;
pub use tokens::{TokenConfig, TokenPair, TokenService};
pub use user::{DirectoryError, User, UserDirectory, UserStatus};
