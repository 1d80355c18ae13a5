//! Claims envelopes carried inside signed credentials.
//!
//! Access and refresh claims share the registered core (`sub`, `iat`, `exp`)
//! and are told apart by payload shape alone. Both reject unknown fields, so a
//! well-signed token of one kind never deserializes as the other.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use petparadise_core::UserId;

use crate::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl core::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// Common view over both claims shapes.
pub trait Claims: Serialize + DeserializeOwned {
    const KIND: TokenKind;

    fn subject(&self) -> UserId;

    /// Expiry in unix seconds.
    fn exp(&self) -> i64;

    /// Expiry as an instant. Out-of-range values saturate to the far future.
    fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp(), 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Claims of a short-lived access credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessClaims {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
    pub sub: UserId,
}

/// Claims of a long-lived, single-use refresh credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshClaims {
    pub user_id: UserId,
    pub token_id: String,
    pub exp: i64,
    pub iat: i64,
    pub sub: UserId,
}

impl Claims for AccessClaims {
    const KIND: TokenKind = TokenKind::Access;

    fn subject(&self) -> UserId {
        self.sub
    }

    fn exp(&self) -> i64 {
        self.exp
    }
}

impl Claims for RefreshClaims {
    const KIND: TokenKind = TokenKind::Refresh;

    fn subject(&self) -> UserId {
        self.sub
    }

    fn exp(&self) -> i64 {
        self.exp
    }
}
