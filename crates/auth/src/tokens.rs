//! Token service: issuance, validation, rotation and revocation of
//! access/refresh pairs.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use petparadise_core::UserId;

use crate::claims::{AccessClaims, Claims, RefreshClaims};
use crate::revocation::RevocationRegistry;
use crate::signer::Signer;
use crate::user::{User, UserDirectory};
use crate::{AuthError, TokenError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenConfig {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_ttl: Duration::from_secs(15 * 60),
            refresh_ttl: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

/// Credentials handed to a client after login or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access credential lifetime in seconds.
    pub expires_in: i64,
}

#[derive(Debug)]
pub struct TokenService {
    signer: Signer,
    registry: Arc<RevocationRegistry>,
    config: TokenConfig,
    last_token_nanos: AtomicI64,
}

impl TokenService {
    pub fn new(signer: Signer, registry: Arc<RevocationRegistry>, config: TokenConfig) -> Self {
        Self {
            signer,
            registry,
            config,
            last_token_nanos: AtomicI64::new(0),
        }
    }

    pub fn registry(&self) -> &Arc<RevocationRegistry> {
        &self.registry
    }

    /// Issue a fresh pair for `user`.
    ///
    /// The caller is responsible for checking that the user is active. Prior
    /// credentials of the user stay valid.
    pub fn issue(&self, user: &User) -> Result<TokenPair, TokenError> {
        self.issue_at(user, Utc::now())
    }

    pub fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Result<TokenPair, TokenError> {
        let iat = now.timestamp();
        let access_ttl = ttl_secs(self.config.access_ttl);

        let access = AccessClaims {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            exp: iat.saturating_add(access_ttl),
            iat,
            sub: user.id,
        };
        let refresh = RefreshClaims {
            user_id: user.id,
            token_id: self.next_token_id(user.id, now),
            exp: iat.saturating_add(ttl_secs(self.config.refresh_ttl)),
            iat,
            sub: user.id,
        };

        Ok(TokenPair {
            access_token: self.signer.sign(&access)?,
            refresh_token: self.signer.sign(&refresh)?,
            expires_in: access_ttl,
        })
    }

    /// `<user id>-<nanos>`, where nanos strictly increases across the process.
    fn next_token_id(&self, user_id: UserId, now: DateTime<Utc>) -> String {
        let candidate = now.timestamp_nanos_opt().unwrap_or(i64::MAX);
        let next = |last: i64| candidate.max(last.saturating_add(1));
        let previous = self
            .last_token_nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(next(last)))
            .unwrap_or_else(|last| last);
        format!("{user_id}-{}", next(previous))
    }

    pub fn validate_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Registry first, then the signer: a revoked credential reports
    /// `Revoked` even while its signature and expiry still hold.
    pub fn validate_at<C: Claims>(&self, token: &str, now: DateTime<Utc>) -> Result<C, TokenError> {
        if self.registry.is_revoked(token) {
            debug!(kind = %C::KIND, "revoked credential presented");
            return Err(TokenError::Revoked);
        }
        self.signer.verify(token, now)
    }

    /// Exchange a refresh credential for a new pair.
    ///
    /// The presented credential is single-use: it is claimed in the registry
    /// only after the new pair has been minted, and if another caller claimed
    /// it first the new pair is discarded and the call fails as revoked.
    pub async fn refresh<D>(&self, refresh_token: &str, directory: &D) -> Result<TokenPair, AuthError>
    where
        D: UserDirectory + ?Sized,
    {
        let claims: RefreshClaims = self.validate_refresh(refresh_token)?;
        let expires_at = claims.expires_at();

        let user = match directory.find_by_id(claims.sub).await? {
            Some(user) if user.is_active() => user,
            Some(user) => {
                self.registry.revoke(refresh_token, expires_at);
                info!(user_id = %user.id, status = %user.status, "refresh refused for inactive user");
                return Err(AuthError::UserInactive);
            }
            None => {
                self.registry.revoke(refresh_token, expires_at);
                info!(user_id = %claims.sub, "refresh refused for unknown user");
                return Err(AuthError::UserInvalid);
            }
        };

        let pair = self.issue(&user)?;
        if !self.registry.revoke(refresh_token, expires_at) {
            warn!(user_id = %user.id, "refresh credential reused concurrently; new pair discarded");
            return Err(TokenError::Revoked.into());
        }

        info!(user_id = %user.id, "refresh credential rotated");
        Ok(pair)
    }

    /// Revoke the caller's access credential and, when supplied, a refresh
    /// credential belonging to the same subject.
    ///
    /// Credentials are keyed by the expiry in their own claims. A refresh
    /// credential that does not verify, or belongs to someone else, is left
    /// alone.
    pub fn logout(&self, access_token: &str, refresh_token: Option<&str>) -> Result<(), TokenError> {
        let access: AccessClaims = self.signer.decode(access_token)?;
        self.registry.revoke(access_token, access.expires_at());

        if let Some(refresh_token) = refresh_token {
            match self.signer.decode::<RefreshClaims>(refresh_token) {
                Ok(refresh) if refresh.sub == access.sub => {
                    self.registry.revoke(refresh_token, refresh.expires_at());
                }
                Ok(_) => warn!(user_id = %access.sub, "logout ignored a refresh credential of another user"),
                Err(_) => debug!(user_id = %access.sub, "logout ignored an unverifiable refresh credential"),
            }
        }

        info!(user_id = %access.sub, "user logged out");
        Ok(())
    }

    /// Request revocation of every credential issued to `user_id`.
    ///
    /// The registry is keyed by credential string, not by subject, so this
    /// cannot be honoured and is only recorded.
    pub fn revoke_all_for_user(&self, user_id: UserId) {
        warn!(%user_id, "revoke-all requested; not supported by the process-local registry");
    }
}

fn ttl_secs(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)
}
