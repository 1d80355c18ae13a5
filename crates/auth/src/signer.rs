//! HS256 signing and verification of claims envelopes.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use crate::TokenError;
use crate::claims::Claims;

/// Signs and verifies credentials under one process-wide symmetric key.
///
/// The key is fixed at construction; rotating it means building a new signer
/// (in practice, restarting the process).
#[derive(Clone)]
pub struct Signer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl core::fmt::Debug for Signer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}

impl Signer {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // Expiry is checked against the caller's clock in `verify`.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = ["exp", "sub"].into_iter().map(String::from).collect();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn sign<C: Claims>(&self, claims: &C) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify `token` as a credential of kind `C`.
    ///
    /// Only HS256 is accepted. A token whose `exp` is at or before `now` is
    /// expired.
    pub fn verify<C: Claims>(&self, token: &str, now: DateTime<Utc>) -> Result<C, TokenError> {
        let claims = self.decode::<C>(token)?;
        if claims.exp() <= now.timestamp() {
            debug!(kind = %C::KIND, "credential expired");
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Check algorithm, signature and shape only; expiry is not considered.
    pub fn decode<C: Claims>(&self, token: &str) -> Result<C, TokenError> {
        decode::<C>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(kind = %C::KIND, error = %e, "credential rejected");
                TokenError::Invalid
            })
    }
}
