//! Application configuration, read once at start-up.
//!
//! Empty variables count as unset, so `FOO=` falls back to the default.

use core::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use petparadise_auth::{HashCost, TokenConfig};

const DEV_JWT_SECRET: &str = "your-secret-key";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" => Ok(Environment::Production),
            other => Err(ConfigError::invalid(
                "ENVIRONMENT",
                format!("expected development, test or production, got {other:?}"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub server_port: u16,
    /// Postgres URL. `None` selects the in-memory repositories.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub revocation_sweep_interval: Duration,
    pub password_hash: HashCost,
    pub log_level: String,
    pub environment: Environment,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let tokens = TokenConfig::default();
        Self {
            server_port: 3000,
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            access_token_ttl: tokens.access_ttl,
            refresh_token_ttl: tokens.refresh_ttl,
            revocation_sweep_interval: Duration::from_secs(15 * 60),
            password_hash: HashCost::default(),
            log_level: "info".to_string(),
            environment: Environment::Development,
            cors_allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let environment = match get("ENVIRONMENT") {
            Some(v) => v.parse()?,
            None => defaults.environment,
        };

        let jwt_secret = match get("JWT_SECRET") {
            Some(secret) => secret,
            None if environment == Environment::Production => {
                return Err(ConfigError::invalid("JWT_SECRET", "required in production"));
            }
            None => defaults.jwt_secret,
        };

        let password_hash = HashCost {
            memory_kib: parse_or(&get, "PASSWORD_HASH_MEMORY_KIB", defaults.password_hash.memory_kib)?,
            iterations: parse_or(&get, "PASSWORD_HASH_ITERATIONS", defaults.password_hash.iterations)?,
            parallelism: parse_or(&get, "PASSWORD_HASH_PARALLELISM", defaults.password_hash.parallelism)?,
        };

        let cors_allowed_origins = match get("CORS_ALLOWED_ORIGINS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect(),
            None => defaults.cors_allowed_origins,
        };

        Ok(Self {
            server_port: parse_or(&get, "SERVER_PORT", defaults.server_port)?,
            database_url: get("DATABASE_URL"),
            jwt_secret,
            access_token_ttl: seconds_or(&get, "ACCESS_TOKEN_TTL_SECS", defaults.access_token_ttl)?,
            refresh_token_ttl: seconds_or(&get, "REFRESH_TOKEN_TTL_SECS", defaults.refresh_token_ttl)?,
            revocation_sweep_interval: seconds_or(
                &get,
                "REVOCATION_SWEEP_INTERVAL_SECS",
                defaults.revocation_sweep_interval,
            )?,
            password_hash,
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level),
            environment,
            cors_allowed_origins,
        })
    }

    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            access_ttl: self.access_token_ttl,
            refresh_ttl: self.refresh_token_ttl,
        }
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(key, format!("{raw:?}: {e}"))),
        None => Ok(default),
    }
}

fn seconds_or<G>(get: &G, key: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let secs: u64 = parse_or(get, key, default.as_secs())?;
    if secs == 0 {
        return Err(ConfigError::invalid(key, "must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.server_port, 3000);
        assert_eq!(cfg.access_token_ttl, Duration::from_secs(900));
        assert_eq!(cfg.refresh_token_ttl, Duration::from_secs(604_800));
        assert_eq!(cfg.revocation_sweep_interval, Duration::from_secs(900));
        assert_eq!(cfg.jwt_secret, "your-secret-key");
        assert!(cfg.database_url.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = config(&[
            ("SERVER_PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/pets"),
            ("ACCESS_TOKEN_TTL_SECS", "60"),
            ("CORS_ALLOWED_ORIGINS", "https://a.test, https://b.test,"),
            ("ENVIRONMENT", "test"),
            ("PASSWORD_HASH_ITERATIONS", "1"),
        ])
        .unwrap();

        assert_eq!(cfg.server_port, 8080);
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/pets"));
        assert_eq!(cfg.token_config().access_ttl, Duration::from_secs(60));
        assert_eq!(cfg.cors_allowed_origins, ["https://a.test", "https://b.test"]);
        assert_eq!(cfg.environment, Environment::Test);
        assert_eq!(cfg.password_hash.iterations, 1);
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let cfg = config(&[("SERVER_PORT", ""), ("JWT_SECRET", " ")]).unwrap();
        assert_eq!(cfg.server_port, 3000);
        assert_eq!(cfg.jwt_secret, "your-secret-key");
    }

    #[test]
    fn production_requires_a_secret() {
        let err = config(&[("ENVIRONMENT", "production")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "JWT_SECRET", .. }));

        let cfg = config(&[("ENVIRONMENT", "production"), ("JWT_SECRET", "s3cr3t")]).unwrap();
        assert_eq!(cfg.jwt_secret, "s3cr3t");
    }

    #[test]
    fn invalid_values_name_the_key() {
        let err = config(&[("SERVER_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SERVER_PORT", .. }));

        let err = config(&[("REFRESH_TOKEN_TTL_SECS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "REFRESH_TOKEN_TTL_SECS", .. }));

        let err = config(&[("ENVIRONMENT", "staging")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "ENVIRONMENT", .. }));
    }
}
