use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Context;
use chrono::Utc;
use thiserror::Error;
use tracing::info;

use petparadise_auth::{
    AuthError, DirectoryError, PasswordHasher, RevocationRegistry, RevocationSweeper, Role, Signer, SweeperHandle,
    TokenError, TokenPair, TokenService, User, UserDirectory, UserStatus,
};
use petparadise_core::UserId;
use petparadise_infra::{AppConfig, Repositories, RepositoryError, UserRepository, db};

/// Failure of an application flow, translated to HTTP in `errors.rs`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The old password did not verify during a password change.
    #[error("incorrect password")]
    IncorrectPassword,

    #[error("background task failed: {0}")]
    Background(String),
}

impl From<DirectoryError> for ServiceError {
    fn from(value: DirectoryError) -> Self {
        ServiceError::Auth(AuthError::Directory(value))
    }
}

impl From<TokenError> for ServiceError {
    fn from(value: TokenError) -> Self {
        ServiceError::Auth(AuthError::Token(value))
    }
}

/// Validated registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub address: String,
    pub phone: String,
    pub documents: Vec<String>,
}

/// Shared application state: storage, credential services, and the
/// revocation sweeper that lives as long as the application.
pub struct AppServices {
    pub repos: Repositories,
    pub tokens: Arc<TokenService>,
    hasher: PasswordHasher,
    sweeper: Mutex<Option<SweeperHandle>>,
}

/// Wire storage and credential services from configuration.
///
/// Postgres is used when a database URL is configured; otherwise the
/// in-memory repositories back the application.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let repos = match &config.database_url {
        Some(url) => {
            let pool = db::connect(url).await.context("connecting to postgres")?;
            db::bootstrap(&pool).await.context("bootstrapping schema")?;
            info!(backend = "postgres", "storage backend selected");
            Repositories::postgres(pool)
        }
        None => {
            info!(backend = "in-memory", "storage backend selected");
            Repositories::in_memory()
        }
    };
    AppServices::new(repos, config)
}

impl AppServices {
    /// Must be called from within a Tokio runtime; spawns the sweeper.
    pub fn new(repos: Repositories, config: &AppConfig) -> anyhow::Result<Self> {
        let hasher = PasswordHasher::new(config.password_hash).context("invalid password hash cost")?;

        let registry = Arc::new(RevocationRegistry::new());
        let tokens = TokenService::new(
            Signer::new(config.jwt_secret.as_bytes()),
            Arc::clone(&registry),
            config.token_config(),
        );
        let sweeper = RevocationSweeper::spawn(registry, config.revocation_sweep_interval);

        Ok(Self {
            repos,
            tokens: Arc::new(tokens),
            hasher,
            sweeper: Mutex::new(Some(sweeper)),
        })
    }

    /// Stop the revocation sweeper and wait for it to exit.
    pub async fn shutdown(&self) {
        let handle = self.sweeper.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = handle {
            handle.shutdown().await;
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Passwords (Argon2 runs on the blocking pool)
    // ─────────────────────────────────────────────────────────────────────

    pub async fn hash_password(&self, plaintext: String) -> Result<String, ServiceError> {
        let hasher = self.hasher.clone();
        let verifier = tokio::task::spawn_blocking(move || hasher.derive(&plaintext))
            .await
            .map_err(|e| ServiceError::Background(e.to_string()))??;
        Ok(verifier)
    }

    pub async fn verify_password(&self, plaintext: String, verifier: String) -> Result<bool, ServiceError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &verifier))
            .await
            .map_err(|e| ServiceError::Background(e.to_string()))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Account flows
    // ─────────────────────────────────────────────────────────────────────

    pub async fn register(&self, input: Registration) -> Result<User, ServiceError> {
        let verifier = self.hash_password(input.password).await?;

        let mut user = User::new(input.name, input.email, verifier, input.role, Utc::now());
        user.address = input.address;
        user.phone = input.phone;
        user.documents = input.documents;

        self.repos.users.save(&user).await?;
        info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    /// An inactive account is reported before the password is checked.
    pub async fn login(&self, email: &str, password: String) -> Result<(User, TokenPair), ServiceError> {
        let Some(user) = self.repos.users.find_by_email(email).await? else {
            return Err(AuthError::InvalidCredentials.into());
        };

        if !user.is_active() {
            return Err(AuthError::AccountInactive.into());
        }
        if !self.verify_password(password, user.password_hash.clone()).await? {
            return Err(AuthError::InvalidCredentials.into());
        }

        let pair = self.tokens.issue(&user)?;
        info!(user_id = %user.id, "user logged in");
        Ok((user, pair))
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        self.tokens.refresh(refresh_token, &*self.repos.users).await
    }

    pub async fn load_user(&self, id: UserId) -> Result<User, ServiceError> {
        self.repos
            .users
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::Repository(RepositoryError::NotFound))
    }

    pub async fn change_password(&self, id: UserId, old: String, new: String) -> Result<(), ServiceError> {
        let mut user = self.load_user(id).await?;
        if !self.verify_password(old, user.password_hash.clone()).await? {
            return Err(ServiceError::IncorrectPassword);
        }

        user.password_hash = self.hash_password(new).await?;
        user.updated_at = Utc::now();
        self.repos.users.update(&user).await?;
        info!(user_id = %id, "password changed");
        Ok(())
    }

    /// Changing a role asks the token service to retire the user's sessions.
    pub async fn set_role(&self, id: UserId, role: Role) -> Result<User, ServiceError> {
        let mut user = self.load_user(id).await?;
        user.role = role;
        user.updated_at = Utc::now();
        self.repos.users.update(&user).await?;
        self.tokens.revoke_all_for_user(id);
        Ok(user)
    }

    pub async fn set_status(&self, id: UserId, status: UserStatus) -> Result<User, ServiceError> {
        let mut user = self.load_user(id).await?;
        user.status = status;
        user.updated_at = Utc::now();
        self.repos.users.update(&user).await?;
        self.tokens.revoke_all_for_user(id);
        Ok(user)
    }
}
