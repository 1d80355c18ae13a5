//! Storage ports for users, pets, adoptions and donations, with in-memory and
//! Postgres implementations.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use petparadise_adoptions::Adoption;
use petparadise_auth::{DirectoryError, User, UserDirectory, UserStatus};
use petparadise_core::{AdoptionId, DonationId, PetId, UserId};
use petparadise_donations::Donation;
use petparadise_pets::{Pet, PetStatus};

pub use in_memory::{
    InMemoryAdoptionRepository, InMemoryDonationRepository, InMemoryPetRepository,
    InMemoryUserRepository,
};
pub use postgres::{
    PostgresAdoptionRepository, PostgresDonationRepository, PostgresPetRepository,
    PostgresUserRepository,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<RepositoryError> for DirectoryError {
    fn from(value: RepositoryError) -> Self {
        DirectoryError::Unavailable(value.to_string())
    }
}

/// Full user storage. Lookups by id and email come from [`UserDirectory`].
#[async_trait]
pub trait UserRepository: UserDirectory {
    /// Insert a new user. Fails with `Conflict` when the email is taken.
    async fn save(&self, user: &User) -> Result<(), RepositoryError>;

    async fn find_all(&self) -> Result<Vec<User>, RepositoryError>;

    async fn find_by_status(&self, status: UserStatus) -> Result<Vec<User>, RepositoryError>;

    /// Replace a stored user. `NotFound` if absent, `Conflict` if the new
    /// email belongs to someone else.
    async fn update(&self, user: &User) -> Result<(), RepositoryError>;

    async fn delete(&self, id: UserId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait PetRepository: Send + Sync {
    async fn save(&self, pet: &Pet) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: PetId) -> Result<Option<Pet>, RepositoryError>;

    async fn find_all(&self) -> Result<Vec<Pet>, RepositoryError>;

    async fn find_by_status(&self, status: PetStatus) -> Result<Vec<Pet>, RepositoryError>;

    async fn update(&self, pet: &Pet) -> Result<(), RepositoryError>;

    async fn delete(&self, id: PetId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait AdoptionRepository: Send + Sync {
    async fn save(&self, adoption: &Adoption) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: AdoptionId) -> Result<Option<Adoption>, RepositoryError>;

    async fn find_all(&self) -> Result<Vec<Adoption>, RepositoryError>;

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Adoption>, RepositoryError>;

    async fn update(&self, adoption: &Adoption) -> Result<(), RepositoryError>;

    async fn delete(&self, id: AdoptionId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait DonationRepository: Send + Sync {
    async fn save(&self, donation: &Donation) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: DonationId) -> Result<Option<Donation>, RepositoryError>;

    async fn find_all(&self) -> Result<Vec<Donation>, RepositoryError>;

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Donation>, RepositoryError>;

    async fn update(&self, donation: &Donation) -> Result<(), RepositoryError>;

    async fn delete(&self, id: DonationId) -> Result<(), RepositoryError>;
}

/// One handle per aggregate store, shared by the HTTP layer.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub pets: Arc<dyn PetRepository>,
    pub adoptions: Arc<dyn AdoptionRepository>,
    pub donations: Arc<dyn DonationRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            pets: Arc::new(InMemoryPetRepository::new()),
            adoptions: Arc::new(InMemoryAdoptionRepository::new()),
            donations: Arc::new(InMemoryDonationRepository::new()),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            pets: Arc::new(PostgresPetRepository::new(pool.clone())),
            adoptions: Arc::new(PostgresAdoptionRepository::new(pool.clone())),
            donations: Arc::new(PostgresDonationRepository::new(pool)),
        }
    }
}
