//! Infrastructure layer: configuration, storage adapters, schema bootstrap.

pub mod config;
pub mod db;
pub mod repository;

pub use config::{AppConfig, ConfigError, Environment};
pub use repository::{
    AdoptionRepository, DonationRepository, PetRepository, Repositories, RepositoryError,
    UserRepository,
};
