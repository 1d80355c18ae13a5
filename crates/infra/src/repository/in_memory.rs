//! In-memory repositories for development and tests.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use petparadise_adoptions::Adoption;
use petparadise_auth::{DirectoryError, User, UserDirectory, UserStatus};
use petparadise_core::{AdoptionId, DonationId, Entity, PetId, UserId};
use petparadise_donations::Donation;
use petparadise_pets::{Pet, PetStatus};

use super::{AdoptionRepository, DonationRepository, PetRepository, RepositoryError, UserRepository};

fn poisoned<T>(_: PoisonError<T>) -> RepositoryError {
    RepositoryError::Storage("in-memory table lock poisoned".to_string())
}

/// Entity rows keyed by their id, behind a reader-writer lock.
#[derive(Debug)]
struct Table<V: Entity> {
    rows: RwLock<HashMap<V::Id, V>>,
}

impl<V: Entity> Default for Table<V> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> Table<V>
where
    V: Entity + Clone,
{
    fn get(&self, id: V::Id) -> Result<Option<V>, RepositoryError> {
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows.get(&id).cloned())
    }

    fn select(&self, keep: impl Fn(&V) -> bool) -> Result<Vec<V>, RepositoryError> {
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows.values().filter(|v| keep(v)).cloned().collect())
    }

    /// Insert `value` unless its id exists or any other row `clashes`.
    fn insert(&self, value: &V, clashes: impl Fn(&V) -> bool) -> Result<(), RepositoryError> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        if rows.contains_key(&value.id()) {
            return Err(RepositoryError::Conflict("duplicate id".to_string()));
        }
        if rows.values().any(&clashes) {
            return Err(RepositoryError::Conflict("duplicate unique value".to_string()));
        }
        rows.insert(value.id(), value.clone());
        Ok(())
    }

    /// Replace the stored row with the same id, unless another row `clashes`.
    fn replace(&self, value: &V, clashes: impl Fn(&V) -> bool) -> Result<(), RepositoryError> {
        let id = value.id();
        let mut rows = self.rows.write().map_err(poisoned)?;
        if !rows.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        if rows.iter().any(|(k, v)| *k != id && clashes(v)) {
            return Err(RepositoryError::Conflict("duplicate unique value".to_string()));
        }
        rows.insert(id, value.clone());
        Ok(())
    }

    fn remove(&self, id: V::Id) -> Result<(), RepositoryError> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        rows.remove(&id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

/// Users keyed by id. Email uniqueness is exact (case-sensitive).
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: Table<User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn by_creation(users: &mut [User]) {
    users.sort_by_key(|u| (u.created_at, *u.id.as_uuid()));
}

#[async_trait]
impl UserDirectory for InMemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DirectoryError> {
        Ok(self.table.get(id)?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        Ok(self.table.select(|u| u.email == email)?.into_iter().next())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: &User) -> Result<(), RepositoryError> {
        self.table
            .insert(user, |other| other.email == user.email)
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => RepositoryError::Conflict("email already in use".to_string()),
                other => other,
            })
    }

    async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        let mut users = self.table.select(|_| true)?;
        by_creation(&mut users);
        Ok(users)
    }

    async fn find_by_status(&self, status: UserStatus) -> Result<Vec<User>, RepositoryError> {
        let mut users = self.table.select(|u| u.status == status)?;
        by_creation(&mut users);
        Ok(users)
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        self.table
            .replace(user, |other| other.email == user.email)
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => RepositoryError::Conflict("email already in use".to_string()),
                other => other,
            })
    }

    async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        self.table.remove(id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pets
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryPetRepository {
    table: Table<Pet>,
}

impl InMemoryPetRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PetRepository for InMemoryPetRepository {
    async fn save(&self, pet: &Pet) -> Result<(), RepositoryError> {
        self.table.insert(pet, |_| false)
    }

    async fn find_by_id(&self, id: PetId) -> Result<Option<Pet>, RepositoryError> {
        self.table.get(id)
    }

    async fn find_all(&self) -> Result<Vec<Pet>, RepositoryError> {
        let mut pets = self.table.select(|_| true)?;
        pets.sort_by_key(|p| (p.created_at, *p.id.as_uuid()));
        Ok(pets)
    }

    async fn find_by_status(&self, status: PetStatus) -> Result<Vec<Pet>, RepositoryError> {
        let mut pets = self.table.select(|p| p.status == status)?;
        pets.sort_by_key(|p| (p.created_at, *p.id.as_uuid()));
        Ok(pets)
    }

    async fn update(&self, pet: &Pet) -> Result<(), RepositoryError> {
        self.table.replace(pet, |_| false)
    }

    async fn delete(&self, id: PetId) -> Result<(), RepositoryError> {
        self.table.remove(id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Adoptions
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryAdoptionRepository {
    table: Table<Adoption>,
}

impl InMemoryAdoptionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdoptionRepository for InMemoryAdoptionRepository {
    async fn save(&self, adoption: &Adoption) -> Result<(), RepositoryError> {
        self.table.insert(adoption, |_| false)
    }

    async fn find_by_id(&self, id: AdoptionId) -> Result<Option<Adoption>, RepositoryError> {
        self.table.get(id)
    }

    async fn find_all(&self) -> Result<Vec<Adoption>, RepositoryError> {
        let mut adoptions = self.table.select(|_| true)?;
        adoptions.sort_by_key(|a| (a.created_at, *a.id.as_uuid()));
        Ok(adoptions)
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Adoption>, RepositoryError> {
        let mut adoptions = self.table.select(|a| a.user_id == user_id)?;
        adoptions.sort_by_key(|a| (a.created_at, *a.id.as_uuid()));
        Ok(adoptions)
    }

    async fn update(&self, adoption: &Adoption) -> Result<(), RepositoryError> {
        self.table.replace(adoption, |_| false)
    }

    async fn delete(&self, id: AdoptionId) -> Result<(), RepositoryError> {
        self.table.remove(id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Donations
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryDonationRepository {
    table: Table<Donation>,
}

impl InMemoryDonationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DonationRepository for InMemoryDonationRepository {
    async fn save(&self, donation: &Donation) -> Result<(), RepositoryError> {
        self.table.insert(donation, |_| false)
    }

    async fn find_by_id(&self, id: DonationId) -> Result<Option<Donation>, RepositoryError> {
        self.table.get(id)
    }

    async fn find_all(&self) -> Result<Vec<Donation>, RepositoryError> {
        let mut donations = self.table.select(|_| true)?;
        donations.sort_by_key(|d| (d.created_at, *d.id.as_uuid()));
        Ok(donations)
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Donation>, RepositoryError> {
        let mut donations = self.table.select(|d| d.user_id == user_id)?;
        donations.sort_by_key(|d| (d.created_at, *d.id.as_uuid()));
        Ok(donations)
    }

    async fn update(&self, donation: &Donation) -> Result<(), RepositoryError> {
        self.table.replace(donation, |_| false)
    }

    async fn delete(&self, id: DonationId) -> Result<(), RepositoryError> {
        self.table.remove(id)
    }
}
