//! Postgres-backed repositories.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | RepositoryError |
//! |------------|----------------------|-----------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Storage` |
//! | Other | N/A | `Storage` |
//!
//! Statuses and roles are stored as their wire strings; list-valued fields
//! (`documents`, `images`) as JSONB arrays.

use core::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::{error, instrument};
use uuid::Uuid;

use petparadise_adoptions::{Adoption, AdoptionStatus};
use petparadise_auth::{DirectoryError, Role, User, UserDirectory, UserStatus};
use petparadise_core::{AdoptionId, DonationId, PetId, UserId};
use petparadise_donations::{Donation, DonationStatus};
use petparadise_pets::{Pet, PetStatus};

use super::{AdoptionRepository, DonationRepository, PetRepository, RepositoryError, UserRepository};

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => RepositoryError::Conflict(msg),
                _ => {
                    error!(operation, error = %msg, "database error");
                    RepositoryError::Storage(msg)
                }
            }
        }
        other => {
            error!(operation, error = %other, "sqlx error");
            RepositoryError::Storage(format!("sqlx error in {}: {}", operation, other))
        }
    }
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| RepositoryError::Storage(format!("failed to read column {name}: {e}")))
}

fn parsed<T>(row: &PgRow, name: &str) -> Result<T, RepositoryError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    let raw: String = column(row, name)?;
    raw.parse()
        .map_err(|e: T::Err| RepositoryError::Storage(format!("bad value in column {name}: {e}")))
}

fn strings(row: &PgRow, name: &str) -> Result<Vec<String>, RepositoryError> {
    let value: Option<Json<Vec<String>>> = column(row, name)?;
    Ok(value.map(|Json(v)| v).unwrap_or_default())
}

fn text(row: &PgRow, name: &str) -> Result<String, RepositoryError> {
    let value: Option<String> = column(row, name)?;
    Ok(value.unwrap_or_default())
}

fn expect_one(operation: &str, rows_affected: u64) -> Result<(), RepositoryError> {
    if rows_affected == 0 {
        tracing::debug!(operation, "no row affected");
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

const USER_COLUMNS: &str =
    "id, name, email, password, role, status, address, phone, documents, created, updated";

#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, operation: &str, clause: &str, bind: BindValue<'_>) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {clause}");
        let query = sqlx::query(&sql);
        let query = match bind {
            BindValue::Id(id) => query.bind(id),
            BindValue::Text(text) => query.bind(text),
        };
        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        row.as_ref().map(user_from_row).transpose()
    }
}

enum BindValue<'a> {
    Id(Uuid),
    Text(&'a str),
}

fn user_from_row(row: &PgRow) -> Result<User, RepositoryError> {
    Ok(User {
        id: UserId::from_uuid(column(row, "id")?),
        name: column(row, "name")?,
        email: column(row, "email")?,
        password_hash: column(row, "password")?,
        status: parsed::<UserStatus>(row, "status")?,
        role: parsed::<Role>(row, "role")?,
        address: text(row, "address")?,
        phone: text(row, "phone")?,
        documents: strings(row, "documents")?,
        created_at: column::<DateTime<Utc>>(row, "created")?,
        updated_at: column::<DateTime<Utc>>(row, "updated")?,
    })
}

#[async_trait]
impl UserDirectory for PostgresUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DirectoryError> {
        Ok(self.fetch_one_where("users.find_by_id", "id = $1", BindValue::Id(*id.as_uuid())).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        Ok(self.fetch_one_where("users.find_by_email", "email = $1", BindValue::Text(email)).await?)
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn save(&self, user: &User) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password, role, status, address, phone, documents, created, updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(&user.address)
        .bind(&user.phone)
        .bind(Json(&user.documents))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match map_sqlx_error("users.save", e) {
            RepositoryError::Conflict(_) => RepositoryError::Conflict("email already in use".to_string()),
            other => other,
        })?;
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created ASC, id ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("users.find_all", e))?;
        rows.iter().map(user_from_row).collect()
    }

    async fn find_by_status(&self, status: UserStatus) -> Result<Vec<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE status = $1 ORDER BY created ASC, id ASC");
        let rows = sqlx::query(&sql)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("users.find_by_status", e))?;
        rows.iter().map(user_from_row).collect()
    }

    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, email = $3, password = $4, role = $5, status = $6,
                address = $7, phone = $8, documents = $9, updated = $10
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(&user.address)
        .bind(&user.phone)
        .bind(Json(&user.documents))
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match map_sqlx_error("users.update", e) {
            RepositoryError::Conflict(_) => RepositoryError::Conflict("email already in use".to_string()),
            other => other,
        })?;
        expect_one("users.update", result.rows_affected())
    }

    async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("users.delete", e))?;
        expect_one("users.delete", result.rows_affected())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pets
// ─────────────────────────────────────────────────────────────────────────────

const PET_COLUMNS: &str = "id, name, species, breed, age, description, status, images, created, updated";

#[derive(Debug, Clone)]
pub struct PostgresPetRepository {
    pool: PgPool,
}

impl PostgresPetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn pet_from_row(row: &PgRow) -> Result<Pet, RepositoryError> {
    Ok(Pet {
        id: PetId::from_uuid(column(row, "id")?),
        name: column(row, "name")?,
        species: column(row, "species")?,
        breed: text(row, "breed")?,
        age: column(row, "age")?,
        description: text(row, "description")?,
        status: parsed::<PetStatus>(row, "status")?,
        images: strings(row, "images")?,
        created_at: column::<DateTime<Utc>>(row, "created")?,
        updated_at: column::<DateTime<Utc>>(row, "updated")?,
    })
}

#[async_trait]
impl PetRepository for PostgresPetRepository {
    #[instrument(skip(self, pet), fields(pet_id = %pet.id), err)]
    async fn save(&self, pet: &Pet) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO pets (id, name, species, breed, age, description, status, images, created, updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(pet.id.as_uuid())
        .bind(&pet.name)
        .bind(&pet.species)
        .bind(&pet.breed)
        .bind(pet.age)
        .bind(&pet.description)
        .bind(pet.status.as_str())
        .bind(Json(&pet.images))
        .bind(pet.created_at)
        .bind(pet.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("pets.save", e))?;
        Ok(())
    }

    async fn find_by_id(&self, id: PetId) -> Result<Option<Pet>, RepositoryError> {
        let sql = format!("SELECT {PET_COLUMNS} FROM pets WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("pets.find_by_id", e))?;
        row.as_ref().map(pet_from_row).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Pet>, RepositoryError> {
        let sql = format!("SELECT {PET_COLUMNS} FROM pets ORDER BY created ASC, id ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("pets.find_all", e))?;
        rows.iter().map(pet_from_row).collect()
    }

    async fn find_by_status(&self, status: PetStatus) -> Result<Vec<Pet>, RepositoryError> {
        let sql = format!("SELECT {PET_COLUMNS} FROM pets WHERE status = $1 ORDER BY created ASC, id ASC");
        let rows = sqlx::query(&sql)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("pets.find_by_status", e))?;
        rows.iter().map(pet_from_row).collect()
    }

    #[instrument(skip(self, pet), fields(pet_id = %pet.id), err)]
    async fn update(&self, pet: &Pet) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE pets
            SET name = $2, species = $3, breed = $4, age = $5, description = $6,
                status = $7, images = $8, updated = $9
            WHERE id = $1
            "#,
        )
        .bind(pet.id.as_uuid())
        .bind(&pet.name)
        .bind(&pet.species)
        .bind(&pet.breed)
        .bind(pet.age)
        .bind(&pet.description)
        .bind(pet.status.as_str())
        .bind(Json(&pet.images))
        .bind(pet.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("pets.update", e))?;
        expect_one("pets.update", result.rows_affected())
    }

    async fn delete(&self, id: PetId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM pets WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("pets.delete", e))?;
        expect_one("pets.delete", result.rows_affected())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Adoptions
// ─────────────────────────────────────────────────────────────────────────────

const ADOPTION_COLUMNS: &str = "id, pet_id, user_id, status, documents, created, updated";

#[derive(Debug, Clone)]
pub struct PostgresAdoptionRepository {
    pool: PgPool,
}

impl PostgresAdoptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn adoption_from_row(row: &PgRow) -> Result<Adoption, RepositoryError> {
    Ok(Adoption {
        id: AdoptionId::from_uuid(column(row, "id")?),
        pet_id: PetId::from_uuid(column(row, "pet_id")?),
        user_id: UserId::from_uuid(column(row, "user_id")?),
        status: parsed::<AdoptionStatus>(row, "status")?,
        documents: strings(row, "documents")?,
        created_at: column::<DateTime<Utc>>(row, "created")?,
        updated_at: column::<DateTime<Utc>>(row, "updated")?,
    })
}

#[async_trait]
impl AdoptionRepository for PostgresAdoptionRepository {
    #[instrument(skip(self, adoption), fields(adoption_id = %adoption.id), err)]
    async fn save(&self, adoption: &Adoption) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO adoptions (id, pet_id, user_id, status, documents, created, updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(adoption.id.as_uuid())
        .bind(adoption.pet_id.as_uuid())
        .bind(adoption.user_id.as_uuid())
        .bind(adoption.status.as_str())
        .bind(Json(&adoption.documents))
        .bind(adoption.created_at)
        .bind(adoption.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("adoptions.save", e))?;
        Ok(())
    }

    async fn find_by_id(&self, id: AdoptionId) -> Result<Option<Adoption>, RepositoryError> {
        let sql = format!("SELECT {ADOPTION_COLUMNS} FROM adoptions WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("adoptions.find_by_id", e))?;
        row.as_ref().map(adoption_from_row).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Adoption>, RepositoryError> {
        let sql = format!("SELECT {ADOPTION_COLUMNS} FROM adoptions ORDER BY created ASC, id ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("adoptions.find_all", e))?;
        rows.iter().map(adoption_from_row).collect()
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Adoption>, RepositoryError> {
        let sql = format!(
            "SELECT {ADOPTION_COLUMNS} FROM adoptions WHERE user_id = $1 ORDER BY created ASC, id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("adoptions.find_by_user", e))?;
        rows.iter().map(adoption_from_row).collect()
    }

    async fn update(&self, adoption: &Adoption) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE adoptions SET status = $2, documents = $3, updated = $4 WHERE id = $1",
        )
        .bind(adoption.id.as_uuid())
        .bind(adoption.status.as_str())
        .bind(Json(&adoption.documents))
        .bind(adoption.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("adoptions.update", e))?;
        expect_one("adoptions.update", result.rows_affected())
    }

    async fn delete(&self, id: AdoptionId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM adoptions WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("adoptions.delete", e))?;
        expect_one("adoptions.delete", result.rows_affected())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Donations
// ─────────────────────────────────────────────────────────────────────────────

const DONATION_COLUMNS: &str = "id, user_id, amount, status, comment, anonymous, created, updated";

#[derive(Debug, Clone)]
pub struct PostgresDonationRepository {
    pool: PgPool,
}

impl PostgresDonationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn donation_from_row(row: &PgRow) -> Result<Donation, RepositoryError> {
    Ok(Donation {
        id: DonationId::from_uuid(column(row, "id")?),
        user_id: UserId::from_uuid(column(row, "user_id")?),
        amount: column(row, "amount")?,
        status: parsed::<DonationStatus>(row, "status")?,
        comment: text(row, "comment")?,
        anonymous: column(row, "anonymous")?,
        created_at: column::<DateTime<Utc>>(row, "created")?,
        updated_at: column::<DateTime<Utc>>(row, "updated")?,
    })
}

#[async_trait]
impl DonationRepository for PostgresDonationRepository {
    #[instrument(skip(self, donation), fields(donation_id = %donation.id), err)]
    async fn save(&self, donation: &Donation) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO donations (id, user_id, amount, status, comment, anonymous, created, updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(donation.id.as_uuid())
        .bind(donation.user_id.as_uuid())
        .bind(donation.amount)
        .bind(donation.status.as_str())
        .bind(&donation.comment)
        .bind(donation.anonymous)
        .bind(donation.created_at)
        .bind(donation.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("donations.save", e))?;
        Ok(())
    }

    async fn find_by_id(&self, id: DonationId) -> Result<Option<Donation>, RepositoryError> {
        let sql = format!("SELECT {DONATION_COLUMNS} FROM donations WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("donations.find_by_id", e))?;
        row.as_ref().map(donation_from_row).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Donation>, RepositoryError> {
        let sql = format!("SELECT {DONATION_COLUMNS} FROM donations ORDER BY created ASC, id ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("donations.find_all", e))?;
        rows.iter().map(donation_from_row).collect()
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Donation>, RepositoryError> {
        let sql = format!(
            "SELECT {DONATION_COLUMNS} FROM donations WHERE user_id = $1 ORDER BY created ASC, id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("donations.find_by_user", e))?;
        rows.iter().map(donation_from_row).collect()
    }

    async fn update(&self, donation: &Donation) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE donations SET status = $2, updated = $3 WHERE id = $1")
            .bind(donation.id.as_uuid())
            .bind(donation.status.as_str())
            .bind(donation.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("donations.update", e))?;
        expect_one("donations.update", result.rows_affected())
    }

    async fn delete(&self, id: DonationId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM donations WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("donations.delete", e))?;
        expect_one("donations.delete", result.rows_affected())
    }
}
