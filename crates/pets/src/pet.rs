use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use petparadise_core::{DomainError, DomainResult, Entity, PetId};

/// Pet availability lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PetStatus {
    #[default]
    Available,
    Adopted,
    InProcess,
    Unavailable,
    Quarantined,
    MedicalCare,
}

impl PetStatus {
    pub const ALL: [PetStatus; 6] = [
        PetStatus::Available,
        PetStatus::Adopted,
        PetStatus::InProcess,
        PetStatus::Unavailable,
        PetStatus::Quarantined,
        PetStatus::MedicalCare,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PetStatus::Available => "available",
            PetStatus::Adopted => "adopted",
            PetStatus::InProcess => "in_process",
            PetStatus::Unavailable => "unavailable",
            PetStatus::Quarantined => "quarantined",
            PetStatus::MedicalCare => "medical_care",
        }
    }
}

impl core::fmt::Display for PetStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PetStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PetStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| DomainError::invalid_variant("status", s))
    }
}

/// Input for listing a new pet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPet {
    pub name: String,
    pub species: String,
    pub breed: String,
    pub age: i32,
    pub description: String,
    pub images: Vec<String>,
}

/// Partial update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetChanges {
    pub name: Option<String>,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub age: Option<i32>,
    pub description: Option<String>,
    pub status: Option<PetStatus>,
    pub images: Option<Vec<String>>,
}

/// A pet listed for adoption.
///
/// # Invariants
/// - `name` and `species` are never empty.
/// - `age` is never negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    pub species: String,
    pub breed: String,
    pub age: i32,
    pub description: String,
    pub status: PetStatus,
    pub images: Vec<String>,
    #[serde(rename = "created")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updated")]
    pub updated_at: DateTime<Utc>,
}

impl Pet {
    /// Validate `input` and list it as `available`.
    pub fn create(input: NewPet, now: DateTime<Utc>) -> DomainResult<Self> {
        validate_name(&input.name)?;
        validate_species(&input.species)?;
        validate_age(input.age)?;

        Ok(Self {
            id: PetId::new(),
            name: input.name,
            species: input.species,
            breed: input.breed,
            age: input.age,
            description: input.description,
            status: PetStatus::Available,
            images: input.images,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update. Nothing is changed when validation fails.
    pub fn apply(&mut self, changes: PetChanges, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(name) = &changes.name {
            validate_name(name)?;
        }
        if let Some(species) = &changes.species {
            validate_species(species)?;
        }
        if let Some(age) = changes.age {
            validate_age(age)?;
        }

        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(species) = changes.species {
            self.species = species;
        }
        if let Some(breed) = changes.breed {
            self.breed = breed;
        }
        if let Some(age) = changes.age {
            self.age = age;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(images) = changes.images {
            self.images = images;
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn set_status(&mut self, status: PetStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }
}

impl Entity for Pet {
    type Id = PetId;

    fn id(&self) -> PetId {
        self.id
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("Name is required"));
    }
    Ok(())
}

fn validate_species(species: &str) -> DomainResult<()> {
    if species.trim().is_empty() {
        return Err(DomainError::validation("Species is required"));
    }
    Ok(())
}

fn validate_age(age: i32) -> DomainResult<()> {
    if age < 0 {
        return Err(DomainError::validation("Age must be a positive number"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn rex() -> NewPet {
        NewPet {
            name: "Rex".into(),
            species: "dog".into(),
            breed: "mixed".into(),
            age: 3,
            description: "friendly".into(),
            images: vec!["rex.jpg".into()],
        }
    }

    #[test]
    fn create_lists_pet_as_available() {
        let now = Utc::now();
        let pet = Pet::create(rex(), now).unwrap();
        assert_eq!(pet.status, PetStatus::Available);
        assert_eq!(pet.created_at, now);
        assert_eq!(pet.updated_at, now);
    }

    #[test]
    fn create_requires_name_and_species() {
        let err = Pet::create(NewPet { name: " ".into(), ..rex() }, Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::validation("Name is required"));

        let err = Pet::create(NewPet { species: String::new(), ..rex() }, Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::validation("Species is required"));
    }

    #[test]
    fn failed_update_changes_nothing() {
        let mut pet = Pet::create(rex(), Utc::now()).unwrap();
        let before = pet.clone();

        let changes = PetChanges {
            name: Some("Max".into()),
            age: Some(-1),
            ..PetChanges::default()
        };
        assert!(pet.apply(changes, Utc::now()).is_err());
        assert_eq!(pet, before);
    }

    #[test]
    fn update_touches_only_given_fields() {
        let mut pet = Pet::create(rex(), Utc::now()).unwrap();
        let changes = PetChanges {
            status: Some(PetStatus::MedicalCare),
            images: Some(vec![]),
            ..PetChanges::default()
        };
        pet.apply(changes, Utc::now()).unwrap();

        assert_eq!(pet.name, "Rex");
        assert_eq!(pet.status, PetStatus::MedicalCare);
        assert!(pet.images.is_empty());
    }

    #[test]
    fn status_wire_names_are_snake_case() {
        assert_eq!(serde_json::to_string(&PetStatus::InProcess).unwrap(), "\"in_process\"");
        assert_eq!("medical_care".parse::<PetStatus>().unwrap(), PetStatus::MedicalCare);
        assert!("Available".parse::<PetStatus>().is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            .. ProptestConfig::default()
        })]

        #[test]
        fn age_is_accepted_iff_non_negative(age in any::<i32>()) {
            let result = Pet::create(NewPet { age, ..rex() }, Utc::now());
            prop_assert_eq!(result.is_ok(), age >= 0);
        }
    }
}
