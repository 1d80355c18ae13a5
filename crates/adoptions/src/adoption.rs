use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use petparadise_core::{AdoptionId, DomainError, Entity, PetId, UserId};

/// Adoption request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdoptionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Completed,
    Cancelled,
    WaitingForDocuments,
    InProgress,
}

impl AdoptionStatus {
    pub const ALL: [AdoptionStatus; 7] = [
        AdoptionStatus::Pending,
        AdoptionStatus::Approved,
        AdoptionStatus::Rejected,
        AdoptionStatus::Completed,
        AdoptionStatus::Cancelled,
        AdoptionStatus::WaitingForDocuments,
        AdoptionStatus::InProgress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdoptionStatus::Pending => "pending",
            AdoptionStatus::Approved => "approved",
            AdoptionStatus::Rejected => "rejected",
            AdoptionStatus::Completed => "completed",
            AdoptionStatus::Cancelled => "cancelled",
            AdoptionStatus::WaitingForDocuments => "waiting_for_documents",
            AdoptionStatus::InProgress => "in_progress",
        }
    }
}

impl core::fmt::Display for AdoptionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdoptionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdoptionStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| DomainError::invalid_variant("status", s))
    }
}

/// A request by `user_id` to adopt `pet_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adoption {
    pub id: AdoptionId,
    pub pet_id: PetId,
    pub user_id: UserId,
    pub status: AdoptionStatus,
    pub documents: Vec<String>,
    #[serde(rename = "created")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updated")]
    pub updated_at: DateTime<Utc>,
}

impl Adoption {
    /// Open a new request; every request starts `pending`.
    pub fn request(pet_id: PetId, user_id: UserId, documents: Vec<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: AdoptionId::new(),
            pet_id,
            user_id,
            status: AdoptionStatus::Pending,
            documents,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move the request to `status`, replacing documents when given.
    pub fn update(&mut self, status: AdoptionStatus, documents: Option<Vec<String>>, now: DateTime<Utc>) {
        self.status = status;
        if let Some(documents) = documents {
            self.documents = documents;
        }
        self.updated_at = now;
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

impl Entity for Adoption {
    type Id = AdoptionId;

    fn id(&self) -> AdoptionId {
        self.id
    }
}
