use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use petparadise_core::{DomainError, DomainResult, DonationId, Entity, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl DonationStatus {
    pub const ALL: [DonationStatus; 4] = [
        DonationStatus::Pending,
        DonationStatus::Completed,
        DonationStatus::Failed,
        DonationStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Pending => "pending",
            DonationStatus::Completed => "completed",
            DonationStatus::Failed => "failed",
            DonationStatus::Refunded => "refunded",
        }
    }
}

impl core::fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DonationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DonationStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| DomainError::invalid_variant("status", s))
    }
}

/// A donation by `user_id`.
///
/// # Invariants
/// - `amount` is finite and strictly positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    pub id: DonationId,
    pub user_id: UserId,
    pub amount: f64,
    pub status: DonationStatus,
    pub comment: String,
    pub anonymous: bool,
    #[serde(rename = "created")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updated")]
    pub updated_at: DateTime<Utc>,
}

impl Donation {
    /// Record a new donation as `pending`.
    pub fn create(
        user_id: UserId,
        amount: f64,
        comment: impl Into<String>,
        anonymous: bool,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(DomainError::validation("Amount must be greater than zero"));
        }

        Ok(Self {
            id: DonationId::new(),
            user_id,
            amount,
            status: DonationStatus::Pending,
            comment: comment.into(),
            anonymous,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn set_status(&mut self, status: DonationStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

impl Entity for Donation {
    type Id = DonationId;

    fn id(&self) -> DonationId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn new_donations_are_pending() {
        let d = Donation::create(UserId::new(), 25.5, "for food", false, Utc::now()).unwrap();
        assert_eq!(d.status, DonationStatus::Pending);
        assert_eq!(d.amount, 25.5);
    }

    #[test]
    fn non_finite_amounts_are_rejected() {
        for amount in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 0.0, -0.0] {
            assert!(Donation::create(UserId::new(), amount, "", true, Utc::now()).is_err());
        }
    }

    #[test]
    fn status_change_bumps_updated() {
        let created = Utc::now();
        let mut d = Donation::create(UserId::new(), 10.0, "", false, created).unwrap();
        let later = created + chrono::Duration::seconds(5);
        d.set_status(DonationStatus::Refunded, later);
        assert_eq!(d.status, DonationStatus::Refunded);
        assert_eq!(d.updated_at, later);
        assert_eq!(d.created_at, created);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            .. ProptestConfig::default()
        })]

        #[test]
        fn finite_amounts_accepted_iff_positive(amount in -1.0e9f64..1.0e9f64) {
            let result = Donation::create(UserId::new(), amount, "", false, Utc::now());
            prop_assert_eq!(result.is_ok(), amount > 0.0);
        }
    }
}
