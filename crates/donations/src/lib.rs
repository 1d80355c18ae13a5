//! Donations domain module.
//!
//! Monetary donations made by users, implemented purely as deterministic
//! domain logic (no IO, no HTTP, no storage).

pub mod donation;

pub use donation::{Donation, DonationStatus};
