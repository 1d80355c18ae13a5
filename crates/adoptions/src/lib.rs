//! Adoptions domain module.
//!
//! Adoption requests linking an applicant to a pet, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod adoption;

pub use adoption::{Adoption, AdoptionStatus};
