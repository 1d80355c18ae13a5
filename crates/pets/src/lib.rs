//! Pets domain module.
//!
//! Business rules for pets listed for adoption, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod pet;

pub use pet::{NewPet, Pet, PetChanges, PetStatus};
