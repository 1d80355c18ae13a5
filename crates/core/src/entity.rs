//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Every record the backend persists (users, pets, adoptions, donations) is an
/// entity keyed by a strongly-typed identifier.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + Send + Sync;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
