//! Entity trait: identity that survives every enrichment stage.

/// Entity marker + minimal interface.
///
/// Merged products keep one identity from catalog load through scoring; stages
/// look records up and compare them by this id only.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
