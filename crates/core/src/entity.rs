//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// The identifier of an entity never changes once it has been created; only its
/// other attributes (display names, quantities, ...) may be edited.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
