//! Location registry domain module (warehouses, stores, shelves...).

pub mod location;

pub use location::{Location, LocationPatch, NewLocation};
