//! Product registry domain module.
//!
//! Products are identified by a caller-chosen id and carry a mutable display name.
//! This crate holds the entity and its input types only (no IO, no storage).

pub mod product;

pub use product::{NewProduct, Product, ProductPatch};
