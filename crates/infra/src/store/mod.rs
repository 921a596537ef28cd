//! Storage abstraction for products, locations and movements.
//!
//! The service layer receives a store explicitly (no global connection handle), so
//! tests can swap the SQLite store for the in-memory one.

pub mod in_memory;
pub mod sqlite;

use stockflow_core::{LocationId, MovementId, ProductId};
use stockflow_inventory::{Movement, MovementChanges, NewMovement};
use stockflow_locations::{Location, LocationPatch};
use stockflow_products::{Product, ProductPatch};

pub use in_memory::InMemoryInventoryStore;
pub use sqlite::SqliteInventoryStore;

/// Which kind of record a store error is about.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntityKind {
    Product,
    Location,
    Movement,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Product => "product",
            EntityKind::Location => "location",
            EntityKind::Movement => "movement",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} '{id}' already exists")]
    Duplicate { entity: EntityKind, id: String },
    #[error("{entity} '{id}' not found")]
    NotFound { entity: EntityKind, id: String },
    #[error("storage error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn duplicate(entity: EntityKind, id: impl ToString) -> Self {
        Self::Duplicate {
            entity,
            id: id.to_string(),
        }
    }

    pub fn not_found(entity: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Persistent store for the three inventory record types.
///
/// Every write is a single atomic unit:
/// - inserts of products/locations are insert-if-absent (`Duplicate` otherwise)
/// - updates match on the identifier and report `NotFound` when nothing matched
/// - movement writes check that the referenced product and locations exist in the
///   same critical section as the write
///
/// Listings return records in insertion order (movements by ascending id).
#[async_trait::async_trait]
pub trait InventoryStore: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    async fn insert_product(&self, product: Product) -> Result<(), StoreError>;

    async fn update_product(&self, product_id: &ProductId, patch: &ProductPatch) -> Result<(), StoreError>;

    async fn list_locations(&self) -> Result<Vec<Location>, StoreError>;

    async fn insert_location(&self, location: Location) -> Result<(), StoreError>;

    async fn update_location(
        &self,
        location_id: &LocationId,
        patch: &LocationPatch,
    ) -> Result<(), StoreError>;

    async fn list_movements(&self) -> Result<Vec<Movement>, StoreError>;

    /// Append a movement and return its freshly assigned id.
    async fn insert_movement(&self, movement: NewMovement) -> Result<MovementId, StoreError>;

    /// Apply validated changes to an existing movement and return the updated record.
    async fn update_movement(
        &self,
        movement_id: MovementId,
        changes: &MovementChanges,
    ) -> Result<Movement, StoreError>;
}
