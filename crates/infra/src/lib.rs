//! Infrastructure layer: storage backends, service wiring, config.

pub mod config;
pub mod service;
pub mod store;

pub use config::{AppConfig, ConfigError, StoreBackend};
pub use service::{InventoryService, MovementReport, RecordMovement, ServiceError};
pub use store::{EntityKind, InMemoryInventoryStore, InventoryStore, SqliteInventoryStore, StoreError};
