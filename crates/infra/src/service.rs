//! Inventory service: the logical operations exposed to the HTTP layer.
//!
//! Every operation runs to completion against the injected store; there is no
//! in-process locking beyond what the store itself does for a single write.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use stockflow_core::{DomainError, LocationId, MovementId, ProductId};
use stockflow_inventory::{
    BalanceLine, Movement, MovementPatch, MovementView, NewMovement, compute_balances,
    movement_views,
};
use stockflow_locations::{Location, LocationPatch, NewLocation};
use stockflow_products::{NewProduct, Product, ProductPatch};

use crate::store::{InventoryStore, StoreError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// User/input errors (as opposed to storage failures).
    pub fn is_user_error(&self) -> bool {
        !matches!(self, ServiceError::Store(StoreError::Backend(_)))
    }
}

/// Raw input for recording a movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMovement {
    pub product_id: String,
    pub from_location_id: Option<String>,
    pub to_location_id: Option<String>,
    pub qty: String,
}

/// Movement listing plus the registries needed to render selection inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovementReport {
    pub products: Vec<Product>,
    pub locations: Vec<Location>,
    pub movements: Vec<MovementView>,
}

#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
}

impl core::fmt::Debug for InventoryService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InventoryService").finish_non_exhaustive()
    }
}

fn log_outcome<T>(operation: &'static str, result: &Result<T, ServiceError>) {
    match result {
        Ok(_) => tracing::info!(operation, "succeeded"),
        Err(e) if e.is_user_error() => tracing::info!(operation, error = %e, "rejected"),
        Err(e) => tracing::error!(operation, error = %e, "failed"),
    }
}

impl InventoryService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    // -------------------------
    // Products
    // -------------------------

    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ServiceError> {
        Ok(self.store.list_products().await?)
    }

    #[instrument(skip(self, name))]
    pub async fn add_product(&self, product_id: &str, name: String) -> Result<Product, ServiceError> {
        let result: Result<Product, ServiceError> = async {
            let product = NewProduct::parse(product_id, name)?.into_product();
            self.store.insert_product(product.clone()).await?;
            Ok(product)
        }
        .await;
        log_outcome("add_product", &result);
        result
    }

    #[instrument(skip(self, patch))]
    pub async fn update_product(&self, product_id: &str, patch: ProductPatch) -> Result<(), ServiceError> {
        let result: Result<(), ServiceError> = async {
            let product_id = ProductId::parse(product_id)?;
            self.store.update_product(&product_id, &patch).await?;
            Ok(())
        }
        .await;
        log_outcome("update_product", &result);
        result
    }

    // -------------------------
    // Locations
    // -------------------------

    #[instrument(skip(self))]
    pub async fn list_locations(&self) -> Result<Vec<Location>, ServiceError> {
        Ok(self.store.list_locations().await?)
    }

    #[instrument(skip(self, name))]
    pub async fn add_location(&self, location_id: &str, name: String) -> Result<Location, ServiceError> {
        let result: Result<Location, ServiceError> = async {
            let location = NewLocation::parse(location_id, name)?.into_location();
            self.store.insert_location(location.clone()).await?;
            Ok(location)
        }
        .await;
        log_outcome("add_location", &result);
        result
    }

    #[instrument(skip(self, patch))]
    pub async fn update_location(&self, location_id: &str, patch: LocationPatch) -> Result<(), ServiceError> {
        let result: Result<(), ServiceError> = async {
            let location_id = LocationId::parse(location_id)?;
            self.store.update_location(&location_id, &patch).await?;
            Ok(())
        }
        .await;
        log_outcome("update_location", &result);
        result
    }

    // -------------------------
    // Movements
    // -------------------------

    #[instrument(skip(self))]
    pub async fn list_movements(&self) -> Result<MovementReport, ServiceError> {
        let products = self.store.list_products().await?;
        let locations = self.store.list_locations().await?;
        let movements = self.store.list_movements().await?;

        let views = movement_views(&products, &locations, &movements);
        Ok(MovementReport {
            products,
            locations,
            movements: views,
        })
    }

    /// Record a movement stamped with `recorded_at` (the caller passes the current time).
    #[instrument(skip(self, input), fields(product_id = %input.product_id))]
    pub async fn record_movement(
        &self,
        input: RecordMovement,
        recorded_at: NaiveDateTime,
    ) -> Result<MovementId, ServiceError> {
        let result: Result<MovementId, ServiceError> = async {
            let movement = NewMovement::parse(
                &input.product_id,
                input.from_location_id.as_deref(),
                input.to_location_id.as_deref(),
                &input.qty,
                recorded_at,
            )?;
            Ok(self.store.insert_movement(movement).await?)
        }
        .await;
        log_outcome("record_movement", &result);
        if let Ok(id) = &result {
            tracing::debug!(movement_id = %id, "movement recorded");
        }
        result
    }

    /// Validate every supplied field, then apply them all in one store write.
    #[instrument(skip(self, patch))]
    pub async fn update_movement(
        &self,
        movement_id: MovementId,
        patch: MovementPatch,
    ) -> Result<Movement, ServiceError> {
        let result: Result<Movement, ServiceError> = async {
            let changes = patch.validate()?;
            Ok(self.store.update_movement(movement_id, &changes).await?)
        }
        .await;
        log_outcome("update_movement", &result);
        result
    }

    // -------------------------
    // Reports
    // -------------------------

    #[instrument(skip(self))]
    pub async fn balance_report(&self) -> Result<Vec<BalanceLine>, ServiceError> {
        let products = self.store.list_products().await?;
        let locations = self.store.list_locations().await?;
        let movements = self.store.list_movements().await?;

        let lines = compute_balances(&products, &locations, &movements);
        tracing::debug!(
            products = products.len(),
            locations = locations.len(),
            movements = movements.len(),
            "balance report computed"
        );
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{EntityKind, InMemoryInventoryStore, SqliteInventoryStore};
    use chrono::{NaiveDate, Utc};

    fn test_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn record(product: &str, from: Option<&str>, to: Option<&str>, qty: &str) -> RecordMovement {
        RecordMovement {
            product_id: product.to_string(),
            from_location_id: from.map(str::to_string),
            to_location_id: to.map(str::to_string),
            qty: qty.to_string(),
        }
    }

    async fn seeded(store: Arc<dyn InventoryStore>) -> InventoryService {
        let svc = InventoryService::new(store);
        svc.add_product("P1", "Widget".to_string()).await.unwrap();
        svc.add_location("L1", "Warehouse".to_string()).await.unwrap();
        svc.add_location("L2", "Store".to_string()).await.unwrap();
        svc
    }

    async fn services() -> Vec<InventoryService> {
        vec![
            seeded(Arc::new(InMemoryInventoryStore::new())).await,
            seeded(Arc::new(SqliteInventoryStore::in_memory().await.unwrap())).await,
        ]
    }

    #[tokio::test]
    async fn warehouse_to_store_balances() {
        for svc in services().await {
            svc.record_movement(record("P1", None, Some("L1"), "10"), test_time())
                .await
                .unwrap();
            svc.record_movement(record("P1", Some("L1"), Some("L2"), "4"), test_time())
                .await
                .unwrap();

            let lines: Vec<_> = svc
                .balance_report()
                .await
                .unwrap()
                .into_iter()
                .map(|l| (l.location_name, l.net_qty))
                .collect();
            assert_eq!(
                lines,
                vec![("Warehouse".to_string(), 6), ("Store".to_string(), 4)]
            );
        }
    }

    #[tokio::test]
    async fn duplicate_add_is_rejected_and_record_kept() {
        for svc in services().await {
            let err = svc.add_product("P1", "Other".to_string()).await.unwrap_err();
            assert!(matches!(
                err,
                ServiceError::Store(StoreError::Duplicate { entity: EntityKind::Product, .. })
            ));
            assert!(err.is_user_error());

            let products = svc.list_products().await.unwrap();
            assert_eq!(products.len(), 1);
            assert_eq!(products[0].name(), "Widget");
        }
    }

    #[tokio::test]
    async fn update_renames_only_when_name_present() {
        for svc in services().await {
            svc.update_location("L1", LocationPatch::default()).await.unwrap();
            assert_eq!(svc.list_locations().await.unwrap()[0].name(), "Warehouse");

            svc.update_location(
                "L1",
                LocationPatch {
                    name: Some("Main".to_string()),
                },
            )
            .await
            .unwrap();
            assert_eq!(svc.list_locations().await.unwrap()[0].name(), "Main");

            let err = svc
                .update_product("NOPE", ProductPatch::default())
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::Store(StoreError::NotFound { .. })));
        }
    }

    #[tokio::test]
    async fn invalid_qty_records_nothing() {
        for svc in services().await {
            let err = svc
                .record_movement(record("P1", None, Some("L1"), "lots"), test_time())
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::Domain(DomainError::InvalidQuantity(_))));
            assert!(svc.list_movements().await.unwrap().movements.is_empty());
        }
    }

    #[tokio::test]
    async fn failed_update_leaves_movement_unchanged() {
        for svc in services().await {
            let id = svc
                .record_movement(record("P1", None, Some("L1"), "10"), test_time())
                .await
                .unwrap();

            let patch = MovementPatch {
                to_location_id: Some(Some("L2".to_string())),
                qty: Some("ten".to_string()),
                ..MovementPatch::default()
            };
            let err = svc.update_movement(id, patch).await.unwrap_err();
            assert!(matches!(err, ServiceError::Domain(DomainError::InvalidQuantity(_))));

            let report = svc.list_movements().await.unwrap();
            let view = &report.movements[0];
            assert_eq!(view.qty, 10);
            assert_eq!(view.to_location_id.as_ref().map(|l| l.as_str()), Some("L1"));

            let patch = MovementPatch {
                timestamp: Some("yesterday".to_string()),
                ..MovementPatch::default()
            };
            let err = svc.update_movement(id, patch).await.unwrap_err();
            assert!(matches!(err, ServiceError::Domain(DomainError::InvalidTimestamp(_))));
        }
    }

    #[tokio::test]
    async fn timestamp_update_round_trips() {
        for svc in services().await {
            let id = svc
                .record_movement(record("P1", None, Some("L1"), "1"), test_time())
                .await
                .unwrap();
            svc.update_movement(
                id,
                MovementPatch {
                    timestamp: Some("2024-01-15T09:30".to_string()),
                    ..MovementPatch::default()
                },
            )
            .await
            .unwrap();

            let view = svc.list_movements().await.unwrap().movements.remove(0);
            assert_eq!(view.timestamp, "2024-01-15 | 09:30");
            assert_eq!(view.timestamp_input, "2024-01-15 | 09:30");
        }
    }

    #[tokio::test]
    async fn update_of_missing_movement_is_not_found() {
        for svc in services().await {
            let err = svc
                .update_movement(MovementId::new(404), MovementPatch::default())
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ServiceError::Store(StoreError::NotFound { entity: EntityKind::Movement, .. })
            ));
        }
    }

    #[tokio::test]
    async fn movement_listing_denormalizes_names() {
        for svc in services().await {
            let before = Utc::now().naive_utc();
            svc.record_movement(record("P1", Some(""), Some("L2"), "3"), Utc::now().naive_utc())
                .await
                .unwrap();

            let report = svc.list_movements().await.unwrap();
            assert_eq!(report.products.len(), 1);
            assert_eq!(report.locations.len(), 2);

            let view = &report.movements[0];
            assert_eq!(view.product_name.as_deref(), Some("Widget"));
            assert_eq!(view.from_location_id, None);
            assert_eq!(view.from_location_name, None);
            assert_eq!(view.to_location_name.as_deref(), Some("Store"));
            assert!(view.timestamp >= stockflow_inventory::format_timestamp(before));
        }
    }

    #[tokio::test]
    async fn unanchored_movement_changes_no_balance() {
        for svc in services().await {
            svc.record_movement(record("P1", None, None, "99"), test_time())
                .await
                .unwrap();
            assert!(svc.balance_report().await.unwrap().iter().all(|l| l.net_qty == 0));
        }
    }

    #[tokio::test]
    async fn report_survives_quantities_at_i64_max() {
        for svc in services().await {
            let max = i64::MAX.to_string();
            for _ in 0..2 {
                svc.record_movement(record("P1", None, Some("L1"), &max), test_time())
                    .await
                    .unwrap();
            }

            let lines = svc.balance_report().await.unwrap();
            assert_eq!(lines[0].net_qty, 2 * i128::from(i64::MAX));
            assert_eq!(lines[1].net_qty, 0);
        }
    }

    #[tokio::test]
    async fn unknown_reference_is_not_found() {
        for svc in services().await {
            let err = svc
                .record_movement(record("P404", None, Some("L1"), "1"), test_time())
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ServiceError::Store(StoreError::NotFound { entity: EntityKind::Product, .. })
            ));
        }
    }
}
