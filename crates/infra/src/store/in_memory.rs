use std::sync::RwLock;

use stockflow_core::{LocationId, MovementId, ProductId};
use stockflow_inventory::{Movement, MovementChanges, NewMovement};
use stockflow_locations::{Location, LocationPatch};
use stockflow_products::{Product, ProductPatch};

use super::{EntityKind, InventoryStore, StoreError};

#[derive(Debug, Default)]
struct State {
    products: Vec<Product>,
    locations: Vec<Location>,
    movements: Vec<Movement>,
    last_movement_id: i64,
}

impl State {
    fn has_product(&self, product_id: &ProductId) -> bool {
        self.products.iter().any(|p| p.product_id() == product_id)
    }

    fn has_location(&self, location_id: &LocationId) -> bool {
        self.locations.iter().any(|l| l.location_id() == location_id)
    }

    fn ensure_references<'a>(
        &self,
        product_id: Option<&ProductId>,
        mut locations: impl Iterator<Item = &'a LocationId>,
    ) -> Result<(), StoreError> {
        if let Some(product_id) = product_id {
            if !self.has_product(product_id) {
                return Err(StoreError::not_found(EntityKind::Product, product_id));
            }
        }
        if let Some(missing) = locations.find(|l| !self.has_location(l)) {
            return Err(StoreError::not_found(EntityKind::Location, missing));
        }
        Ok(())
    }
}

/// In-memory inventory store.
///
/// Intended for tests/dev. Not optimized for performance. A single lock guards all
/// three collections, so existence checks and writes never interleave.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    state: RwLock<State>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.read()?.products.clone())
    }

    async fn insert_product(&self, product: Product) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if state.has_product(product.product_id()) {
            return Err(StoreError::duplicate(EntityKind::Product, product.product_id()));
        }
        state.products.push(product);
        Ok(())
    }

    async fn update_product(&self, product_id: &ProductId, patch: &ProductPatch) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let product = state
            .products
            .iter_mut()
            .find(|p| p.product_id() == product_id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Product, product_id))?;
        product.apply(patch);
        Ok(())
    }

    async fn list_locations(&self) -> Result<Vec<Location>, StoreError> {
        Ok(self.read()?.locations.clone())
    }

    async fn insert_location(&self, location: Location) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if state.has_location(location.location_id()) {
            return Err(StoreError::duplicate(EntityKind::Location, location.location_id()));
        }
        state.locations.push(location);
        Ok(())
    }

    async fn update_location(
        &self,
        location_id: &LocationId,
        patch: &LocationPatch,
    ) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let location = state
            .locations
            .iter_mut()
            .find(|l| l.location_id() == location_id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Location, location_id))?;
        location.apply(patch);
        Ok(())
    }

    async fn list_movements(&self) -> Result<Vec<Movement>, StoreError> {
        Ok(self.read()?.movements.clone())
    }

    async fn insert_movement(&self, movement: NewMovement) -> Result<MovementId, StoreError> {
        let mut state = self.write()?;
        state.ensure_references(Some(&movement.product_id), movement.referenced_locations())?;

        // Ids are append-only and strictly increasing.
        state.last_movement_id += 1;
        let movement_id = MovementId::new(state.last_movement_id);
        state.movements.push(movement.into_movement(movement_id));
        Ok(movement_id)
    }

    async fn update_movement(
        &self,
        movement_id: MovementId,
        changes: &MovementChanges,
    ) -> Result<Movement, StoreError> {
        let mut state = self.write()?;
        let idx = state
            .movements
            .iter()
            .position(|m| m.movement_id() == movement_id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Movement, movement_id))?;
        state.ensure_references(changes.product_id.as_ref(), changes.referenced_locations())?;

        let movement = &mut state.movements[idx];
        movement.apply(changes);
        Ok(movement.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn test_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    async fn seeded() -> InMemoryInventoryStore {
        let store = InMemoryInventoryStore::new();
        store
            .insert_product(Product::new(ProductId::parse("P1").unwrap(), "Widget"))
            .await
            .unwrap();
        store
            .insert_location(Location::new(LocationId::parse("L1").unwrap(), "Warehouse"))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn duplicate_product_leaves_original_untouched() {
        let store = seeded().await;
        let err = store
            .insert_product(Product::new(ProductId::parse("P1").unwrap(), "Impostor"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { entity: EntityKind::Product, .. }));

        let products = store.list_products().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name(), "Widget");
    }

    #[tokio::test]
    async fn update_missing_location_is_not_found() {
        let store = seeded().await;
        let err = store
            .update_location(
                &LocationId::parse("NOPE").unwrap(),
                &LocationPatch {
                    name: Some("x".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::not_found(EntityKind::Location, "NOPE"));
    }

    #[tokio::test]
    async fn movement_ids_increase_monotonically() {
        let store = seeded().await;
        let mut ids = Vec::new();
        for qty in 1..=3 {
            let m = NewMovement::parse("P1", None, Some("L1"), &qty.to_string(), test_time()).unwrap();
            ids.push(store.insert_movement(m).await.unwrap());
        }
        assert_eq!(ids, vec![MovementId::new(1), MovementId::new(2), MovementId::new(3)]);
    }

    #[tokio::test]
    async fn movement_with_unknown_references_is_rejected() {
        let store = seeded().await;

        let m = NewMovement::parse("P9", None, Some("L1"), "1", test_time()).unwrap();
        assert_eq!(
            store.insert_movement(m).await.unwrap_err(),
            StoreError::not_found(EntityKind::Product, "P9")
        );

        let m = NewMovement::parse("P1", Some("L9"), Some("L1"), "1", test_time()).unwrap();
        assert_eq!(
            store.insert_movement(m).await.unwrap_err(),
            StoreError::not_found(EntityKind::Location, "L9")
        );

        assert!(store.list_movements().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_movement_update_changes_nothing() {
        let store = seeded().await;
        let id = store
            .insert_movement(NewMovement::parse("P1", None, Some("L1"), "5", test_time()).unwrap())
            .await
            .unwrap();

        let changes = MovementChanges {
            qty: Some(50),
            to_location_id: Some(Some(LocationId::parse("L9").unwrap())),
            ..MovementChanges::default()
        };
        assert!(store.update_movement(id, &changes).await.is_err());

        let stored = store.list_movements().await.unwrap().remove(0);
        assert_eq!(stored.qty(), 5);
        assert_eq!(stored.to_location_id().map(|l| l.as_str()), Some("L1"));
    }
}
