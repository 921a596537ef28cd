//! SQLite-backed inventory store.
//!
//! ## Error Mapping
//!
//! | SQLx error | StoreError | Scenario |
//! |------------|------------|----------|
//! | Database (unique violation) | `Duplicate` | Insert of an existing product/location id |
//! | Database (foreign key violation) | `NotFound` | Movement references a missing product/location |
//! | Anything else | `Backend` | IO, pool closed, decode failures... |
//!
//! Referenced ids are also checked explicitly inside the write transaction so the error
//! can name the missing record; the foreign keys stay on as a backstop.

use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use tracing::instrument;

use stockflow_core::{LocationId, MovementId, ProductId};
use stockflow_inventory::{Movement, MovementChanges, NewMovement};
use stockflow_locations::{Location, LocationPatch};
use stockflow_products::{Product, ProductPatch};

use super::{EntityKind, InventoryStore, StoreError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS product (
        product_id TEXT PRIMARY KEY NOT NULL,
        name       TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS location (
        location_id TEXT PRIMARY KEY NOT NULL,
        name        TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS product_movement (
        movement_id      INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp        TEXT NOT NULL,
        from_location_id TEXT NULL REFERENCES location (location_id),
        to_location_id   TEXT NULL REFERENCES location (location_id),
        product_id       TEXT NOT NULL REFERENCES product (product_id),
        qty              INTEGER NOT NULL
    )
    "#,
];

/// SQLite-backed inventory store.
///
/// `SqlitePool` is `Send + Sync` and cheap to clone; every write runs in its own
/// statement or transaction.
#[derive(Debug, Clone)]
pub struct SqliteInventoryStore {
    pool: SqlitePool,
}

#[derive(Debug, FromRow)]
struct ProductRow {
    product_id: String,
    name: String,
}

#[derive(Debug, FromRow)]
struct LocationRow {
    location_id: String,
    name: String,
}

#[derive(Debug, FromRow)]
struct MovementRow {
    movement_id: i64,
    timestamp: NaiveDateTime,
    product_id: String,
    from_location_id: Option<String>,
    to_location_id: Option<String>,
    qty: i64,
}

impl ProductRow {
    fn into_product(self) -> Result<Product, StoreError> {
        Ok(Product::new(parse_stored(ProductId::parse(&self.product_id))?, self.name))
    }
}

impl LocationRow {
    fn into_location(self) -> Result<Location, StoreError> {
        Ok(Location::new(parse_stored(LocationId::parse(&self.location_id))?, self.name))
    }
}

impl MovementRow {
    fn into_movement(self) -> Result<Movement, StoreError> {
        let location = |raw: Option<String>| {
            raw.map(|id| parse_stored(LocationId::parse(&id))).transpose()
        };
        Ok(Movement::new(
            MovementId::new(self.movement_id),
            self.timestamp,
            parse_stored(ProductId::parse(&self.product_id))?,
            location(self.from_location_id)?,
            location(self.to_location_id)?,
            self.qty,
        ))
    }
}

fn parse_stored<T>(result: Result<T, stockflow_core::DomainError>) -> Result<T, StoreError> {
    result.map_err(|e| StoreError::Backend(format!("corrupt row: {e}")))
}

fn map_sqlx_error(operation: &str, e: sqlx::Error) -> StoreError {
    StoreError::Backend(format!("{operation}: {e}"))
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_foreign_key_violation())
        .unwrap_or(false)
}

impl SqliteInventoryStore {
    /// Wrap an existing pool. Call [`SqliteInventoryStore::migrate`] before use.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `url` and apply the schema.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| map_sqlx_error("parse_database_url", e))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Single-connection in-memory database (each `:memory:` connection is its own database).
    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::connect("sqlite::memory:", 1).await
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        Ok(())
    }

    async fn exists(
        tx: &mut Transaction<'_, Sqlite>,
        entity: EntityKind,
        id: &str,
    ) -> Result<bool, StoreError> {
        let sql = match entity {
            EntityKind::Product => "SELECT 1 FROM product WHERE product_id = ?1",
            EntityKind::Location => "SELECT 1 FROM location WHERE location_id = ?1",
            EntityKind::Movement => "SELECT 1 FROM product_movement WHERE movement_id = ?1",
        };
        let row = sqlx::query(sql)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("exists", e))?;
        Ok(row.is_some())
    }

    async fn ensure_references<'a>(
        tx: &mut Transaction<'_, Sqlite>,
        product_id: Option<&ProductId>,
        locations: impl Iterator<Item = &'a LocationId>,
    ) -> Result<(), StoreError> {
        if let Some(product_id) = product_id {
            if !Self::exists(tx, EntityKind::Product, product_id.as_str()).await? {
                return Err(StoreError::not_found(EntityKind::Product, product_id));
            }
        }
        for location_id in locations {
            if !Self::exists(tx, EntityKind::Location, location_id.as_str()).await? {
                return Err(StoreError::not_found(EntityKind::Location, location_id));
            }
        }
        Ok(())
    }

    async fn fetch_movement(
        tx: &mut Transaction<'_, Sqlite>,
        movement_id: MovementId,
    ) -> Result<Option<Movement>, StoreError> {
        sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT movement_id, timestamp, product_id, from_location_id, to_location_id, qty
            FROM product_movement
            WHERE movement_id = ?1
            "#,
        )
        .bind(movement_id.value())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("fetch_movement", e))?
        .map(MovementRow::into_movement)
        .transpose()
    }
}

#[async_trait::async_trait]
impl InventoryStore for SqliteInventoryStore {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        sqlx::query_as::<_, ProductRow>("SELECT product_id, name FROM product ORDER BY rowid")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?
            .into_iter()
            .map(ProductRow::into_product)
            .collect()
    }

    #[instrument(skip(self, product), fields(product_id = %product.product_id()))]
    async fn insert_product(&self, product: Product) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO product (product_id, name) VALUES (?1, ?2)")
            .bind(product.product_id().as_str())
            .bind(product.name())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::duplicate(EntityKind::Product, product.product_id())
                } else {
                    map_sqlx_error("insert_product", e)
                }
            })?;
        Ok(())
    }

    #[instrument(skip(self, patch))]
    async fn update_product(&self, product_id: &ProductId, patch: &ProductPatch) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE product SET name = COALESCE(?1, name) WHERE product_id = ?2")
            .bind(patch.name.as_deref())
            .bind(product_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_product", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(EntityKind::Product, product_id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_locations(&self) -> Result<Vec<Location>, StoreError> {
        sqlx::query_as::<_, LocationRow>("SELECT location_id, name FROM location ORDER BY rowid")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_locations", e))?
            .into_iter()
            .map(LocationRow::into_location)
            .collect()
    }

    #[instrument(skip(self, location), fields(location_id = %location.location_id()))]
    async fn insert_location(&self, location: Location) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO location (location_id, name) VALUES (?1, ?2)")
            .bind(location.location_id().as_str())
            .bind(location.name())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::duplicate(EntityKind::Location, location.location_id())
                } else {
                    map_sqlx_error("insert_location", e)
                }
            })?;
        Ok(())
    }

    #[instrument(skip(self, patch))]
    async fn update_location(
        &self,
        location_id: &LocationId,
        patch: &LocationPatch,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE location SET name = COALESCE(?1, name) WHERE location_id = ?2")
            .bind(patch.name.as_deref())
            .bind(location_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_location", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(EntityKind::Location, location_id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_movements(&self) -> Result<Vec<Movement>, StoreError> {
        sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT movement_id, timestamp, product_id, from_location_id, to_location_id, qty
            FROM product_movement
            ORDER BY movement_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_movements", e))?
        .into_iter()
        .map(MovementRow::into_movement)
        .collect()
    }

    #[instrument(skip(self, movement), fields(product_id = %movement.product_id, qty = movement.qty))]
    async fn insert_movement(&self, movement: NewMovement) -> Result<MovementId, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        Self::ensure_references(&mut tx, Some(&movement.product_id), movement.referenced_locations())
            .await?;

        let result = sqlx::query(
            r#"
            INSERT INTO product_movement (timestamp, from_location_id, to_location_id, product_id, qty)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(movement.timestamp)
        .bind(movement.from_location_id.as_ref().map(LocationId::as_str))
        .bind(movement.to_location_id.as_ref().map(LocationId::as_str))
        .bind(movement.product_id.as_str())
        .bind(movement.qty)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                StoreError::not_found(EntityKind::Product, &movement.product_id)
            } else {
                map_sqlx_error("insert_movement", e)
            }
        })?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(MovementId::new(result.last_insert_rowid()))
    }

    #[instrument(skip(self, changes))]
    async fn update_movement(
        &self,
        movement_id: MovementId,
        changes: &MovementChanges,
    ) -> Result<Movement, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        let mut movement = Self::fetch_movement(&mut tx, movement_id)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Movement, movement_id))?;
        if changes.is_empty() {
            return Ok(movement);
        }
        Self::ensure_references(&mut tx, changes.product_id.as_ref(), changes.referenced_locations())
            .await?;

        movement.apply(changes);

        sqlx::query(
            r#"
            UPDATE product_movement
            SET timestamp = ?1,
                from_location_id = ?2,
                to_location_id = ?3,
                product_id = ?4,
                qty = ?5
            WHERE movement_id = ?6
            "#,
        )
        .bind(movement.timestamp())
        .bind(movement.from_location_id().map(LocationId::as_str))
        .bind(movement.to_location_id().map(LocationId::as_str))
        .bind(movement.product_id().as_str())
        .bind(movement.qty())
        .bind(movement_id.value())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                StoreError::not_found(EntityKind::Movement, movement_id)
            } else {
                map_sqlx_error("update_movement", e)
            }
        })?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(movement)
    }
}
