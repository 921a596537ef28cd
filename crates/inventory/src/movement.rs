use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use stockflow_core::{DomainError, DomainResult, Entity, LocationId, MovementId, ProductId};

/// Accepted input format when editing a movement timestamp (minute precision, no timezone).
pub const TIMESTAMP_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Rendering used for both the display form and the edit-input form of a timestamp.
pub const TIMESTAMP_DISPLAY_FORMAT: &str = "%Y-%m-%d | %H:%M";

/// Entity: Movement.
///
/// A single recorded transfer of `qty` units of a product. A `None` origin means the
/// goods came from outside the tracked locations; a `None` destination means they
/// left them. Both `None` is allowed and has no effect on any balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    movement_id: MovementId,
    timestamp: NaiveDateTime,
    product_id: ProductId,
    from_location_id: Option<LocationId>,
    to_location_id: Option<LocationId>,
    qty: i64,
}

impl Movement {
    pub fn new(
        movement_id: MovementId,
        timestamp: NaiveDateTime,
        product_id: ProductId,
        from_location_id: Option<LocationId>,
        to_location_id: Option<LocationId>,
        qty: i64,
    ) -> Self {
        Self {
            movement_id,
            timestamp,
            product_id,
            from_location_id,
            to_location_id,
            qty,
        }
    }

    pub fn movement_id(&self) -> MovementId {
        self.movement_id
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn from_location_id(&self) -> Option<&LocationId> {
        self.from_location_id.as_ref()
    }

    pub fn to_location_id(&self) -> Option<&LocationId> {
        self.to_location_id.as_ref()
    }

    pub fn qty(&self) -> i64 {
        self.qty
    }

    pub fn display_timestamp(&self) -> String {
        format_timestamp(self.timestamp)
    }

    /// Rendering used to pre-fill the edit form.
    pub fn input_timestamp(&self) -> String {
        format_timestamp(self.timestamp)
    }

    /// Apply already-validated changes. Fields absent from `changes` stay as they are.
    pub fn apply(&mut self, changes: &MovementChanges) {
        if let Some(product_id) = &changes.product_id {
            self.product_id = product_id.clone();
        }
        if let Some(from) = &changes.from_location_id {
            self.from_location_id = from.clone();
        }
        if let Some(to) = &changes.to_location_id {
            self.to_location_id = to.clone();
        }
        if let Some(qty) = changes.qty {
            self.qty = qty;
        }
        if let Some(timestamp) = changes.timestamp {
            self.timestamp = timestamp;
        }
    }
}

impl Entity for Movement {
    type Id = MovementId;

    fn id(&self) -> &Self::Id {
        &self.movement_id
    }
}

/// Input: record a new movement. The id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovement {
    pub product_id: ProductId,
    pub from_location_id: Option<LocationId>,
    pub to_location_id: Option<LocationId>,
    pub qty: i64,
    pub timestamp: NaiveDateTime,
}

impl NewMovement {
    /// Validate raw input.
    ///
    /// Blank or absent location ids become `None`; `qty` must parse as an integer.
    pub fn parse(
        product_id: &str,
        from_location_id: Option<&str>,
        to_location_id: Option<&str>,
        qty: &str,
        timestamp: NaiveDateTime,
    ) -> DomainResult<Self> {
        Ok(Self {
            product_id: ProductId::parse(product_id)?,
            from_location_id: normalize_location(from_location_id)?,
            to_location_id: normalize_location(to_location_id)?,
            qty: parse_qty(qty)?,
            timestamp,
        })
    }

    pub fn into_movement(self, movement_id: MovementId) -> Movement {
        Movement::new(
            movement_id,
            self.timestamp,
            self.product_id,
            self.from_location_id,
            self.to_location_id,
            self.qty,
        )
    }

    /// Locations this movement points at (for referential checks).
    pub fn referenced_locations(&self) -> impl Iterator<Item = &LocationId> {
        self.from_location_id
            .iter()
            .chain(self.to_location_id.iter())
    }
}

/// Raw, presence-aware partial update of a movement.
///
/// Outer `None` means "field not supplied". For the location fields the inner value is
/// the raw text, where `None` or blank detaches the movement from that side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovementPatch {
    pub product_id: Option<String>,
    pub from_location_id: Option<Option<String>>,
    pub to_location_id: Option<Option<String>>,
    pub qty: Option<String>,
    pub timestamp: Option<String>,
}

impl MovementPatch {
    /// Validate every supplied field before anything is applied.
    ///
    /// When several fields are invalid the first one in field order is reported
    /// (quantity before timestamp).
    pub fn validate(&self) -> DomainResult<MovementChanges> {
        let product_id = self
            .product_id
            .as_deref()
            .map(ProductId::parse)
            .transpose()?;
        let from_location_id = self
            .from_location_id
            .as_ref()
            .map(|raw| normalize_location(raw.as_deref()))
            .transpose()?;
        let to_location_id = self
            .to_location_id
            .as_ref()
            .map(|raw| normalize_location(raw.as_deref()))
            .transpose()?;
        let qty = self.qty.as_deref().map(parse_qty).transpose()?;
        let timestamp = self
            .timestamp
            .as_deref()
            .map(parse_timestamp_input)
            .transpose()?;

        Ok(MovementChanges {
            product_id,
            from_location_id,
            to_location_id,
            qty,
            timestamp,
        })
    }
}

/// Validated partial update of a movement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovementChanges {
    pub product_id: Option<ProductId>,
    pub from_location_id: Option<Option<LocationId>>,
    pub to_location_id: Option<Option<LocationId>>,
    pub qty: Option<i64>,
    pub timestamp: Option<NaiveDateTime>,
}

impl MovementChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Locations newly pointed at by this update (for referential checks).
    pub fn referenced_locations(&self) -> impl Iterator<Item = &LocationId> {
        self.from_location_id
            .iter()
            .flatten()
            .chain(self.to_location_id.iter().flatten())
    }
}

/// Parse a quantity: optional sign followed by decimal digits, surrounding whitespace ignored.
///
/// Zero and negative values are accepted.
pub fn parse_qty(raw: &str) -> DomainResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| DomainError::invalid_quantity(format!("'{raw}' is not an integer")))
}

/// Parse an edited timestamp in `YYYY-MM-DDTHH:MM` form.
pub fn parse_timestamp_input(raw: &str) -> DomainResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_INPUT_FORMAT).map_err(|e| {
        DomainError::invalid_timestamp(format!("'{raw}' does not match YYYY-MM-DDTHH:MM ({e})"))
    })
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_DISPLAY_FORMAT).to_string()
}

/// Blank or absent location ids mean "external source/sink".
pub fn normalize_location(raw: Option<&str>) -> DomainResult<Option<LocationId>> {
    match raw {
        Some(s) if !s.trim().is_empty() => Ok(Some(LocationId::parse(s)?)),
        _ => Ok(None),
    }
}
