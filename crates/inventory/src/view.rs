//! Denormalized movement rows for the movement listing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use stockflow_core::{LocationId, MovementId, ProductId};
use stockflow_locations::Location;
use stockflow_products::Product;

use crate::movement::Movement;

/// A movement with the current product/location names resolved and both
/// timestamp renderings precomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementView {
    pub movement_id: MovementId,
    pub timestamp: String,
    pub timestamp_input: String,
    pub product_id: ProductId,
    pub product_name: Option<String>,
    pub from_location_id: Option<LocationId>,
    pub from_location_name: Option<String>,
    pub to_location_id: Option<LocationId>,
    pub to_location_name: Option<String>,
    pub qty: i64,
}

/// Build views in the order the movements are given.
pub fn movement_views(
    products: &[Product],
    locations: &[Location],
    movements: &[Movement],
) -> Vec<MovementView> {
    let product_names: HashMap<&ProductId, &str> = products
        .iter()
        .map(|p| (p.product_id(), p.name()))
        .collect();
    let location_names: HashMap<&LocationId, &str> = locations
        .iter()
        .map(|l| (l.location_id(), l.name()))
        .collect();
    let location_name = |id: Option<&LocationId>| {
        id.and_then(|id| location_names.get(id))
            .map(|name| name.to_string())
    };

    movements
        .iter()
        .map(|m| MovementView {
            movement_id: m.movement_id(),
            timestamp: m.display_timestamp(),
            timestamp_input: m.input_timestamp(),
            product_id: m.product_id().clone(),
            product_name: product_names.get(m.product_id()).map(|n| n.to_string()),
            from_location_id: m.from_location_id().cloned(),
            from_location_name: location_name(m.from_location_id()),
            to_location_id: m.to_location_id().cloned(),
            to_location_name: location_name(m.to_location_id()),
            qty: m.qty(),
        })
        .collect()
}
