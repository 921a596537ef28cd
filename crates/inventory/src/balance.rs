//! Balance aggregation: net quantity per (product, location) derived from movement history.
//!
//! Balances are never stored. They are recomputed from the full set of movements every
//! time a report is requested, so there is nothing to invalidate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use stockflow_core::{LocationId, ProductId};
use stockflow_locations::Location;
use stockflow_products::Product;

use crate::movement::Movement;

/// One row of the balance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub location_id: LocationId,
    pub location_name: String,
    /// Widened so sums of extreme recorded quantities cannot overflow.
    pub net_qty: i128,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Flow {
    inflow: i128,
    outflow: i128,
}

/// Movement totals grouped by product, then location.
///
/// Built in one pass over the movements; each lookup afterwards is O(1).
#[derive(Debug, Default, Clone)]
pub struct BalanceIndex {
    flows: HashMap<ProductId, HashMap<LocationId, Flow>>,
}

impl BalanceIndex {
    pub fn build<'a>(movements: impl IntoIterator<Item = &'a Movement>) -> Self {
        let mut index = Self::default();
        for m in movements {
            if let Some(to) = m.to_location_id() {
                index.flow_mut(m.product_id(), to).inflow += i128::from(m.qty());
            }
            if let Some(from) = m.from_location_id() {
                index.flow_mut(m.product_id(), from).outflow += i128::from(m.qty());
            }
        }
        index
    }

    fn flow_mut(&mut self, product_id: &ProductId, location_id: &LocationId) -> &mut Flow {
        self.flows
            .entry(product_id.clone())
            .or_default()
            .entry(location_id.clone())
            .or_default()
    }

    fn flow(&self, product_id: &ProductId, location_id: &LocationId) -> Flow {
        self.flows
            .get(product_id)
            .and_then(|by_location| by_location.get(location_id))
            .copied()
            .unwrap_or_default()
    }

    /// Sum of quantities moved into `location_id` for `product_id` (0 when none).
    pub fn in_qty(&self, product_id: &ProductId, location_id: &LocationId) -> i128 {
        self.flow(product_id, location_id).inflow
    }

    /// Sum of quantities moved out of `location_id` for `product_id` (0 when none).
    pub fn out_qty(&self, product_id: &ProductId, location_id: &LocationId) -> i128 {
        self.flow(product_id, location_id).outflow
    }

    pub fn net_qty(&self, product_id: &ProductId, location_id: &LocationId) -> i128 {
        let flow = self.flow(product_id, location_id);
        flow.inflow - flow.outflow
    }
}

/// Compute the balance report.
///
/// Emits exactly one line per (product, location) pair, product-major and
/// location-minor, in the order the two slices are given. No other sorting is applied.
pub fn compute_balances(
    products: &[Product],
    locations: &[Location],
    movements: &[Movement],
) -> Vec<BalanceLine> {
    let index = BalanceIndex::build(movements);

    let mut lines = Vec::with_capacity(products.len() * locations.len());
    for product in products {
        for location in locations {
            lines.push(BalanceLine {
                product_id: product.product_id().clone(),
                product_name: product.name().to_string(),
                location_id: location.location_id().clone(),
                location_name: location.name().to_string(),
                net_qty: index.net_qty(product.product_id(), location.location_id()),
            });
        }
    }
    lines
}
