use serde::{Deserialize, Deserializer};
use serde_json::Value;

use stockflow_infra::RecordMovement;
use stockflow_inventory::MovementPatch;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct AddProductRequest {
    pub product_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddLocationRequest {
    pub location_id: String,
    pub name: String,
}

/// `qty` is taken as raw JSON so that a malformed value reaches the domain parser
/// (and is reported as an invalid quantity) instead of failing body extraction.
#[derive(Debug, Deserialize)]
pub struct AddMovementRequest {
    pub product_id: String,
    #[serde(default, alias = "from_location")]
    pub from_location_id: Option<String>,
    #[serde(default, alias = "to_location")]
    pub to_location_id: Option<String>,
    #[serde(default)]
    pub qty: Value,
}

impl AddMovementRequest {
    pub fn into_input(self) -> RecordMovement {
        RecordMovement {
            product_id: self.product_id,
            from_location_id: self.from_location_id,
            to_location_id: self.to_location_id,
            qty: value_to_text(self.qty),
        }
    }
}

/// Partial movement update. An absent key leaves the field alone; for the location
/// fields an explicit `null` (or `""`) detaches the movement from that side.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMovementRequest {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub from_location_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub to_location_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub qty: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub timestamp: Option<Value>,
}

impl UpdateMovementRequest {
    pub fn into_patch(self) -> MovementPatch {
        MovementPatch {
            product_id: self.product_id,
            from_location_id: self.from_location_id,
            to_location_id: self.to_location_id,
            qty: self.qty.map(value_to_text),
            timestamp: self.timestamp.map(value_to_text),
        }
    }
}

// -------------------------
// JSON mapping helpers
// -------------------------

/// Any present value (including `null`) becomes `Some`.
fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Strings pass through untouched; every other JSON value uses its JSON text
/// (`10`, `4.5`, `null`, `true`...).
pub fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn add_movement_accepts_numeric_and_string_qty() {
        let req: AddMovementRequest =
            serde_json::from_value(json!({"product_id": "P1", "to_location_id": "L1", "qty": 10}))
                .unwrap();
        assert_eq!(req.into_input().qty, "10");

        let req: AddMovementRequest =
            serde_json::from_value(json!({"product_id": "P1", "to_location": "L1", "qty": "7"}))
                .unwrap();
        let input = req.into_input();
        assert_eq!(input.qty, "7");
        assert_eq!(input.to_location_id.as_deref(), Some("L1"));
    }

    #[test]
    fn missing_qty_becomes_unparseable_text() {
        let req: AddMovementRequest = serde_json::from_value(json!({"product_id": "P1"})).unwrap();
        assert_eq!(req.into_input().qty, "null");
    }

    #[test]
    fn update_distinguishes_absent_from_null() {
        let req: UpdateMovementRequest =
            serde_json::from_value(json!({"from_location_id": null, "qty": 3})).unwrap();
        let patch = req.into_patch();
        assert_eq!(patch.from_location_id, Some(None));
        assert_eq!(patch.to_location_id, None);
        assert_eq!(patch.qty.as_deref(), Some("3"));
        assert_eq!(patch.timestamp, None);
    }

    #[test]
    fn update_null_qty_is_present() {
        let req: UpdateMovementRequest = serde_json::from_value(json!({"qty": null})).unwrap();
        assert_eq!(req.into_patch().qty.as_deref(), Some("null"));
    }

    #[test]
    fn float_qty_is_passed_through_untruncated() {
        let req: UpdateMovementRequest = serde_json::from_value(json!({"qty": 4.5})).unwrap();
        assert_eq!(req.into_patch().qty.as_deref(), Some("4.5"));
    }
}
