use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use stockflow_core::MovementId;
use stockflow_infra::InventoryService;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_movements).post(add_movement))
        .route("/:id", patch(update_movement))
}

/// Movement history with product/location names joined in, plus the registries
/// needed to fill in an edit form.
pub async fn list_movements(
    Extension(service): Extension<InventoryService>,
) -> axum::response::Response {
    match service.list_movements().await {
        Ok(report) => errors::json_success(
            StatusCode::OK,
            json!({
                "items": report.movements,
                "products": report.products,
                "locations": report.locations,
            }),
        ),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn add_movement(
    Extension(service): Extension<InventoryService>,
    Json(body): Json<dto::AddMovementRequest>,
) -> axum::response::Response {
    match service
        .record_movement(body.into_input(), Utc::now().naive_utc())
        .await
    {
        Ok(movement_id) => {
            errors::json_success(StatusCode::CREATED, json!({ "movement_id": movement_id }))
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_movement(
    Extension(service): Extension<InventoryService>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateMovementRequest>,
) -> axum::response::Response {
    let movement_id: MovementId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match service.update_movement(movement_id, body.into_patch()).await {
        Ok(movement) => errors::json_success(
            StatusCode::OK,
            json!({
                "movement_id": movement.movement_id(),
                "timestamp": movement.display_timestamp(),
                "qty": movement.qty(),
            }),
        ),
        Err(e) => errors::service_error_to_response(e),
    }
}
