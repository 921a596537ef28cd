use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde_json::json;

use stockflow_infra::InventoryService;
use stockflow_locations::LocationPatch;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_locations).post(add_location))
        .route("/:id", patch(update_location))
}

pub async fn list_locations(
    Extension(service): Extension<InventoryService>,
) -> axum::response::Response {
    match service.list_locations().await {
        Ok(items) => errors::json_items(StatusCode::OK, items),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn add_location(
    Extension(service): Extension<InventoryService>,
    Json(body): Json<dto::AddLocationRequest>,
) -> axum::response::Response {
    match service.add_location(&body.location_id, body.name).await {
        Ok(location) => errors::json_success(
            StatusCode::CREATED,
            json!({ "location_id": location.location_id() }),
        ),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_location(
    Extension(service): Extension<InventoryService>,
    Path(id): Path<String>,
    Json(body): Json<LocationPatch>,
) -> axum::response::Response {
    match service.update_location(&id, body).await {
        Ok(()) => errors::json_success(StatusCode::OK, json!({})),
        Err(e) => errors::service_error_to_response(e),
    }
}
