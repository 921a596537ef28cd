use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde_json::json;

use stockflow_infra::InventoryService;
use stockflow_products::ProductPatch;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(add_product))
        .route("/:id", patch(update_product))
}

pub async fn list_products(
    Extension(service): Extension<InventoryService>,
) -> axum::response::Response {
    match service.list_products().await {
        Ok(items) => errors::json_items(StatusCode::OK, items),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn add_product(
    Extension(service): Extension<InventoryService>,
    Json(body): Json<dto::AddProductRequest>,
) -> axum::response::Response {
    match service.add_product(&body.product_id, body.name).await {
        Ok(product) => errors::json_success(
            StatusCode::CREATED,
            json!({ "product_id": product.product_id() }),
        ),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(service): Extension<InventoryService>,
    Path(id): Path<String>,
    Json(body): Json<ProductPatch>,
) -> axum::response::Response {
    match service.update_product(&id, body).await {
        Ok(()) => errors::json_success(StatusCode::OK, json!({})),
        Err(e) => errors::service_error_to_response(e),
    }
}
