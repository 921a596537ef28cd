use axum::{extract::Extension, http::StatusCode};

use stockflow_infra::InventoryService;

use crate::app::errors;

/// Net quantity for every (product, location) pair, product-major.
pub async fn balance_report(
    Extension(service): Extension<InventoryService>,
) -> axum::response::Response {
    match service.balance_report().await {
        Ok(lines) => errors::json_items(StatusCode::OK, lines),
        Err(e) => errors::service_error_to_response(e),
    }
}
