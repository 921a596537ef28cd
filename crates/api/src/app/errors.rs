use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use serde_json::json;

use stockflow_core::DomainError;
use stockflow_infra::{ServiceError, StoreError};

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Store(e) => store_error_to_response(e),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        DomainError::Validation(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
        DomainError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, "invalid_id", message),
        DomainError::InvalidQuantity(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_quantity", message)
        }
        DomainError::InvalidTimestamp(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_timestamp", message)
        }
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        StoreError::Duplicate { .. } => json_error(StatusCode::CONFLICT, "duplicate_id", message),
        StoreError::NotFound { .. } => json_error(StatusCode::NOT_FOUND, "not_found", message),
        StoreError::Backend(_) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", message)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "status": "error",
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// `{"status": "success"}` merged with any extra fields.
pub fn json_success(status: StatusCode, extra: serde_json::Value) -> axum::response::Response {
    let mut body = json!({ "status": "success" });
    if let (Some(body), serde_json::Value::Object(extra)) = (body.as_object_mut(), extra) {
        body.extend(extra);
    }
    (status, axum::Json(body)).into_response()
}

#[derive(Serialize)]
struct ItemsBody<T> {
    status: &'static str,
    items: T,
}

/// `{"status": "success", "items": [...]}` written straight into the body.
/// `serde_json::Value` cannot hold i128 balances outside the u64 range.
pub fn json_items<T: Serialize>(status: StatusCode, items: T) -> axum::response::Response {
    (
        status,
        axum::Json(ItemsBody {
            status: "success",
            items,
        }),
    )
        .into_response()
}
