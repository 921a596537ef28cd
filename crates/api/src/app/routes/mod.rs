use axum::{routing::get, Router};

pub mod locations;
pub mod movements;
pub mod products;
pub mod report;
pub mod system;

/// Router for every inventory endpoint (everything except `/health`).
pub fn router() -> Router {
    Router::new()
        .route("/", get(report::balance_report))
        .route("/report", get(report::balance_report))
        .nest("/products", products::router())
        .nest("/locations", locations::router())
        .nest("/movements", movements::router())
}
