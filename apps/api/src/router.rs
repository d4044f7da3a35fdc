use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use specialist_cell::router::specialist_routes;
use specialist_cell::SpecialistService;

pub fn create_router(service: Arc<SpecialistService>) -> Router {
    Router::new()
        .route("/", get(|| async { "Specialists API is running!" }))
        .nest("/specialists", specialist_routes(service))
}
