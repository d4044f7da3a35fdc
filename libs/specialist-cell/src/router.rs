use std::sync::Arc;

use axum::{
    Router,
    routing::{get, put, delete},
};

use crate::handlers;
use crate::services::SpecialistService;

pub fn specialist_routes(service: Arc<SpecialistService>) -> Router {
    Router::new()
        .route("/", get(handlers::list_specialists).post(handlers::create_specialist))
        .route(
            "/{id}",
            get(handlers::get_specialist)
                .put(handlers::update_specialist)
                .patch(handlers::update_specialist)
                .delete(handlers::soft_delete_specialist),
        )
        // Lifecycle
        .route("/{id}/restore", put(handlers::restore_specialist))
        .route("/{id}/hard-delete", delete(handlers::hard_delete_specialist))
        .with_state(service)
}
