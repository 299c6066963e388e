pub mod debug;
pub mod fleet;
pub mod optimize;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/fleet/areas", post(fleet::create_area))
        .route("/fleet/vehicles", post(fleet::create_vehicle))
        .route("/fleet/routes", post(fleet::create_route))
        .route("/routes/{id}", get(fleet::get_route))
        .route("/routes/{id}/confirm", post(fleet::confirm_route))
        .route("/routes/{id}/optimize", post(optimize::optimize_route))
        .route("/routes/{id}/split", post(optimize::split_route))
        .route("/routes/{id}/combine", post(optimize::combine_route))
        .route("/routes/{id}/split-combine", post(optimize::split_combine_route))
        .route(
            "/routes/{id}/smart-split-combine",
            post(optimize::smart_split_combine_route),
        )
        .route("/routes/{id}/capacity-check", get(optimize::capacity_check))
        .route("/routes/optimize-all", post(optimize::optimize_all_routes))
        .route("/debug/health", get(debug::health_check))
        .with_state(state)
}
