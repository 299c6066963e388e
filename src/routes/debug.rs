use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /debug/health - Check if services are working
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let fleet = state.fleet.read().await;

    Json(json!({
        "status": "ok",
        "checks": {
            "areas": fleet.area_count(),
            "vehicles": fleet.vehicle_count(),
            "routes": fleet.route_count(),
            "stops": fleet.stop_count(),
        }
    }))
}
