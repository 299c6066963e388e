use crate::error::Result;
use crate::services::optimizer::{
    CapacityCheckOutcome, CombineOutcome, CompositeOutcome, FleetOptimizeOutcome, OptimizeOutcome,
    SplitOutcome,
};
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;
use uuid::Uuid;

/// POST /routes/{id}/optimize
/// Re-sequence the route's stops by nearest-neighbor distance.
pub async fn optimize_route(
    State(state): State<Arc<AppState>>,
    Path(route_id): Path<Uuid>,
) -> Result<Json<OptimizeOutcome>> {
    let mut fleet = state.fleet.write().await;
    let outcome = state
        .optimizer
        .optimize_route_by_distance(&mut fleet, route_id)?;
    Ok(Json(outcome))
}

/// POST /routes/{id}/split
/// Split over-capacity areas into new draft sub-routes.
pub async fn split_route(
    State(state): State<Arc<AppState>>,
    Path(route_id): Path<Uuid>,
) -> Result<Json<SplitOutcome>> {
    let mut fleet = state.fleet.write().await;
    let outcome = state
        .optimizer
        .split_route_by_area_capacity(&mut fleet, route_id)?;
    tracing::info!(route_id = %route_id, status = ?outcome.status, "Split requested");
    Ok(Json(outcome))
}

/// POST /routes/{id}/combine
/// Absorb adjacent under-capacity sibling routes.
pub async fn combine_route(
    State(state): State<Arc<AppState>>,
    Path(route_id): Path<Uuid>,
) -> Result<Json<CombineOutcome>> {
    let mut fleet = state.fleet.write().await;
    let outcome = state
        .optimizer
        .combine_nearby_areas_route(&mut fleet, route_id)?;
    tracing::info!(route_id = %route_id, status = ?outcome.status, "Combine requested");
    Ok(Json(outcome))
}

/// POST /routes/{id}/split-combine
pub async fn split_combine_route(
    State(state): State<Arc<AppState>>,
    Path(route_id): Path<Uuid>,
) -> Result<Json<CompositeOutcome>> {
    let mut fleet = state.fleet.write().await;
    let outcome = state
        .optimizer
        .split_combine_for_adjacent_areas(&mut fleet, route_id)?;
    Ok(Json(outcome))
}

/// POST /routes/{id}/smart-split-combine
/// Split, combine, then re-optimize every surviving touched route.
pub async fn smart_split_combine_route(
    State(state): State<Arc<AppState>>,
    Path(route_id): Path<Uuid>,
) -> Result<Json<CompositeOutcome>> {
    let mut fleet = state.fleet.write().await;
    let outcome = state
        .optimizer
        .smart_split_combine_route(&mut fleet, route_id)?;
    Ok(Json(outcome))
}

/// GET /routes/{id}/capacity-check
pub async fn capacity_check(
    State(state): State<Arc<AppState>>,
    Path(route_id): Path<Uuid>,
) -> Result<Json<CapacityCheckOutcome>> {
    let fleet = state.fleet.read().await;
    let outcome = state.optimizer.check_route_capacity(&fleet, route_id)?;
    Ok(Json(outcome))
}

/// POST /routes/optimize-all
/// Optimize every active route; individual failures are reported per route,
/// never abort the batch.
pub async fn optimize_all_routes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FleetOptimizeOutcome>> {
    let mut fleet = state.fleet.write().await;
    let outcome = state.optimizer.optimize_all_routes_for_distance(&mut fleet)?;
    tracing::info!(
        routes_processed = outcome.routes_processed,
        routes_optimized = outcome.routes_optimized,
        "Fleet-wide optimization pass finished"
    );
    Ok(Json(outcome))
}
