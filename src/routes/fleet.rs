use crate::error::{AppError, Result};
use crate::models::{Area, Coordinates, Demand, Route, Stop, Vehicle, VehicleCapacity};
use crate::services::optimizer::route_distance;
use crate::store::Fleet;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub lat: f64,
    pub lng: f64,
}

impl LocationRequest {
    fn to_coordinates(&self) -> Result<Coordinates> {
        Coordinates::new(self.lat, self.lng).map_err(AppError::InvalidRequest)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateAreaRequest {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Known customer locations inside the area, used to seed the
    /// representative coordinate for adjacency checks.
    #[serde(default)]
    pub customer_locations: Vec<LocationRequest>,
}

/// POST /fleet/areas
pub async fn create_area(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateAreaRequest>,
) -> Result<Json<Area>> {
    if request.name.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Area name must not be empty".to_string(),
        ));
    }
    let code = request
        .code
        .unwrap_or_else(|| Area::code_from_name(&request.name));

    let locations = request
        .customer_locations
        .iter()
        .map(LocationRequest::to_coordinates)
        .collect::<Result<Vec<_>>>()?;

    let mut fleet = state.fleet.write().await;
    if fleet.area_by_code(&code).is_some() {
        return Err(AppError::Conflict(format!(
            "Area code '{}' already exists",
            code
        )));
    }

    let mut area = Area::new(code, request.name);
    area.description = request.description;
    area.recompute_representative(&locations);
    tracing::info!(code = %area.code, "Area created");

    let id = fleet.insert_area(area);
    let created = fleet
        .area(id)
        .ok_or_else(|| AppError::Internal("Area vanished after insert".to_string()))?;
    Ok(Json(created.clone()))
}

#[derive(Debug, Deserialize)]
pub struct CreateVehicleRequest {
    pub name: String,
    pub max_weight_kg: f64,
    pub max_volume_m3: f64,
}

/// POST /fleet/vehicles
pub async fn create_vehicle(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<Json<Vehicle>> {
    if request.name.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Vehicle name must not be empty".to_string(),
        ));
    }
    let capacity = VehicleCapacity::new(request.max_weight_kg, request.max_volume_m3)
        .map_err(AppError::InvalidRequest)?;
    let vehicle = Vehicle::new(request.name, capacity);
    tracing::info!(name = %vehicle.name, "Vehicle created");

    let mut fleet = state.fleet.write().await;
    let id = fleet.insert_vehicle(vehicle);
    let created = fleet
        .vehicle(id)
        .ok_or_else(|| AppError::Internal("Vehicle vanished after insert".to_string()))?;
    Ok(Json(created.clone()))
}

#[derive(Debug, Deserialize)]
pub struct StopRequest {
    pub customer_name: String,
    pub lat: f64,
    pub lng: f64,
    pub weight_kg: f64,
    pub volume_m3: f64,
    #[serde(default)]
    pub area_id: Option<Uuid>,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub time_window_start: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub time_window_end: Option<OffsetDateTime>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRouteRequest {
    /// Picking batch the route belongs to; generated when absent.
    #[serde(default)]
    pub batch_id: Option<Uuid>,
    #[serde(default)]
    pub vehicle_id: Option<Uuid>,
    /// Re-sequence stops by distance right after creation.
    #[serde(default = "default_optimize")]
    pub optimize: bool,
    pub stops: Vec<StopRequest>,
}

fn default_optimize() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct RouteDetailResponse {
    pub route: Route,
    pub stops: Vec<Stop>,
    pub demand: Demand,
    pub total_distance_km: f64,
}

pub(crate) fn route_detail(fleet: &Fleet, route_id: Uuid) -> Result<RouteDetailResponse> {
    let route = fleet.route(route_id)?.clone();
    let stops = fleet.route_stops(route_id);
    let total_distance_km = route_distance(&stops);
    Ok(RouteDetailResponse {
        route,
        demand: fleet.route_demand(route_id),
        total_distance_km,
        stops: stops.into_iter().cloned().collect(),
    })
}

/// POST /fleet/routes
/// Create a draft route from a batch of stops. The route's primary area is
/// the most common stop area; by default the stop order is optimized
/// immediately.
pub async fn create_route(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRouteRequest>,
) -> Result<Json<RouteDetailResponse>> {
    if request.stops.is_empty() {
        return Err(AppError::InvalidRequest(
            "A route needs at least one stop".to_string(),
        ));
    }
    // Validate every stop payload before touching the fleet: a rejected
    // request must leave nothing behind.
    let mut locations = Vec::with_capacity(request.stops.len());
    for stop in &request.stops {
        if let Some(p) = stop.priority {
            if p > 4 {
                return Err(AppError::InvalidRequest(format!(
                    "Priority {} out of range 0-4",
                    p
                )));
            }
        }
        if stop.weight_kg < 0.0 || stop.volume_m3 < 0.0 {
            return Err(AppError::InvalidRequest(format!(
                "Stop demand must be >= 0, got ({}, {})",
                stop.weight_kg, stop.volume_m3
            )));
        }
        locations.push(Coordinates::new(stop.lat, stop.lng).map_err(AppError::InvalidRequest)?);
    }

    let mut fleet = state.fleet.write().await;
    if let Some(vehicle_id) = request.vehicle_id {
        if fleet.vehicle(vehicle_id).is_none() {
            return Err(AppError::NotFound(format!(
                "Vehicle {} not found",
                vehicle_id
            )));
        }
    }
    for stop in &request.stops {
        if let Some(area_id) = stop.area_id {
            if fleet.area(area_id).is_none() {
                return Err(AppError::NotFound(format!("Area {} not found", area_id)));
            }
        }
    }

    // Primary area = most common stop area, id as a stable tiebreak.
    let mut area_counts: HashMap<Uuid, usize> = HashMap::new();
    for stop in &request.stops {
        if let Some(area_id) = stop.area_id {
            *area_counts.entry(area_id).or_default() += 1;
        }
    }
    let primary_area = area_counts
        .into_iter()
        .max_by(|(ida, ca), (idb, cb)| ca.cmp(cb).then_with(|| idb.cmp(ida)))
        .map(|(id, _)| id);

    let batch_id = request.batch_id.unwrap_or_else(Uuid::new_v4);
    let route = Route::new(batch_id)
        .with_area(primary_area)
        .with_vehicle(request.vehicle_id);
    let route_id = fleet.insert_route(route);

    let mut touched_areas = Vec::new();
    for (stop_request, &location) in request.stops.iter().zip(&locations) {
        let mut stop = Stop::new(
            route_id,
            stop_request.customer_name.clone(),
            location,
            Demand::new(stop_request.weight_kg, stop_request.volume_m3),
        )
        .with_priority(stop_request.priority.unwrap_or(0))
        .with_time_window(stop_request.time_window_start, stop_request.time_window_end);
        if let Some(area_id) = stop_request.area_id {
            stop = stop.with_area(area_id);
            if !touched_areas.contains(&area_id) {
                touched_areas.push(area_id);
            }
        }
        fleet.append_stop(route_id, stop)?;
    }
    for area_id in touched_areas {
        fleet.refresh_area_representative(area_id);
    }

    if request.optimize {
        state
            .optimizer
            .optimize_route_by_distance(&mut fleet, route_id)?;
    }

    tracing::info!(
        route_id = %route_id,
        batch_id = %batch_id,
        stops = request.stops.len(),
        "Route created"
    );
    Ok(Json(route_detail(&fleet, route_id)?))
}

/// GET /routes/{id}
pub async fn get_route(
    State(state): State<Arc<AppState>>,
    Path(route_id): Path<Uuid>,
) -> Result<Json<RouteDetailResponse>> {
    let fleet = state.fleet.read().await;
    Ok(Json(route_detail(&fleet, route_id)?))
}

/// POST /routes/{id}/confirm
/// Validate capacity and move a draft route to confirmed.
pub async fn confirm_route(
    State(state): State<Arc<AppState>>,
    Path(route_id): Path<Uuid>,
) -> Result<Json<RouteDetailResponse>> {
    let mut fleet = state.fleet.write().await;
    fleet.confirm_route(route_id)?;
    tracing::info!(route_id = %route_id, "Route confirmed");
    Ok(Json(route_detail(&fleet, route_id)?))
}
