//! In-memory arena for the route/stop/area/vehicle aggregate.
//!
//! Stands in for the external persistence collaborator: entities are plain
//! structs keyed by id, and stop ownership is the `Stop::route_id` field.
//! Moving a stop between routes is one field reassignment done under the
//! caller's lock, never observable as removed-but-not-added.

use crate::error::{AppError, Result};
use crate::models::{Area, Demand, Route, RouteState, Stop, Vehicle, VehicleCapacity};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct Fleet {
    areas: HashMap<Uuid, Area>,
    vehicles: HashMap<Uuid, Vehicle>,
    routes: HashMap<Uuid, Route>,
    stops: HashMap<Uuid, Stop>,
}

impl Fleet {
    pub fn new() -> Self {
        Fleet::default()
    }

    // --- Entity access ---

    pub fn insert_area(&mut self, area: Area) -> Uuid {
        let id = area.id;
        self.areas.insert(id, area);
        id
    }

    pub fn insert_vehicle(&mut self, vehicle: Vehicle) -> Uuid {
        let id = vehicle.id;
        self.vehicles.insert(id, vehicle);
        id
    }

    pub fn insert_route(&mut self, route: Route) -> Uuid {
        let id = route.id;
        self.routes.insert(id, route);
        id
    }

    pub fn area(&self, id: Uuid) -> Option<&Area> {
        self.areas.get(&id)
    }

    /// Area codes are unique; lookup is case-sensitive like the codes
    /// themselves.
    pub fn area_by_code(&self, code: &str) -> Option<&Area> {
        self.areas.values().find(|a| a.code == code)
    }

    pub fn vehicle(&self, id: Uuid) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    pub fn route(&self, id: Uuid) -> Result<&Route> {
        self.routes
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("Route {} not found", id)))
    }

    pub fn route_mut(&mut self, id: Uuid) -> Result<&mut Route> {
        self.routes
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Route {} not found", id)))
    }

    pub fn stop(&self, id: Uuid) -> Option<&Stop> {
        self.stops.get(&id)
    }

    pub fn stop_mut(&mut self, id: Uuid) -> Option<&mut Stop> {
        self.stops.get_mut(&id)
    }

    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    // --- Route/stop aggregate queries ---

    /// Append a stop to the end of a route's tour, assigning the next
    /// contiguous sequence number.
    pub fn append_stop(&mut self, route_id: Uuid, mut stop: Stop) -> Result<Uuid> {
        self.route(route_id)?;
        stop.route_id = route_id;
        stop.sequence = self.route_stop_ids(route_id).len() as u32 + 1;
        let id = stop.id;
        self.stops.insert(id, stop);
        Ok(id)
    }

    /// Stops of a route in visiting order (sequence, then id as a stable
    /// tiebreak).
    pub fn route_stops(&self, route_id: Uuid) -> Vec<&Stop> {
        let mut stops: Vec<&Stop> = self
            .stops
            .values()
            .filter(|s| s.route_id == route_id)
            .collect();
        stops.sort_by_key(|s| (s.sequence, s.id));
        stops
    }

    pub fn route_stop_ids(&self, route_id: Uuid) -> Vec<Uuid> {
        self.route_stops(route_id).iter().map(|s| s.id).collect()
    }

    /// Total cargo demand across a route's stops.
    pub fn route_demand(&self, route_id: Uuid) -> Demand {
        self.route_stops(route_id)
            .iter()
            .fold(Demand::ZERO, |acc, s| acc + s.demand)
    }

    /// Capacity of the vehicle assigned to a route, if any.
    pub fn route_capacity(&self, route_id: Uuid) -> Result<Option<VehicleCapacity>> {
        let route = self.route(route_id)?;
        Ok(route
            .vehicle_id
            .and_then(|vid| self.vehicles.get(&vid))
            .map(|v| v.capacity))
    }

    /// Renumber a route's stops so sequences form a contiguous `1..=N`
    /// permutation, preserving the current visiting order.
    pub fn resequence_route(&mut self, route_id: Uuid) {
        let ordered = self.route_stop_ids(route_id);
        for (idx, stop_id) in ordered.into_iter().enumerate() {
            if let Some(stop) = self.stops.get_mut(&stop_id) {
                stop.sequence = idx as u32 + 1;
            }
        }
    }

    /// Apply an explicit visiting order to a route's stops. Ids not belonging
    /// to the route are ignored; the order must cover all of its stops.
    pub fn apply_stop_order(&mut self, route_id: Uuid, ordered_stop_ids: &[Uuid]) {
        let mut seq = 0u32;
        for stop_id in ordered_stop_ids {
            if let Some(stop) = self.stops.get_mut(stop_id) {
                if stop.route_id == route_id {
                    seq += 1;
                    stop.sequence = seq;
                }
            }
        }
    }

    /// Transfer ownership of the given stops to another route. Each stop is
    /// reassigned in place and appended after the target's existing tour;
    /// every affected source route is renumbered afterwards so both sides
    /// keep contiguous sequences.
    pub fn move_stops_to_route(&mut self, stop_ids: &[Uuid], target_route_id: Uuid) -> Result<()> {
        self.route(target_route_id)?;

        let mut sources: Vec<Uuid> = Vec::new();
        let mut next_seq = self.route_stop_ids(target_route_id).len() as u32;
        for stop_id in stop_ids {
            let stop = self
                .stops
                .get_mut(stop_id)
                .ok_or_else(|| AppError::NotFound(format!("Stop {} not found", stop_id)))?;
            if stop.route_id == target_route_id {
                continue;
            }
            if !sources.contains(&stop.route_id) {
                sources.push(stop.route_id);
            }
            next_seq += 1;
            stop.route_id = target_route_id;
            stop.sequence = next_seq;
        }

        for source in sources {
            self.resequence_route(source);
        }
        Ok(())
    }

    /// Recompute an area's cached representative coordinate from the
    /// locations of its current member stops.
    pub fn refresh_area_representative(&mut self, area_id: Uuid) {
        let locations: Vec<_> = self
            .stops
            .values()
            .filter(|s| s.area_id == Some(area_id))
            .map(|s| s.location)
            .collect();
        if let Some(area) = self.areas.get_mut(&area_id) {
            area.recompute_representative(&locations);
        }
    }

    /// Validate capacity and move a draft route to `confirmed`.
    pub fn confirm_route(&mut self, route_id: Uuid) -> Result<()> {
        let capacity = self
            .route_capacity(route_id)?
            .ok_or_else(|| AppError::InvalidRequest("No vehicle assigned".to_string()))?;
        let demand = self.route_demand(route_id);
        if !capacity.fits(&demand) {
            return Err(AppError::InvalidRequest(format!(
                "Route cargo ({:.2} kg, {:.2} m3) exceeds vehicle capacity ({:.2} kg, {:.2} m3)",
                demand.weight_kg, demand.volume_m3, capacity.max_weight_kg, capacity.max_volume_m3
            )));
        }
        self.route_mut(route_id)?
            .transition_to(RouteState::Confirmed)
            .map_err(AppError::Conflict)
    }

    /// Routes still being planned or executed, in ascending id order so
    /// batch operations iterate deterministically.
    pub fn active_route_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self
            .routes
            .values()
            .filter(|r| r.is_active())
            .map(|r| r.id)
            .collect();
        ids.sort();
        ids
    }

    /// Draft/confirmed routes sharing a batch with the given route,
    /// excluding the route itself, in ascending id order.
    pub fn combinable_siblings(&self, route_id: Uuid) -> Result<Vec<Uuid>> {
        let route = self.route(route_id)?;
        let mut ids: Vec<Uuid> = self
            .routes
            .values()
            .filter(|r| {
                r.id != route_id
                    && r.batch_id == route.batch_id
                    && matches!(r.state, RouteState::Draft | RouteState::Confirmed)
            })
            .map(|r| r.id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}
