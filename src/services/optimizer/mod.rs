//! Route optimization engine: distance-based stop re-sequencing plus
//! capacity-aware splitting and area-based combining, orchestrated behind a
//! single `RouteOptimizer` facade.
//!
//! Every operation here mutates the fleet through `&mut Fleet`, so callers
//! hold the state write lock for the whole operation and readers never see a
//! half-applied plan.

pub mod adjacency;
pub mod combiner;
pub mod splitter;
pub mod tour;

pub use adjacency::areas_adjacent;
pub use combiner::combine_adjacent;
pub use splitter::{create_sub_route, split_oversized_areas};
pub use tour::{nearest_neighbor_order, route_distance};

use crate::config::OptimizerConfig;
use crate::constants::DISTANCE_EPSILON_KM;
use crate::error::Result;
use crate::models::{Demand, Stop, VehicleCapacity};
use crate::store::Fleet;
use serde::Serialize;
use uuid::Uuid;

/// What an optimization pass concluded about a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Optimized,
    NoOptimizationNeeded,
    Split,
    NoSplitNeeded,
    Combined,
    NothingToCombine,
    SplitAndCombined,
    NoVehicleAssigned,
    WithinCapacity,
    OverCapacity,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizeOutcome {
    pub route_id: Uuid,
    pub status: OutcomeStatus,
    pub stops_affected: usize,
    pub before_distance_km: f64,
    pub after_distance_km: f64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitOutcome {
    pub route_id: Uuid,
    pub status: OutcomeStatus,
    pub new_route_ids: Vec<Uuid>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CombineOutcome {
    pub route_id: Uuid,
    pub status: OutcomeStatus,
    pub merged_route_ids: Vec<Uuid>,
    pub message: String,
}

/// Result of the composite split-then-combine operations.
#[derive(Debug, Clone, Serialize)]
pub struct CompositeOutcome {
    pub route_id: Uuid,
    pub status: OutcomeStatus,
    pub new_route_ids: Vec<Uuid>,
    pub merged_route_ids: Vec<Uuid>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FleetOptimizeOutcome {
    pub status: OutcomeStatus,
    pub routes_processed: usize,
    pub routes_optimized: usize,
    pub results: Vec<OptimizeOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapacityCheckOutcome {
    pub route_id: Uuid,
    pub status: OutcomeStatus,
    pub demand: Demand,
    pub capacity: Option<VehicleCapacity>,
    pub oversized_stop_ids: Vec<Uuid>,
    pub message: String,
}

/// Facade over the tour, splitter and combiner primitives. Holds the tuned
/// heuristic knobs; the fleet itself is passed per call.
#[derive(Debug, Clone)]
pub struct RouteOptimizer {
    config: OptimizerConfig,
}

impl RouteOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    /// Re-sequence a route's stops with the nearest-neighbor heuristic. The
    /// new order is only applied when it measurably shortens the tour, which
    /// makes the operation idempotent: a second run reports no change.
    pub fn optimize_route_by_distance(
        &self,
        fleet: &mut Fleet,
        route_id: Uuid,
    ) -> Result<OptimizeOutcome> {
        fleet.route(route_id)?;
        let stops = fleet.route_stops(route_id);
        let stop_count = stops.len();

        if stop_count <= 1 {
            let distance = route_distance(&stops);
            return Ok(OptimizeOutcome {
                route_id,
                status: OutcomeStatus::NoOptimizationNeeded,
                stops_affected: 0,
                before_distance_km: distance,
                after_distance_km: distance,
                message: "No Optimization Needed: route has fewer than two stops".to_string(),
            });
        }

        let before = route_distance(&stops);
        let order = nearest_neighbor_order(&stops);
        let reordered: Vec<&Stop> = order
            .iter()
            .filter_map(|id| stops.iter().find(|s| s.id == *id).copied())
            .collect();
        let after = route_distance(&reordered);

        if after + DISTANCE_EPSILON_KM < before {
            fleet.apply_stop_order(route_id, &order);
            tracing::info!(
                route_id = %route_id,
                before_km = before,
                after_km = after,
                "Route re-sequenced by nearest neighbor"
            );
            Ok(OptimizeOutcome {
                route_id,
                status: OutcomeStatus::Optimized,
                stops_affected: stop_count,
                before_distance_km: before,
                after_distance_km: after,
                message: format!(
                    "Route optimized: {:.2} km -> {:.2} km across {} stops",
                    before, after, stop_count
                ),
            })
        } else {
            Ok(OptimizeOutcome {
                route_id,
                status: OutcomeStatus::NoOptimizationNeeded,
                stops_affected: 0,
                before_distance_km: before,
                after_distance_km: before,
                message: "No Optimization Needed: current order is already shortest known"
                    .to_string(),
            })
        }
    }

    /// Split every over-capacity area of a route into new draft sub-routes.
    pub fn split_route_by_area_capacity(
        &self,
        fleet: &mut Fleet,
        route_id: Uuid,
    ) -> Result<SplitOutcome> {
        let Some(capacity) = fleet.route_capacity(route_id)? else {
            return Ok(no_vehicle_split(route_id));
        };

        let result = split_oversized_areas(fleet, route_id, capacity)?;
        let new_route_ids: Vec<Uuid> = result.into_iter().skip(1).collect();
        if new_route_ids.is_empty() {
            Ok(SplitOutcome {
                route_id,
                status: OutcomeStatus::NoSplitNeeded,
                new_route_ids,
                message: "All areas fit the vehicle capacity".to_string(),
            })
        } else {
            Ok(SplitOutcome {
                route_id,
                message: format!(
                    "Route split into {} additional sub-routes",
                    new_route_ids.len()
                ),
                status: OutcomeStatus::Split,
                new_route_ids,
            })
        }
    }

    /// Absorb under-capacity sibling routes from adjacent areas into this
    /// route. Candidates come from the same batch and must still be draft or
    /// confirmed.
    pub fn combine_nearby_areas_route(
        &self,
        fleet: &mut Fleet,
        route_id: Uuid,
    ) -> Result<CombineOutcome> {
        let Some(capacity) = fleet.route_capacity(route_id)? else {
            return Ok(CombineOutcome {
                route_id,
                status: OutcomeStatus::NoVehicleAssigned,
                merged_route_ids: Vec::new(),
                message: "No Vehicle Assigned: assign a vehicle before combining routes"
                    .to_string(),
            });
        };

        let candidates = fleet.combinable_siblings(route_id)?;
        let merged = combine_adjacent(
            fleet,
            route_id,
            &candidates,
            capacity,
            self.config.proximity_threshold_km,
        )?;

        if merged.is_empty() {
            Ok(CombineOutcome {
                route_id,
                status: OutcomeStatus::NothingToCombine,
                merged_route_ids: merged,
                message: "No adjacent route could be absorbed".to_string(),
            })
        } else {
            Ok(CombineOutcome {
                route_id,
                message: format!("Absorbed {} adjacent routes", merged.len()),
                status: OutcomeStatus::Combined,
                merged_route_ids: merged,
            })
        }
    }

    /// Split over-capacity areas, then try to combine the route with adjacent
    /// under-capacity siblings. Splitting first means combination never
    /// recreates an over-capacity route.
    pub fn split_combine_for_adjacent_areas(
        &self,
        fleet: &mut Fleet,
        route_id: Uuid,
    ) -> Result<CompositeOutcome> {
        let Some(capacity) = fleet.route_capacity(route_id)? else {
            return Ok(no_vehicle_composite(route_id));
        };
        let (new_route_ids, merged_route_ids) =
            self.split_then_combine(fleet, route_id, capacity)?;
        Ok(composite_outcome(route_id, new_route_ids, merged_route_ids))
    }

    /// The full pass: split, combine, then re-optimize the stop order of every
    /// surviving route the operation touched.
    pub fn smart_split_combine_route(
        &self,
        fleet: &mut Fleet,
        route_id: Uuid,
    ) -> Result<CompositeOutcome> {
        let Some(capacity) = fleet.route_capacity(route_id)? else {
            return Ok(no_vehicle_composite(route_id));
        };
        let (new_route_ids, merged_route_ids) =
            self.split_then_combine(fleet, route_id, capacity)?;

        let mut touched = vec![route_id];
        touched.extend(&new_route_ids);
        for touched_id in touched {
            if fleet.route(touched_id)?.is_active() {
                self.optimize_route_by_distance(fleet, touched_id)?;
            }
        }

        Ok(composite_outcome(route_id, new_route_ids, merged_route_ids))
    }

    fn split_then_combine(
        &self,
        fleet: &mut Fleet,
        route_id: Uuid,
        capacity: VehicleCapacity,
    ) -> Result<(Vec<Uuid>, Vec<Uuid>)> {
        let split_result = split_oversized_areas(fleet, route_id, capacity)?;
        let new_route_ids: Vec<Uuid> = split_result.into_iter().skip(1).collect();

        let candidates = fleet.combinable_siblings(route_id)?;
        let merged_route_ids = combine_adjacent(
            fleet,
            route_id,
            &candidates,
            capacity,
            self.config.proximity_threshold_km,
        )?;
        Ok((new_route_ids, merged_route_ids))
    }

    /// Optimize the stop order of every active route. One route failing never
    /// aborts the batch: the failure is recorded in its own result entry and
    /// the pass continues.
    pub fn optimize_all_routes_for_distance(
        &self,
        fleet: &mut Fleet,
    ) -> Result<FleetOptimizeOutcome> {
        let route_ids = fleet.active_route_ids();
        let mut results = Vec::with_capacity(route_ids.len());
        let mut routes_optimized = 0;

        for route_id in &route_ids {
            if fleet.route_capacity(*route_id)?.is_none() {
                results.push(OptimizeOutcome {
                    route_id: *route_id,
                    status: OutcomeStatus::NoVehicleAssigned,
                    stops_affected: 0,
                    before_distance_km: 0.0,
                    after_distance_km: 0.0,
                    message: "No Vehicle Assigned: route skipped".to_string(),
                });
                continue;
            }
            match self.optimize_route_by_distance(fleet, *route_id) {
                Ok(outcome) => {
                    if outcome.status == OutcomeStatus::Optimized {
                        routes_optimized += 1;
                    }
                    results.push(outcome);
                }
                Err(err) => {
                    tracing::warn!(route_id = %route_id, error = %err, "Route optimization failed");
                    results.push(OptimizeOutcome {
                        route_id: *route_id,
                        status: OutcomeStatus::Failed,
                        stops_affected: 0,
                        before_distance_km: 0.0,
                        after_distance_km: 0.0,
                        message: err.to_string(),
                    });
                }
            }
        }

        Ok(FleetOptimizeOutcome {
            status: if routes_optimized > 0 {
                OutcomeStatus::Optimized
            } else {
                OutcomeStatus::NoOptimizationNeeded
            },
            routes_processed: route_ids.len(),
            routes_optimized,
            results,
        })
    }

    /// Report whether a route's cargo fits its vehicle, naming any single
    /// stop whose demand alone exceeds capacity. Read-only.
    pub fn check_route_capacity(
        &self,
        fleet: &Fleet,
        route_id: Uuid,
    ) -> Result<CapacityCheckOutcome> {
        let demand = fleet.route_demand(route_id);
        let Some(capacity) = fleet.route_capacity(route_id)? else {
            return Ok(CapacityCheckOutcome {
                route_id,
                status: OutcomeStatus::NoVehicleAssigned,
                demand,
                capacity: None,
                oversized_stop_ids: Vec::new(),
                message: "No Vehicle Assigned: capacity cannot be checked".to_string(),
            });
        };

        let oversized_stop_ids: Vec<Uuid> = fleet
            .route_stops(route_id)
            .iter()
            .filter(|s| !capacity.fits(&s.demand))
            .map(|s| s.id)
            .collect();

        let (status, message) = if !capacity.fits(&demand) {
            (
                OutcomeStatus::OverCapacity,
                format!(
                    "Cargo ({:.2} kg, {:.2} m3) exceeds capacity ({:.2} kg, {:.2} m3)",
                    demand.weight_kg, demand.volume_m3, capacity.max_weight_kg,
                    capacity.max_volume_m3
                ),
            )
        } else if !oversized_stop_ids.is_empty() {
            (
                OutcomeStatus::OverCapacity,
                format!(
                    "{} stops individually exceed the vehicle capacity",
                    oversized_stop_ids.len()
                ),
            )
        } else {
            (
                OutcomeStatus::WithinCapacity,
                "Cargo fits the assigned vehicle".to_string(),
            )
        };

        Ok(CapacityCheckOutcome {
            route_id,
            status,
            demand,
            capacity: Some(capacity),
            oversized_stop_ids,
            message,
        })
    }
}

fn no_vehicle_split(route_id: Uuid) -> SplitOutcome {
    SplitOutcome {
        route_id,
        status: OutcomeStatus::NoVehicleAssigned,
        new_route_ids: Vec::new(),
        message: "No Vehicle Assigned: assign a vehicle before splitting by capacity".to_string(),
    }
}

fn no_vehicle_composite(route_id: Uuid) -> CompositeOutcome {
    CompositeOutcome {
        route_id,
        status: OutcomeStatus::NoVehicleAssigned,
        new_route_ids: Vec::new(),
        merged_route_ids: Vec::new(),
        message: "No Vehicle Assigned: assign a vehicle before split/combine".to_string(),
    }
}

fn composite_outcome(
    route_id: Uuid,
    new_route_ids: Vec<Uuid>,
    merged_route_ids: Vec<Uuid>,
) -> CompositeOutcome {
    let (status, message) = match (new_route_ids.is_empty(), merged_route_ids.is_empty()) {
        (false, false) => (
            OutcomeStatus::SplitAndCombined,
            format!(
                "Split into {} sub-routes, absorbed {} routes",
                new_route_ids.len(),
                merged_route_ids.len()
            ),
        ),
        (false, true) => (
            OutcomeStatus::Split,
            format!("Split into {} additional sub-routes", new_route_ids.len()),
        ),
        (true, false) => (
            OutcomeStatus::Combined,
            format!("Absorbed {} adjacent routes", merged_route_ids.len()),
        ),
        (true, true) => (
            OutcomeStatus::NoOptimizationNeeded,
            "No Optimization Needed: nothing to split or combine".to_string(),
        ),
    };
    CompositeOutcome {
        route_id,
        status,
        new_route_ids,
        merged_route_ids,
        message,
    }
}
