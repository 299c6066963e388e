//! Route combination: absorb under-capacity routes from adjacent areas into
//! a target route so fewer vehicles leave the depot.

use super::adjacency::areas_adjacent;
use crate::error::{AppError, Result};
use crate::models::{RouteState, VehicleCapacity};
use crate::store::Fleet;
use uuid::Uuid;

/// Merge every qualifying candidate into the target route. A candidate
/// qualifies when it is still `draft` or `confirmed`, its area is adjacent
/// to the target's, and the combined cargo fits the vehicle capacity.
/// Absorbed candidates lose their stops and transition to `cancelled`.
///
/// Candidates are processed in the order given; callers pass ascending ids
/// so repeated runs are idempotent once nothing more can be combined.
/// Returns the ids of absorbed routes.
pub fn combine_adjacent(
    fleet: &mut Fleet,
    route_id: Uuid,
    candidate_ids: &[Uuid],
    capacity: VehicleCapacity,
    proximity_threshold_km: f64,
) -> Result<Vec<Uuid>> {
    let mut absorbed = Vec::new();

    for &candidate_id in candidate_ids {
        if candidate_id == route_id {
            continue;
        }
        let Ok(candidate) = fleet.route(candidate_id) else {
            continue;
        };
        if !matches!(candidate.state, RouteState::Draft | RouteState::Confirmed) {
            continue;
        }
        let candidate_area_id = candidate.area_id;

        let target_area = fleet.route(route_id)?.area_id.and_then(|id| fleet.area(id));
        let candidate_area = candidate_area_id.and_then(|id| fleet.area(id));
        if !areas_adjacent(target_area, candidate_area, proximity_threshold_km) {
            continue;
        }

        let combined = fleet.route_demand(route_id) + fleet.route_demand(candidate_id);
        if !capacity.fits(&combined) {
            tracing::debug!(
                route_id = %route_id,
                candidate_id = %candidate_id,
                weight_kg = combined.weight_kg,
                volume_m3 = combined.volume_m3,
                "Combined cargo would exceed capacity, skipping candidate"
            );
            continue;
        }

        let stop_ids = fleet.route_stop_ids(candidate_id);
        fleet.move_stops_to_route(&stop_ids, route_id)?;
        fleet
            .route_mut(candidate_id)?
            .transition_to(RouteState::Cancelled)
            .map_err(AppError::Conflict)?;
        absorbed.push(candidate_id);
    }

    Ok(absorbed)
}
