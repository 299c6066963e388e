//! Capacity-aware route splitting.
//!
//! Groups a route's stops by area, detects areas whose aggregated cargo
//! exceeds the vehicle capacity, and partitions those stops into new draft
//! sub-routes. Priority and delivery-deadline ordering protect SLA-sensitive
//! stops from being arbitrarily redistributed.

use crate::error::Result;
use crate::models::{Demand, Route, VehicleCapacity};
use crate::store::Fleet;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
struct StopKey {
    id: Uuid,
    priority: u8,
    time_window_start: Option<OffsetDateTime>,
    demand: Demand,
}

/// Split every over-capacity area of a route into sub-routes. Returns the
/// ids of all resulting routes, the original first. If no area exceeds
/// capacity the route is returned unchanged as the only element.
///
/// Never fails for a well-formed route; a zero capacity component is treated
/// as unconstrained, so no division by zero can occur.
pub fn split_oversized_areas(
    fleet: &mut Fleet,
    route_id: Uuid,
    capacity: VehicleCapacity,
) -> Result<Vec<Uuid>> {
    fleet.route(route_id)?;

    // Typed grouping over a stable key: BTreeMap iteration keeps the area
    // order deterministic run to run.
    let mut groups: BTreeMap<Option<Uuid>, Vec<StopKey>> = BTreeMap::new();
    for stop in fleet.route_stops(route_id) {
        groups.entry(stop.area_id).or_default().push(StopKey {
            id: stop.id,
            priority: stop.priority,
            time_window_start: stop.time_window_start,
            demand: stop.demand,
        });
    }

    let mut result = vec![route_id];
    for (area_id, mut members) in groups {
        let total = members
            .iter()
            .fold(Demand::ZERO, |acc, m| acc + m.demand);
        if capacity.fits(&total) {
            continue;
        }

        let needed = routes_needed(&total, &capacity);
        tracing::debug!(
            route_id = %route_id,
            area_id = ?area_id,
            weight_kg = total.weight_kg,
            volume_m3 = total.volume_m3,
            routes_needed = needed,
            "Area cargo exceeds vehicle capacity, splitting"
        );

        // Priority first, earliest deadline next, id as a stable tiebreak.
        // Stops without a time window sort after dated ones.
        members.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| match (a.time_window_start, b.time_window_start) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                })
                .then_with(|| a.id.cmp(&b.id))
        });

        // Near-equal contiguous chunks; earlier chunks take the remainder.
        // The first chunk stays on the source route.
        let base = members.len() / needed;
        let remainder = members.len() % needed;
        let mut start = 0;
        for chunk_idx in 0..needed {
            let size = base + usize::from(chunk_idx < remainder);
            let chunk = &members[start..start + size];
            start += size;
            if chunk_idx == 0 || chunk.is_empty() {
                continue;
            }
            let stop_ids: Vec<Uuid> = chunk.iter().map(|m| m.id).collect();
            let sub_route_id = create_sub_route(fleet, route_id, &stop_ids)?;
            result.push(sub_route_id);
        }
    }

    Ok(result)
}

/// How many routes an area's cargo requires: the larger of the weight-bound
/// and volume-bound counts, at least one. Unconstrained (zero) components
/// impose no count.
fn routes_needed(total: &Demand, capacity: &VehicleCapacity) -> usize {
    let by_weight = if capacity.max_weight_kg > 0.0 {
        (total.weight_kg / capacity.max_weight_kg).ceil() as usize
    } else {
        1
    };
    let by_volume = if capacity.max_volume_m3 > 0.0 {
        (total.volume_m3 / capacity.max_volume_m3).ceil() as usize
    } else {
        1
    };
    by_weight.max(by_volume).max(1)
}

/// Spin off a new draft route carrying the given stops. The sub-route
/// inherits the source's batch, area and vehicle; ownership of the stops
/// transfers and both routes are renumbered to contiguous sequences.
pub fn create_sub_route(
    fleet: &mut Fleet,
    source_route_id: Uuid,
    stop_ids: &[Uuid],
) -> Result<Uuid> {
    let source = fleet.route(source_route_id)?;
    let sub_route = Route::new(source.batch_id)
        .with_area(source.area_id)
        .with_vehicle(source.vehicle_id);
    let sub_route_id = fleet.insert_route(sub_route);
    fleet.move_stops_to_route(stop_ids, sub_route_id)?;
    Ok(sub_route_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Area, Coordinates, RouteState, Stop, Vehicle};
    use time::macros::datetime;

    fn capacity_1000kg_50m3() -> VehicleCapacity {
        VehicleCapacity::new(1000.0, 50.0).unwrap()
    }

    fn setup_route(fleet: &mut Fleet) -> (Uuid, Uuid) {
        let area_id = fleet.insert_area(Area::new("NORTH", "North Area"));
        let vehicle_id = fleet.insert_vehicle(Vehicle::new(
            "Test Delivery Truck",
            capacity_1000kg_50m3(),
        ));
        let route = Route::new(Uuid::new_v4())
            .with_area(Some(area_id))
            .with_vehicle(Some(vehicle_id));
        let route_id = fleet.insert_route(route);
        (route_id, area_id)
    }

    fn add_stop(fleet: &mut Fleet, route_id: Uuid, area_id: Uuid, weight: f64, volume: f64) -> Uuid {
        let stop = Stop::new(
            route_id,
            "North Customer 1",
            Coordinates::new(40.7128, -74.0060).unwrap(),
            Demand::new(weight, volume),
        )
        .with_area(area_id);
        fleet.append_stop(route_id, stop).unwrap()
    }

    #[test]
    fn test_routes_needed() {
        let cap = capacity_1000kg_50m3();
        assert_eq!(routes_needed(&Demand::new(500.0, 10.0), &cap), 1);
        assert_eq!(routes_needed(&Demand::new(1250.0, 10.0), &cap), 2);
        assert_eq!(routes_needed(&Demand::new(100.0, 120.0), &cap), 3);
        assert_eq!(routes_needed(&Demand::new(2100.0, 160.0), &cap), 4);

        // Zero components never divide.
        let unbounded = VehicleCapacity::new(0.0, 0.0).unwrap();
        assert_eq!(routes_needed(&Demand::new(1e6, 1e6), &unbounded), 1);
    }

    #[test]
    fn test_split_within_capacity_is_noop() {
        let mut fleet = Fleet::new();
        let (route_id, area_id) = setup_route(&mut fleet);
        for _ in 0..5 {
            add_stop(&mut fleet, route_id, area_id, 30.0, 3.0);
        }

        let result = split_oversized_areas(&mut fleet, route_id, capacity_1000kg_50m3()).unwrap();
        assert_eq!(result, vec![route_id]);
        assert_eq!(fleet.route_count(), 1);
    }

    #[test]
    fn test_split_oversized_area_respects_capacity() {
        let mut fleet = Fleet::new();
        let (route_id, area_id) = setup_route(&mut fleet);
        // 25 stops x 50 kg = 1250 kg against a 1000 kg vehicle.
        let mut original_ids = Vec::new();
        for _ in 0..25 {
            original_ids.push(add_stop(&mut fleet, route_id, area_id, 50.0, 1.0));
        }

        let result = split_oversized_areas(&mut fleet, route_id, capacity_1000kg_50m3()).unwrap();
        assert!(result.len() >= 2);
        assert_eq!(result[0], route_id);

        // Each resulting route fits, and the union of stops is exactly the
        // original set.
        let mut seen = Vec::new();
        for rid in &result {
            let demand = fleet.route_demand(*rid);
            assert!(demand.weight_kg <= 1000.0, "route carries {} kg", demand.weight_kg);
            for stop in fleet.route_stops(*rid) {
                seen.push(stop.id);
            }
            let seqs: Vec<u32> = fleet.route_stops(*rid).iter().map(|s| s.sequence).collect();
            assert_eq!(seqs, (1..=seqs.len() as u32).collect::<Vec<u32>>());
        }
        seen.sort();
        original_ids.sort();
        assert_eq!(seen, original_ids);
    }

    #[test]
    fn test_split_by_volume_constraint() {
        let mut fleet = Fleet::new();
        let (route_id, area_id) = setup_route(&mut fleet);
        // 12 stops x 4.5 m3 = 54 m3 against a 50 m3 vehicle; weight is fine.
        for _ in 0..12 {
            add_stop(&mut fleet, route_id, area_id, 10.0, 4.5);
        }

        let result = split_oversized_areas(&mut fleet, route_id, capacity_1000kg_50m3()).unwrap();
        assert_eq!(result.len(), 2);
        for rid in &result {
            assert!(fleet.route_demand(*rid).volume_m3 <= 50.0);
        }
    }

    #[test]
    fn test_split_keeps_priority_stops_on_source_route() {
        let mut fleet = Fleet::new();
        let (route_id, area_id) = setup_route(&mut fleet);
        let mut urgent = Vec::new();
        for i in 0..22 {
            let id = add_stop(&mut fleet, route_id, area_id, 50.0, 1.0);
            if i < 4 {
                let stop = fleet.stop_mut(id).unwrap();
                stop.priority = 4;
                stop.time_window_start = Some(datetime!(2026-09-01 08:00 UTC));
                urgent.push(id);
            }
        }

        split_oversized_areas(&mut fleet, route_id, capacity_1000kg_50m3()).unwrap();

        // SLA-critical stops sort first and therefore stay on the source.
        for id in urgent {
            assert_eq!(fleet.stop(id).unwrap().route_id, route_id);
        }
    }

    #[test]
    fn test_split_only_touches_oversized_areas() {
        let mut fleet = Fleet::new();
        let (route_id, north) = setup_route(&mut fleet);
        let east = fleet.insert_area(Area::new("EAST", "East Area"));
        for _ in 0..22 {
            add_stop(&mut fleet, route_id, north, 50.0, 1.0); // 1100 kg, over
        }
        let mut east_stops = Vec::new();
        for _ in 0..3 {
            east_stops.push(add_stop(&mut fleet, route_id, east, 30.0, 1.0));
        }

        let result = split_oversized_areas(&mut fleet, route_id, capacity_1000kg_50m3()).unwrap();
        assert_eq!(result.len(), 2);
        // The within-capacity east stops never move.
        for id in east_stops {
            assert_eq!(fleet.stop(id).unwrap().route_id, route_id);
        }
    }

    #[test]
    fn test_create_sub_route_inherits_batch_and_area() {
        let mut fleet = Fleet::new();
        let (route_id, area_id) = setup_route(&mut fleet);
        let a = add_stop(&mut fleet, route_id, area_id, 30.0, 3.0);
        let b = add_stop(&mut fleet, route_id, area_id, 30.0, 3.0);
        add_stop(&mut fleet, route_id, area_id, 30.0, 3.0);

        let sub_id = create_sub_route(&mut fleet, route_id, &[a, b]).unwrap();
        assert_ne!(sub_id, route_id);

        let source = fleet.route(route_id).unwrap().clone();
        let sub = fleet.route(sub_id).unwrap();
        assert_eq!(sub.batch_id, source.batch_id);
        assert_eq!(sub.area_id, source.area_id);
        assert_eq!(sub.state, RouteState::Draft);

        assert_eq!(fleet.stop(a).unwrap().route_id, sub_id);
        assert_eq!(fleet.stop(b).unwrap().route_id, sub_id);
        let source_seqs: Vec<u32> =
            fleet.route_stops(route_id).iter().map(|s| s.sequence).collect();
        assert_eq!(source_seqs, vec![1]);
    }
}
