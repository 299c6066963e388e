//! End-to-end engine scenarios exercising the optimizer against an in-memory
//! fleet, without the HTTP layer.

use fleetroute::config::OptimizerConfig;
use fleetroute::models::{
    Area, Coordinates, Demand, Route, RouteState, Stop, Vehicle, VehicleCapacity,
};
use fleetroute::services::optimizer::{OutcomeStatus, RouteOptimizer};
use fleetroute::store::Fleet;
use uuid::Uuid;

fn optimizer() -> RouteOptimizer {
    RouteOptimizer::new(OptimizerConfig::default())
}

fn add_vehicle(fleet: &mut Fleet, max_weight_kg: f64, max_volume_m3: f64) -> Uuid {
    fleet.insert_vehicle(Vehicle::new(
        "Test Delivery Truck",
        VehicleCapacity::new(max_weight_kg, max_volume_m3).unwrap(),
    ))
}

fn add_stop(fleet: &mut Fleet, route_id: Uuid, area_id: Uuid, weight: f64) -> Uuid {
    let stop = Stop::new(
        route_id,
        "Customer",
        Coordinates::new(40.7128, -74.0060).unwrap(),
        Demand::new(weight, weight / 25.0),
    )
    .with_area(area_id);
    fleet.append_stop(route_id, stop).unwrap()
}

#[test]
fn split_redistributes_overweight_area_across_fitting_routes() {
    let mut fleet = Fleet::new();
    let area_id = fleet.insert_area(Area::new("NORTH", "North Area"));
    let vehicle_id = add_vehicle(&mut fleet, 1000.0, 50.0);
    let route_id = fleet.insert_route(
        Route::new(Uuid::new_v4())
            .with_area(Some(area_id))
            .with_vehicle(Some(vehicle_id)),
    );
    for _ in 0..25 {
        add_stop(&mut fleet, route_id, area_id, 50.0); // 1250 kg total
    }

    let outcome = optimizer()
        .split_route_by_area_capacity(&mut fleet, route_id)
        .unwrap();
    assert_eq!(outcome.status, OutcomeStatus::Split);

    let mut total_stops = 0;
    for rid in std::iter::once(&route_id).chain(&outcome.new_route_ids) {
        let demand = fleet.route_demand(*rid);
        assert!(demand.weight_kg <= 1000.0);
        total_stops += fleet.route_stops(*rid).len();
    }
    assert_eq!(total_stops, 25);
}

#[test]
fn combine_merges_under_capacity_siblings_and_cancels_them() {
    let mut fleet = Fleet::new();
    let area_id = fleet.insert_area(Area::new("NORTH", "North Area"));
    let vehicle_id = add_vehicle(&mut fleet, 1000.0, 50.0);
    let batch_id = Uuid::new_v4();

    let target = fleet.insert_route(
        Route::new(batch_id)
            .with_area(Some(area_id))
            .with_vehicle(Some(vehicle_id)),
    );
    add_stop(&mut fleet, target, area_id, 150.0);
    let sibling = fleet.insert_route(Route::new(batch_id).with_area(Some(area_id)));
    add_stop(&mut fleet, sibling, area_id, 100.0);

    let outcome = optimizer()
        .combine_nearby_areas_route(&mut fleet, target)
        .unwrap();
    assert_eq!(outcome.status, OutcomeStatus::Combined);
    assert_eq!(outcome.merged_route_ids, vec![sibling]);
    assert_eq!(fleet.route_demand(target).weight_kg, 250.0);
    assert_eq!(fleet.route(sibling).unwrap().state, RouteState::Cancelled);
    assert!(fleet.route_stops(sibling).is_empty());
}

#[test]
fn smart_pass_is_stable_once_settled() {
    let mut fleet = Fleet::new();
    let area_id = fleet.insert_area(Area::new("NORTH", "North Area"));
    let vehicle_id = add_vehicle(&mut fleet, 1000.0, 50.0);
    let route_id = fleet.insert_route(
        Route::new(Uuid::new_v4())
            .with_area(Some(area_id))
            .with_vehicle(Some(vehicle_id)),
    );
    for _ in 0..30 {
        add_stop(&mut fleet, route_id, area_id, 50.0); // 1500 kg
    }

    let first = optimizer()
        .smart_split_combine_route(&mut fleet, route_id)
        .unwrap();
    assert_eq!(first.status, OutcomeStatus::Split);
    let routes_after_first = fleet.route_count();

    // A second pass finds everything already within capacity and changes
    // nothing.
    let second = optimizer()
        .smart_split_combine_route(&mut fleet, route_id)
        .unwrap();
    assert_eq!(second.status, OutcomeStatus::NoOptimizationNeeded);
    assert!(second.new_route_ids.is_empty());
    assert!(second.merged_route_ids.is_empty());
    assert_eq!(fleet.route_count(), routes_after_first);
}

#[test]
fn fleet_pass_reports_no_vehicle_routes_without_aborting() {
    let mut fleet = Fleet::new();
    let area_id = fleet.insert_area(Area::new("NORTH", "North Area"));
    let vehicle_id = add_vehicle(&mut fleet, 1000.0, 50.0);

    let with_vehicle = fleet.insert_route(
        Route::new(Uuid::new_v4())
            .with_area(Some(area_id))
            .with_vehicle(Some(vehicle_id)),
    );
    add_stop(&mut fleet, with_vehicle, area_id, 50.0);
    let without_vehicle =
        fleet.insert_route(Route::new(Uuid::new_v4()).with_area(Some(area_id)));
    add_stop(&mut fleet, without_vehicle, area_id, 50.0);

    let outcome = optimizer()
        .optimize_all_routes_for_distance(&mut fleet)
        .unwrap();
    assert_eq!(outcome.routes_processed, 2);

    let skipped = outcome
        .results
        .iter()
        .find(|r| r.route_id == without_vehicle)
        .unwrap();
    assert_eq!(skipped.status, OutcomeStatus::NoVehicleAssigned);
    assert!(skipped.message.contains("No Vehicle Assigned"));
}

#[test]
fn cancelled_routes_are_never_combine_candidates() {
    let mut fleet = Fleet::new();
    let area_id = fleet.insert_area(Area::new("NORTH", "North Area"));
    let vehicle_id = add_vehicle(&mut fleet, 1000.0, 50.0);
    let batch_id = Uuid::new_v4();

    let target = fleet.insert_route(
        Route::new(batch_id)
            .with_area(Some(area_id))
            .with_vehicle(Some(vehicle_id)),
    );
    add_stop(&mut fleet, target, area_id, 100.0);
    let cancelled = fleet.insert_route(Route::new(batch_id).with_area(Some(area_id)));
    add_stop(&mut fleet, cancelled, area_id, 100.0);
    fleet
        .route_mut(cancelled)
        .unwrap()
        .transition_to(RouteState::Cancelled)
        .unwrap();

    let outcome = optimizer()
        .combine_nearby_areas_route(&mut fleet, target)
        .unwrap();
    assert_eq!(outcome.status, OutcomeStatus::NothingToCombine);
    assert_eq!(fleet.route_demand(target).weight_kg, 100.0);
}
