//! Stop re-sequencing by travel distance.
//!
//! Nearest-neighbor tour construction: greedy, deterministic, O(n²). Not an
//! exact TSP solver; routes here carry tens of stops at most.

use crate::models::Stop;
use uuid::Uuid;

/// Total travel distance (km) of stops visited in the given order.
/// Zero for an empty or single-stop tour.
pub fn route_distance(stops: &[&Stop]) -> f64 {
    stops
        .windows(2)
        .map(|w| w[0].location.distance_to(&w[1].location))
        .sum()
}

/// Order stops with the nearest-neighbor heuristic and return their ids in
/// visiting order. The anchor is the stop with the lowest existing
/// `(sequence, id)` so repeated runs are reproducible; distance ties are
/// broken by lowest id. The output is always a permutation of the input.
pub fn nearest_neighbor_order(stops: &[&Stop]) -> Vec<Uuid> {
    if stops.len() <= 1 {
        return stops.iter().map(|s| s.id).collect();
    }

    let anchor = match stops
        .iter()
        .enumerate()
        .min_by_key(|(_, s)| (s.sequence, s.id))
    {
        Some((idx, _)) => idx,
        None => return Vec::new(),
    };

    let mut visited = vec![false; stops.len()];
    let mut order = Vec::with_capacity(stops.len());
    visited[anchor] = true;
    order.push(stops[anchor].id);
    let mut current = anchor;

    for _ in 1..stops.len() {
        let next = stops
            .iter()
            .enumerate()
            .filter(|(idx, _)| !visited[*idx])
            .min_by(|(_, a), (_, b)| {
                let da = stops[current].location.distance_to(&a.location);
                let db = stops[current].location.distance_to(&b.location);
                da.total_cmp(&db).then_with(|| a.id.cmp(&b.id))
            })
            .map(|(idx, _)| idx);

        let Some(next) = next else { break };
        visited[next] = true;
        order.push(stops[next].id);
        current = next;
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, Demand};

    fn make_stop(lat: f64, lng: f64, sequence: u32) -> Stop {
        let mut stop = Stop::new(
            Uuid::new_v4(),
            "Customer",
            Coordinates::new(lat, lng).unwrap(),
            Demand::new(20.0, 2.0),
        );
        stop.sequence = sequence;
        stop
    }

    #[test]
    fn test_route_distance_trivial_tours() {
        assert_eq!(route_distance(&[]), 0.0);

        let single = make_stop(40.7128, -74.0060, 1);
        assert_eq!(route_distance(&[&single]), 0.0);
    }

    #[test]
    fn test_route_distance_sums_consecutive_legs() {
        let a = make_stop(40.7128, -74.0060, 1);
        let b = make_stop(40.7228, -74.0160, 2);
        let c = make_stop(40.6528, -74.0360, 3);

        let total = route_distance(&[&a, &b, &c]);
        let expected =
            a.location.distance_to(&b.location) + b.location.distance_to(&c.location);
        assert!((total - expected).abs() < 1e-9);
        assert!(total > 0.0);
    }

    #[test]
    fn test_nearest_neighbor_preserves_stop_set() {
        let stops = vec![
            make_stop(40.7128, -74.0060, 1),
            make_stop(40.6528, -74.0360, 2),
            make_stop(40.7228, -74.0160, 3),
            make_stop(40.7328, -73.9560, 4),
        ];
        let refs: Vec<&Stop> = stops.iter().collect();

        let order = nearest_neighbor_order(&refs);
        assert_eq!(order.len(), stops.len());

        let mut input_ids: Vec<Uuid> = stops.iter().map(|s| s.id).collect();
        let mut output_ids = order.clone();
        input_ids.sort();
        output_ids.sort();
        assert_eq!(input_ids, output_ids);
    }

    #[test]
    fn test_nearest_neighbor_visits_closer_stop_first() {
        // Anchor at lower Manhattan; the second Manhattan point is ~1.4 km
        // away, the Brooklyn-side point ~7 km. Greedy must take the close
        // one first.
        let anchor = make_stop(40.7128, -74.0060, 1);
        let far = make_stop(40.6528, -74.0360, 2);
        let near = make_stop(40.7228, -74.0160, 3);
        let refs = vec![&anchor, &far, &near];

        let order = nearest_neighbor_order(&refs);
        assert_eq!(order, vec![anchor.id, near.id, far.id]);

        // The greedy tour is no longer than visiting in reverse input order.
        let greedy: Vec<&Stop> = order
            .iter()
            .map(|id| *refs.iter().find(|s| s.id == *id).unwrap())
            .collect();
        let reversed: Vec<&Stop> = refs.iter().rev().copied().collect();
        assert!(route_distance(&greedy) <= route_distance(&reversed) + 1e-9);
        assert!(route_distance(&greedy) > 0.0);
    }

    #[test]
    fn test_nearest_neighbor_trivial_inputs() {
        assert!(nearest_neighbor_order(&[]).is_empty());

        let single = make_stop(40.7128, -74.0060, 1);
        assert_eq!(nearest_neighbor_order(&[&single]), vec![single.id]);
    }

    #[test]
    fn test_nearest_neighbor_identical_coordinates() {
        // All stops at the same point: any permutation is acceptable and the
        // tour length is zero. Not an error.
        let stops: Vec<Stop> = (1..=4).map(|i| make_stop(40.7128, -74.0060, i)).collect();
        let refs: Vec<&Stop> = stops.iter().collect();

        let order = nearest_neighbor_order(&refs);
        assert_eq!(order.len(), 4);
        let ordered: Vec<&Stop> = order
            .iter()
            .map(|id| *refs.iter().find(|s| s.id == *id).unwrap())
            .collect();
        assert_eq!(route_distance(&ordered), 0.0);
    }

    #[test]
    fn test_nearest_neighbor_anchor_is_lowest_sequence() {
        let mut stops = vec![
            make_stop(40.7328, -73.9560, 3),
            make_stop(40.7128, -74.0060, 1),
            make_stop(40.7228, -74.0160, 2),
        ];
        // Shuffle input positions; the anchor is picked by sequence, not by
        // slice position.
        stops.swap(0, 1);
        let refs: Vec<&Stop> = stops.iter().collect();

        let order = nearest_neighbor_order(&refs);
        let anchor = stops.iter().find(|s| s.sequence == 1).unwrap();
        assert_eq!(order[0], anchor.id);
    }
}
