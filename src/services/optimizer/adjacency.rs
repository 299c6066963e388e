//! Area adjacency: decides whether two coverage areas are close enough for
//! their routes to be served by a single vehicle.

use crate::models::Area;

/// Whether two areas are compatible for route combination.
///
/// Rules, in order:
/// 1. A missing area on either side is compatible with anything. Absence of
///    an area constraint enables combination, it never blocks it.
/// 2. Equal area codes are trivially adjacent.
/// 3. Otherwise the areas are adjacent iff their cached representative
///    coordinates are within `proximity_threshold_km` of each other. Distinct
///    areas with no representative (no member customers yet) are treated as
///    not adjacent: their geography is unknown.
///
/// Pure and deterministic for a given area membership.
pub fn areas_adjacent(a: Option<&Area>, b: Option<&Area>, proximity_threshold_km: f64) -> bool {
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) => (a, b),
        _ => return true,
    };

    if a.code == b.code {
        return true;
    }

    match (a.representative, b.representative) {
        (Some(ra), Some(rb)) => ra.distance_to(&rb) <= proximity_threshold_km,
        _ => false,
    }
}
