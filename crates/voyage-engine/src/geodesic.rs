//! Great-circle distance and the A* cost estimate derived from it.

use geo::Haversine;
use geo::line_measures::Distance;

use crate::types::Coordinates;

/// Metres per kilometre.
const METRES_PER_KM: f64 = 1000.0;

/// Great-circle distance between two coordinates, in kilometres.
///
/// Uses the haversine formula on a sphere of mean Earth radius.
#[must_use]
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    Haversine.distance(a.to_point(), b.to_point()) / METRES_PER_KM
}

/// Admissible cost estimate between two locations for A*.
///
/// Missing or degenerate coordinates on either side give `0.0`, which
/// never overestimates. A negative or non-finite `cost_per_km` counts as
/// `0.0`.
#[must_use]
pub fn estimate(from: Option<Coordinates>, to: Option<Coordinates>, cost_per_km: f64) -> f64 {
    if !cost_per_km.is_finite() || cost_per_km <= 0.0 {
        return 0.0;
    }
    match (from, to) {
        (Some(a), Some(b)) if a.is_valid() && b.is_valid() => haversine_km(a, b) * cost_per_km,
        _ => 0.0,
    }
}
