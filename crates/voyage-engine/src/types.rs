//! Shared types for the voyage routing engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier of a location in the road network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub u32);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u32> for LocationId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

impl Coordinates {
    /// Create a new coordinate pair.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and inside their valid range.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude.abs() <= 90.0
            && self.longitude.abs() <= 180.0
    }

    /// Convert to a `geo::Point` (x = longitude, y = latitude).
    #[must_use]
    pub fn to_point(self) -> geo::Point<f64> {
        geo::Point::new(self.longitude, self.latitude)
    }
}

/// Display-only attributes of a location. Never used for routing cost.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    /// Visitor rating.
    pub rating: Option<f64>,
    /// Typical visit duration in minutes.
    pub visit_duration: Option<f64>,
    /// Entry fee.
    pub entry_fee: Option<f64>,
    /// Popularity score.
    pub popularity: Option<f64>,
}

/// A point of interest in the road network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Unique identifier.
    pub id: LocationId,
    /// Display name, also used for reverse lookup.
    pub name: String,
    /// Category label (e.g. "Academic", "Food").
    pub category: String,
    /// Geographic position, if known.
    pub coordinates: Option<Coordinates>,
    /// Display attributes.
    #[serde(default)]
    pub attributes: Attributes,
}

impl Location {
    /// Create a location without display attributes.
    #[must_use]
    pub fn new(
        id: impl Into<LocationId>,
        name: impl Into<String>,
        category: impl Into<String>,
        coordinates: Option<Coordinates>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            coordinates,
            attributes: Attributes::default(),
        }
    }

    /// Coordinates usable for great-circle estimates, if any.
    #[must_use]
    pub fn valid_coordinates(&self) -> Option<Coordinates> {
        self.coordinates.filter(|c| c.is_valid())
    }
}

/// One adjacency entry: the neighbor and the travel cost to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Target location.
    pub target: LocationId,
    /// Non-negative travel cost.
    pub weight: f64,
}

/// Whether the caller fixed the visiting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderMode {
    /// Visit the locations in the given order.
    Fixed,
    /// The optimizer may reorder the locations; the first one stays the start.
    #[default]
    Flexible,
}

/// Tour algorithm selection for flexible-order queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TourStrategy {
    /// Choose by instance size: exact for small instances, exact raced
    /// against MST + 2-opt for medium ones, MST + 2-opt above that.
    #[default]
    Auto,
    /// Bitmask dynamic program. Falls back to MST + 2-opt above the
    /// exact size limit.
    Exact,
    /// MST preorder tour refined by 2-opt.
    MstTwoOpt,
    /// Nearest-neighbor greedy construction.
    NearestNeighbor,
}

/// The algorithm that produced a [`RouteResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    /// Trivial single-stop route.
    SingleLocation,
    /// Fixed order, consecutive A* legs.
    SequentialAStar,
    /// Bitmask dynamic program (Held-Karp).
    HeldKarp,
    /// Kruskal MST, preorder walk, 2-opt refinement.
    MstTwoOpt,
    /// Nearest-neighbor greedy.
    NearestNeighbor,
    /// Whole-graph Kruskal MST, preorder walk, A* legs.
    FullGraphTraversal,
}

impl Algorithm {
    /// Human-readable algorithm name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SingleLocation => "Single Location",
            Self::SequentialAStar => "Fixed Order (A*)",
            Self::HeldKarp => "Held-Karp DP (exact)",
            Self::MstTwoOpt => "MST Approximation + 2-opt",
            Self::NearestNeighbor => "Nearest Neighbor Greedy",
            Self::FullGraphTraversal => "Kruskal + DFS + A*",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one routing query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    /// Which algorithm produced the order.
    pub algorithm: Algorithm,
    /// Sum of travel costs along the route.
    pub total_cost: f64,
    /// Requested locations in visiting order.
    pub stops: Vec<LocationId>,
    /// Every location traversed, legs joined at their shared endpoints.
    pub path: Vec<LocationId>,
}

/// Tuning parameters for the route optimizer.
///
/// Thresholds follow the instance-size policy: exact up to
/// `exact_threshold`, exact raced against MST + 2-opt up to
/// `race_threshold`, MST + 2-opt above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Multiplier from great-circle kilometres to edge-weight units for
    /// the A* estimate. Must not overestimate real travel cost; `0.0`
    /// turns A* into plain Dijkstra.
    pub heuristic_cost_per_km: f64,

    /// Largest flexible instance solved by the exact solver alone.
    pub exact_threshold: usize,

    /// Largest flexible instance where the exact solver still runs
    /// alongside the approximation. Clamped to [`crate::exact::EXACT_LIMIT`].
    pub race_threshold: usize,

    /// Maximum number of full 2-opt passes.
    pub two_opt_max_passes: usize,

    /// Minimum improvement for a 2-opt reversal to be applied.
    pub two_opt_tolerance: f64,

    /// Algorithm selection for flexible-order queries.
    pub strategy: TourStrategy,
}

impl RouterConfig {
    /// Default A* scale: one cost unit per kilometre.
    pub const DEFAULT_HEURISTIC_COST_PER_KM: f64 = 1.0;
    /// Default exact-only threshold.
    pub const DEFAULT_EXACT_THRESHOLD: usize = 10;
    /// Default exact-vs-approximation threshold.
    pub const DEFAULT_RACE_THRESHOLD: usize = 15;
    /// Default 2-opt pass cap.
    pub const DEFAULT_TWO_OPT_MAX_PASSES: usize = 100;
    /// Default 2-opt improvement tolerance.
    pub const DEFAULT_TWO_OPT_TOLERANCE: f64 = 1e-3;
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            heuristic_cost_per_km: Self::DEFAULT_HEURISTIC_COST_PER_KM,
            exact_threshold: Self::DEFAULT_EXACT_THRESHOLD,
            race_threshold: Self::DEFAULT_RACE_THRESHOLD,
            two_opt_max_passes: Self::DEFAULT_TWO_OPT_MAX_PASSES,
            two_opt_tolerance: Self::DEFAULT_TWO_OPT_TOLERANCE,
            strategy: TourStrategy::default(),
        }
    }
}

/// Errors raised while building a [`Graph`](crate::Graph).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// An edge endpoint is not in the node table.
    #[error("unknown location {0}")]
    UnknownLocation(LocationId),

    /// Edge weights must be finite and non-negative.
    #[error("invalid edge weight {weight} between {from} and {to}")]
    InvalidWeight {
        /// Source endpoint.
        from: LocationId,
        /// Target endpoint.
        to: LocationId,
        /// The rejected weight.
        weight: f64,
    },
}

/// Errors raised by routing queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The query named no locations.
    #[error("no locations selected")]
    NoLocations,

    /// A requested location is not in the graph.
    #[error("unknown location {0}")]
    UnknownLocation(LocationId),

    /// The requested locations are not mutually reachable.
    #[error("selected locations are not reachable from each other")]
    Unreachable,

    /// The graph has more than one connected component.
    #[error("graph is not connected; full traversal impossible")]
    Disconnected,

    /// A stop on an A* leg has no usable coordinates.
    #[error("location {0} has no usable coordinates")]
    MissingCoordinates(LocationId),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_validity() {
        assert!(Coordinates::new(26.47, 73.11).is_valid());
        assert!(Coordinates::new(-90.0, 180.0).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, f64::INFINITY).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -180.5).is_valid());
    }

    #[test]
    fn coordinates_to_point_is_lon_lat() {
        let p = Coordinates::new(10.0, 20.0).to_point();
        assert!((p.x() - 20.0).abs() < f64::EPSILON);
        assert!((p.y() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn location_valid_coordinates_filters_degenerate() {
        let mut loc = Location::new(1, "Library", "Academic", Some(Coordinates::new(1.0, 2.0)));
        assert!(loc.valid_coordinates().is_some());
        loc.coordinates = Some(Coordinates::new(f64::NAN, 2.0));
        assert!(loc.valid_coordinates().is_none());
        loc.coordinates = None;
        assert!(loc.valid_coordinates().is_none());
    }

    #[test]
    fn router_config_defaults() {
        let config = RouterConfig::default();
        assert_eq!(config.exact_threshold, 10);
        assert_eq!(config.race_threshold, 15);
        assert_eq!(config.two_opt_max_passes, 100);
        assert!((config.two_opt_tolerance - 1e-3).abs() < f64::EPSILON);
        assert_eq!(config.strategy, TourStrategy::Auto);
    }

    #[test]
    fn router_config_partial_json_uses_defaults() {
        let config: RouterConfig = serde_json::from_str(r#"{"exact_threshold": 8}"#).unwrap();
        assert_eq!(config.exact_threshold, 8);
        assert_eq!(config.race_threshold, RouterConfig::DEFAULT_RACE_THRESHOLD);
    }

    #[test]
    fn location_id_serializes_as_number() {
        let json = serde_json::to_string(&LocationId(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn route_error_display() {
        assert_eq!(
            RouteError::Unreachable.to_string(),
            "selected locations are not reachable from each other",
        );
        assert_eq!(
            RouteError::UnknownLocation(LocationId(3)).to_string(),
            "unknown location 3",
        );
        assert_eq!(
            RouteError::MissingCoordinates(LocationId(5)).to_string(),
            "location 5 has no usable coordinates",
        );
    }

    #[test]
    fn algorithm_display_uses_name() {
        assert_eq!(Algorithm::HeldKarp.to_string(), "Held-Karp DP (exact)");
    }
}
