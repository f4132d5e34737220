//! Plain-text rendering of location listings and routes for the console.

use std::fmt::Write;

use voyage_engine::{Graph, RouteError, RouteResult};

use crate::protocol::stop_names;

const RULE: &str = "========================================";

/// Location listing sorted by id, one `id. name [category]` per line.
#[must_use]
pub fn format_locations(graph: &Graph) -> String {
    let mut out = String::from("--- Available Locations ---\n");
    for location in graph.locations() {
        let _ = writeln!(
            out,
            "{:>2}. {} [{}]",
            location.id, location.name, location.category
        );
    }
    out.push_str("----------------------------");
    out
}

/// Route summary: algorithm, total cost to two decimals, stop count, and
/// the numbered stops.
#[must_use]
pub fn format_route(route: &RouteResult, graph: &Graph) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}\n         OPTIMAL ROUTE\n{RULE}");
    let _ = writeln!(out, "Algorithm Used: {}", route.algorithm);
    let _ = writeln!(out, "Total Time: {:.2} minutes", route.total_cost);
    let _ = writeln!(out, "Stops: {} locations\n", route.stops.len());
    for (i, name) in stop_names(route, graph).iter().enumerate() {
        let _ = writeln!(out, "{}. {name}", i + 1);
    }
    out.push_str(RULE);
    out
}

/// Console message for a failed query.
#[must_use]
pub fn format_route_error(error: &RouteError) -> String {
    match error {
        RouteError::NoLocations => "No locations selected.".to_owned(),
        RouteError::UnknownLocation(_) | RouteError::Unreachable => {
            "[ERROR] Selected locations are NOT reachable from each other.".to_owned()
        }
        RouteError::Disconnected => {
            "[ERROR] Entire graph is NOT connected. Full traversal impossible.".to_owned()
        }
        RouteError::MissingCoordinates(id) => {
            format!("[ERROR] Location {id} has no coordinates. A* routing needs them.")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use voyage_engine::{Algorithm, Location, LocationId};

    use super::*;

    fn graph() -> Graph {
        let mut g = Graph::new();
        g.add_location(Location::new(12, "Library", "Academic", None));
        g.add_location(Location::new(3, "Main Gate", "Entry", None));
        g
    }

    #[test]
    fn locations_sorted_by_id() {
        let text = format_locations(&graph());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], " 3. Main Gate [Entry]");
        assert_eq!(lines[2], "12. Library [Academic]");
    }

    #[test]
    fn route_shows_two_decimals_and_numbered_stops() {
        let route = RouteResult {
            algorithm: Algorithm::HeldKarp,
            total_cost: 12.345,
            stops: vec![LocationId(3), LocationId(12)],
            path: vec![LocationId(3), LocationId(12)],
        };
        let text = format_route(&route, &graph());
        assert!(text.contains("Algorithm Used: Held-Karp DP (exact)"));
        assert!(text.contains("Total Time: 12.35 minutes"));
        assert!(text.contains("Stops: 2 locations"));
        assert!(text.contains("1. Main Gate\n2. Library"));
    }

    #[test]
    fn error_messages() {
        assert!(format_route_error(&RouteError::Unreachable).contains("NOT reachable"));
        assert!(
            format_route_error(&RouteError::UnknownLocation(LocationId(1)))
                .contains("NOT reachable")
        );
        assert!(format_route_error(&RouteError::Disconnected).contains("NOT connected"));

        let missing = format_route_error(&RouteError::MissingCoordinates(LocationId(7)));
        assert!(missing.contains("Location 7 has no coordinates"));
        assert!(!missing.contains("reachable"));
    }
}
