//! Integration test: load the campus dataset and answer routing queries
//! through the optimizer and the JSON protocol.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashSet;
use std::path::PathBuf;

use voyage_engine::shortest_path::dijkstra;
use voyage_engine::{
    Algorithm, Graph, LocationId, OrderMode, RouteOptimizer, RouterConfig, TourStrategy,
};
use voyage_io::{LoadOptions, RouteResponse, load_graph_from_paths, respond};

fn campus() -> Graph {
    let workspace_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf();
    let data = workspace_root.join("assets/data");
    let (graph, report) = load_graph_from_paths(
        &data.join("attractions.csv"),
        &data.join("roads.csv"),
        &LoadOptions::default(),
    )
    .expect("campus dataset should load");
    eprintln!("Loaded campus dataset: {report}");
    assert_eq!(report.locations_skipped, 0);
    assert_eq!(report.roads_skipped, 0);
    graph
}

fn ids(graph: &Graph, names: &[&str]) -> Vec<LocationId> {
    names
        .iter()
        .map(|n| graph.id_by_name(n).expect("name in dataset"))
        .collect()
}

/// Cheapest open path from `stops[0]` over every order of the rest,
/// using Dijkstra costs.
fn brute_force(graph: &Graph, stops: &[LocationId]) -> f64 {
    fn go(graph: &Graph, at: LocationId, rest: &mut Vec<LocationId>, so_far: f64, best: &mut f64) {
        if rest.is_empty() {
            *best = best.min(so_far);
            return;
        }
        let tree = dijkstra(graph, at);
        for i in 0..rest.len() {
            let next = rest.remove(i);
            go(graph, next, rest, so_far + tree.cost(next), best);
            rest.insert(i, next);
        }
    }

    let mut rest = stops[1..].to_vec();
    let mut best = f64::INFINITY;
    go(graph, stops[0], &mut rest, 0.0, &mut best);
    best
}

#[test]
fn dataset_is_connected() {
    let graph = campus();
    assert_eq!(graph.node_count(), 20);
    assert_eq!(graph.edge_count(), 62);

    let optimizer = RouteOptimizer::new(&graph, RouterConfig::default());
    let first = graph.ids().next().unwrap();
    assert!(graph.ids().all(|id| optimizer.connected(first, id)));
}

#[test]
fn flexible_route_is_optimal_for_small_sets() {
    let graph = campus();
    let optimizer = RouteOptimizer::new(&graph, RouterConfig::default());
    let stops = ids(
        &graph,
        &[
            "Main Gate",
            "Hostel A",
            "Library",
            "Workshop",
            "Canteen",
            "Sports Complex",
        ],
    );

    let route = optimizer.compute_route(&stops, OrderMode::Flexible).unwrap();
    assert_eq!(route.algorithm, Algorithm::HeldKarp);
    assert_eq!(route.stops[0], stops[0]);
    assert!((route.total_cost - brute_force(&graph, &stops)).abs() < 1e-9);

    let visited: HashSet<_> = route.stops.iter().collect();
    assert_eq!(visited.len(), stops.len());
    assert_eq!(route.path.first(), Some(&stops[0]));
    assert_eq!(route.path.last(), route.stops.last());
}

#[test]
fn fixed_route_cost_is_sum_of_shortest_legs() {
    let graph = campus();
    let optimizer = RouteOptimizer::new(&graph, RouterConfig::default());
    let stops = ids(&graph, &["Bus Stop", "Old Boys Hostel", "Workshop", "Canteen"]);

    let route = optimizer.compute_route(&stops, OrderMode::Fixed).unwrap();
    let expected: f64 = stops
        .windows(2)
        .map(|pair| dijkstra(&graph, pair[0]).cost(pair[1]))
        .sum();
    assert_eq!(route.stops, stops);
    assert!((route.total_cost - expected).abs() < 1e-9);
    for stop in &stops {
        assert!(route.path.contains(stop));
    }
}

#[test]
fn auto_is_never_worse_than_heuristics() {
    let graph = campus();
    let stops: Vec<LocationId> = graph.ids().take(12).collect();

    let cost = |strategy| {
        let config = RouterConfig {
            strategy,
            ..RouterConfig::default()
        };
        RouteOptimizer::new(&graph, config)
            .compute_route(&stops, OrderMode::Flexible)
            .unwrap()
            .total_cost
    };

    let auto = cost(TourStrategy::Auto);
    assert!(auto <= cost(TourStrategy::MstTwoOpt) + 1e-9);
    assert!(auto <= cost(TourStrategy::NearestNeighbor) + 1e-9);
}

#[test]
fn all_locations_use_approximation() {
    let graph = campus();
    let optimizer = RouteOptimizer::new(&graph, RouterConfig::default());
    let stops: Vec<LocationId> = graph.ids().collect();

    let route = optimizer.compute_route(&stops, OrderMode::Flexible).unwrap();
    assert_eq!(route.algorithm, Algorithm::MstTwoOpt);
    assert_eq!(route.stops[0], stops[0]);
    let mut sorted = route.stops.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, stops);
}

#[test]
fn full_graph_traversal_visits_every_location_once() {
    let graph = campus();
    let optimizer = RouteOptimizer::new(&graph, RouterConfig::default());
    let route = optimizer.compute_full_graph_route().unwrap();

    assert_eq!(route.algorithm, Algorithm::FullGraphTraversal);
    assert_eq!(route.stops.len(), graph.node_count());
    assert_eq!(route.stops[0], graph.id_by_name("Main Gate").unwrap());
    let unique: HashSet<_> = route.stops.iter().collect();
    assert_eq!(unique.len(), graph.node_count());
    assert!(route.total_cost > 0.0);
}

#[test]
fn json_protocol_answers_front_end_requests() {
    let graph = campus();
    let optimizer = RouteOptimizer::new(&graph, RouterConfig::default());

    let response = respond(
        r#"{"choice": 1, "count": 3, "locations": ["Main Gate", "Library", "CSE Building"]}"#,
        &optimizer,
    );
    assert!(response.success, "{:?}", response.error);
    assert_eq!(response.stop_count, Some(3));
    assert_eq!(response.route_names[0], "Main Gate");

    let text = response.to_json().unwrap();
    let back: RouteResponse = serde_json::from_str(&text).unwrap();
    assert_eq!(back, response);

    let response = respond(
        r#"{"choice": 2, "count": 2, "locations": ["Main Gate", "Metro Station"]}"#,
        &optimizer,
    );
    assert!(!response.success);

    let response = respond(r#"{"choice": 3, "count": 0, "locations": []}"#, &optimizer);
    assert!(response.success);
    assert_eq!(response.stop_count, Some(20));
}
