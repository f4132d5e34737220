//! voyage-engine: Routing and tour optimization over a road network (sans-IO).
//!
//! Answers multi-stop queries over a weighted graph of locations:
//! graph -> shortest paths (Dijkstra / A*) -> distance matrix ->
//! {MST preorder + 2-opt} and/or {exact bitmask DP} -> best route.
//!
//! This crate has **no I/O dependencies** -- it operates on an in-memory
//! [`Graph`] and returns structured data. CSV loading and the JSON
//! protocol live in `voyage-io`.

pub mod diagnostics;
pub mod exact;
pub mod geodesic;
pub mod graph;
pub mod matrix;
pub mod mst;
pub mod optimizer;
pub mod shortest_path;
pub mod tour;
pub mod types;
pub mod union_find;

pub use graph::Graph;
pub use optimizer::RouteOptimizer;
pub use types::{
    Algorithm, Attributes, Coordinates, GraphError, Location, LocationId, Neighbor, OrderMode,
    RouteError, RouteResult, RouterConfig, TourStrategy,
};
