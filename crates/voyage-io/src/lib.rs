//! voyage-io: CSV ingestion, JSON protocol, and console reports.
//!
//! Everything between the outside world and `voyage-engine`: tables are
//! parsed into a [`Graph`](voyage_engine::Graph), requests are answered
//! through a [`RouteOptimizer`](voyage_engine::RouteOptimizer), and
//! results are rendered as text or JSON.

pub mod loader;
pub mod protocol;
pub mod report;

pub use loader::{LoadError, LoadOptions, LoadReport, load_graph, load_graph_from_paths};
pub use protocol::{ProtocolError, Query, RouteRequest, RouteResponse, respond};
pub use report::{format_locations, format_route, format_route_error};
