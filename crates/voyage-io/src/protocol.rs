//! JSON request/response protocol for one routing query.
//!
//! Request: `{"choice": 1|2|3, "count": n, "locations": [names]}` where
//! choice 1 is flexible order, 2 fixed order, and 3 full-graph traversal.
//! Response fields are camelCase:
//! `{"success", "algorithm", "totalTime", "stopCount", "routeNames", "error"}`.

use serde::{Deserialize, Serialize};
use tracing::debug;
use voyage_engine::{Graph, LocationId, OrderMode, RouteError, RouteOptimizer, RouteResult};

/// Menu choice for flexible-order routing.
pub const CHOICE_FLEXIBLE: u8 = 1;
/// Menu choice for fixed-order routing.
pub const CHOICE_FIXED: u8 = 2;
/// Menu choice for full-graph traversal.
pub const CHOICE_FULL_GRAPH: u8 = 3;

/// A routing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRequest {
    /// Query kind, see the `CHOICE_*` constants.
    pub choice: u8,
    /// Declared number of locations. Ignored for full-graph traversal.
    #[serde(default)]
    pub count: usize,
    /// Location names, first one is the start.
    #[serde(default)]
    pub locations: Vec<String>,
}

/// What a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    /// Route through the named locations.
    Route(OrderMode),
    /// Visit every location in the graph.
    FullGraph,
}

/// A routing response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    /// Whether a route was found.
    pub success: bool,
    /// Name of the algorithm that produced the route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// Total travel cost.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time: Option<f64>,
    /// Number of stops.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_count: Option<usize>,
    /// Stop names in visiting order.
    #[serde(default)]
    pub route_names: Vec<String>,
    /// Failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reasons a request cannot be answered.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The request is not valid JSON for [`RouteRequest`].
    #[error("invalid request: {0}")]
    Json(#[from] serde_json::Error),

    /// `choice` is not 1, 2, or 3.
    #[error("invalid choice {0}; expected 1, 2, or 3")]
    InvalidChoice(u8),

    /// `count` disagrees with the number of names.
    #[error("count {count} does not match {names} location names")]
    CountMismatch {
        /// Declared count.
        count: usize,
        /// Number of names supplied.
        names: usize,
    },

    /// A name does not resolve to a location.
    #[error("unknown location '{0}'")]
    UnknownName(String),

    /// The optimizer rejected the query.
    #[error(transparent)]
    Route(#[from] RouteError),
}

impl RouteRequest {
    /// Parse a request from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Json`] on malformed input.
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode `choice` and check `count`.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::InvalidChoice`] or [`ProtocolError::CountMismatch`].
    pub fn query(&self) -> Result<Query, ProtocolError> {
        let mode = match self.choice {
            CHOICE_FLEXIBLE => OrderMode::Flexible,
            CHOICE_FIXED => OrderMode::Fixed,
            CHOICE_FULL_GRAPH => return Ok(Query::FullGraph),
            other => return Err(ProtocolError::InvalidChoice(other)),
        };
        if self.count != self.locations.len() {
            return Err(ProtocolError::CountMismatch {
                count: self.count,
                names: self.locations.len(),
            });
        }
        Ok(Query::Route(mode))
    }

    /// Resolve location names against `graph`.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::UnknownName`] for the first name not in the graph.
    pub fn resolve(&self, graph: &Graph) -> Result<Vec<LocationId>, ProtocolError> {
        self.locations
            .iter()
            .map(|name| {
                graph
                    .id_by_name(name)
                    .ok_or_else(|| ProtocolError::UnknownName(name.clone()))
            })
            .collect()
    }
}

impl RouteResponse {
    /// A successful response for `route`, naming stops through `graph`.
    #[must_use]
    pub fn from_route(route: &RouteResult, graph: &Graph) -> Self {
        Self {
            success: true,
            algorithm: Some(route.algorithm.name().to_owned()),
            total_time: Some(route.total_cost),
            stop_count: Some(route.stops.len()),
            route_names: stop_names(route, graph),
            error: None,
        }
    }

    /// A failure response carrying `message`.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            algorithm: None,
            total_time: None,
            stop_count: None,
            route_names: Vec::new(),
            error: Some(message.into()),
        }
    }

    /// Serialize to a JSON string.
    ///
    /// # Errors
    ///
    /// Propagates `serde_json` errors.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Display names of the stops in `route`.
#[must_use]
pub fn stop_names(route: &RouteResult, graph: &Graph) -> Vec<String> {
    route
        .stops
        .iter()
        .map(|&id| {
            graph
                .location(id)
                .map_or_else(|| id.to_string(), |l| l.name.clone())
        })
        .collect()
}

/// Answer one request.
///
/// # Errors
///
/// Any [`ProtocolError`] other than [`ProtocolError::Json`].
pub fn execute(
    request: &RouteRequest,
    optimizer: &RouteOptimizer<'_>,
) -> Result<RouteResult, ProtocolError> {
    let route = match request.query()? {
        Query::FullGraph => optimizer.compute_full_graph_route()?,
        Query::Route(mode) => {
            let ids = request.resolve(optimizer.graph())?;
            optimizer.compute_route(&ids, mode)?
        }
    };
    Ok(route)
}

/// Answer a JSON request with a response. Every failure becomes a
/// `success: false` response.
#[must_use]
pub fn respond(json: &str, optimizer: &RouteOptimizer<'_>) -> RouteResponse {
    let outcome = RouteRequest::from_json(json).and_then(|request| execute(&request, optimizer));
    match outcome {
        Ok(route) => RouteResponse::from_route(&route, optimizer.graph()),
        Err(e) => {
            debug!(error = %e, "request failed");
            RouteResponse::failure(e.to_string())
        }
    }
}
