//! Route optimizer facade: validation, connectivity pre-check, algorithm
//! selection, and leg expansion.
//!
//! # Algorithm selection (flexible order)
//!
//! | Locations                         | [`TourStrategy::Auto`]                |
//! |-----------------------------------|---------------------------------------|
//! | `n <= exact_threshold`            | exact DP                              |
//! | `exact_threshold < n <= race`     | exact DP and MST + 2-opt, lower wins  |
//! | `n > race`                        | MST + 2-opt                           |
//!
//! Ties between the exact and approximate candidates go to the exact one.

use tracing::debug;

use crate::diagnostics::{
    Clock, FrozenClock, RouteDiagnostics, RouteSummary, StageDiagnostics, StageMetrics, timed,
};
use crate::exact::{EXACT_LIMIT, solve_exact};
use crate::graph::Graph;
use crate::matrix::{DistanceMatrix, RoadMatrix};
use crate::mst::{WeightedEdge, kruskal};
use crate::shortest_path::astar;
use crate::tour::{mst_to_tour, nearest_neighbor, tour_cost, two_opt};
use crate::types::{
    Algorithm, Location, LocationId, OrderMode, RouteError, RouteResult, RouterConfig,
    TourStrategy,
};
use crate::union_find::UnionFind;

/// Answers routing queries over a read-only [`Graph`].
///
/// Whole-graph connectivity is computed once at construction, so every
/// query method takes `&self`.
#[derive(Debug, Clone)]
pub struct RouteOptimizer<'g> {
    graph: &'g Graph,
    config: RouterConfig,
    component: Vec<usize>,
}

/// A visiting order over matrix rows, with its open-path cost.
#[derive(Debug, Clone)]
struct Candidate {
    algorithm: Algorithm,
    order: Vec<usize>,
    cost: f64,
}

impl Candidate {
    fn is_complete(&self, n: usize) -> bool {
        self.order.len() == n && self.cost.is_finite()
    }
}

/// Which solvers run for a flexible query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plan {
    Exact,
    Race,
    Approximate(Algorithm),
}

/// Optional stage timings gathered while routing.
#[derive(Default)]
struct Stages {
    matrix: Option<StageDiagnostics>,
    exact: Option<StageDiagnostics>,
    approximation: Option<StageDiagnostics>,
    legs: Option<StageDiagnostics>,
}

impl<'g> RouteOptimizer<'g> {
    /// Freeze the connectivity of `graph` and keep `config` for queries.
    #[must_use]
    pub fn new(graph: &'g Graph, config: RouterConfig) -> Self {
        let n = graph.node_count();
        let mut uf = UnionFind::new(n);
        for u in 0..n {
            for edge in graph.neighbors_at(u) {
                if let Some(v) = graph.index_of(edge.target) {
                    uf.unite(u, v);
                }
            }
        }
        let component = uf.components();
        debug!(nodes = n, edges = graph.edge_count(), "froze graph connectivity");

        Self {
            graph,
            config,
            component,
        }
    }

    /// The graph this optimizer routes over.
    #[must_use]
    pub const fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Whether `a` and `b` lie in the same connected component, ignoring
    /// edge direction. Unknown ids are never connected.
    #[must_use]
    pub fn connected(&self, a: LocationId, b: LocationId) -> bool {
        match (self.graph.index_of(a), self.graph.index_of(b)) {
            (Some(i), Some(j)) => self.component[i] == self.component[j],
            _ => false,
        }
    }

    /// Route through `ids`, starting at `ids[0]`.
    ///
    /// In [`OrderMode::Fixed`] the stops are visited as given; in
    /// [`OrderMode::Flexible`] the optimizer picks the order.
    ///
    /// # Errors
    ///
    /// [`RouteError::NoLocations`] for an empty request,
    /// [`RouteError::UnknownLocation`] for an id not in the graph, and
    /// [`RouteError::Unreachable`] when the stops cannot all be reached.
    /// Fixed order also fails with [`RouteError::MissingCoordinates`] for a
    /// stop without usable coordinates.
    pub fn compute_route(
        &self,
        ids: &[LocationId],
        mode: OrderMode,
    ) -> Result<RouteResult, RouteError> {
        self.compute_route_with_diagnostics(ids, mode, &FrozenClock)
            .map(|(route, _)| route)
    }

    /// [`compute_route`](Self::compute_route), also returning per-stage
    /// diagnostics timed with `clock`.
    ///
    /// # Errors
    ///
    /// Same as [`compute_route`](Self::compute_route).
    #[tracing::instrument(level = "debug", skip_all, fields(n = ids.len(), ?mode))]
    pub fn compute_route_with_diagnostics<C: Clock>(
        &self,
        ids: &[LocationId],
        mode: OrderMode,
        clock: &C,
    ) -> Result<(RouteResult, RouteDiagnostics), RouteError> {
        let start = clock.now();

        let (checked, duration) = timed(clock, || self.validate(ids));
        checked?;
        let validate = StageDiagnostics {
            duration,
            metrics: StageMetrics::Validate {
                requested: ids.len(),
                mode,
            },
        };

        let mut stages = Stages::default();
        let route = match (ids, mode) {
            ([only], _) => RouteResult {
                algorithm: Algorithm::SingleLocation,
                total_cost: 0.0,
                stops: vec![*only],
                path: vec![*only],
            },
            (_, OrderMode::Fixed) => self.fixed_route(ids, clock, &mut stages)?,
            (_, OrderMode::Flexible) => self.flexible_route(ids, clock, &mut stages)?,
        };

        debug!(
            algorithm = %route.algorithm,
            cost = route.total_cost,
            path_nodes = route.path.len(),
            "route computed",
        );

        let diagnostics = RouteDiagnostics {
            validate,
            matrix: stages.matrix,
            exact: stages.exact,
            approximation: stages.approximation,
            legs: stages.legs,
            total_duration: clock.elapsed(&start),
            summary: RouteSummary {
                algorithm: route.algorithm,
                stop_count: route.stops.len(),
                total_cost: route.total_cost,
                path_nodes: route.path.len(),
            },
        };
        Ok((route, diagnostics))
    }

    /// Visit every location in the graph.
    ///
    /// Builds a Kruskal MST over every edge, walks it in preorder from the
    /// smallest id, and joins consecutive stops with A* legs.
    ///
    /// # Errors
    ///
    /// [`RouteError::NoLocations`] for an empty graph,
    /// [`RouteError::Disconnected`] if the graph has more than one
    /// component, [`RouteError::MissingCoordinates`] for a location without
    /// usable coordinates, and [`RouteError::Unreachable`] if a leg cannot
    /// be found.
    #[tracing::instrument(level = "debug", skip_all, fields(nodes = self.graph.node_count()))]
    pub fn compute_full_graph_route(&self) -> Result<RouteResult, RouteError> {
        let graph = self.graph;
        let n = graph.node_count();
        let root = graph
            .ids()
            .next()
            .and_then(|id| graph.index_of(id))
            .ok_or(RouteError::NoLocations)?;

        let edges: Vec<WeightedEdge> = (0..n)
            .flat_map(|u| {
                graph.neighbors_at(u).iter().filter_map(move |edge| {
                    graph
                        .index_of(edge.target)
                        .map(|v| WeightedEdge::new(u, v, edge.weight))
                })
            })
            .collect();
        let mst = kruskal(&edges, n);
        if mst.len() + 1 < n {
            debug!(mst_edges = mst.len(), "graph is disconnected");
            return Err(RouteError::Disconnected);
        }

        let stops: Vec<LocationId> = mst_to_tour(&mst, n, root)
            .into_iter()
            .filter_map(|i| graph.id_at(i))
            .collect();
        let (total_cost, path) = self.sequential_legs(&stops)?;

        Ok(RouteResult {
            algorithm: Algorithm::FullGraphTraversal,
            total_cost,
            stops,
            path,
        })
    }

    // -----------------------------------------------------------------------
    // Query stages
    // -----------------------------------------------------------------------

    fn validate(&self, ids: &[LocationId]) -> Result<(), RouteError> {
        let (&first, rest) = ids.split_first().ok_or(RouteError::NoLocations)?;
        if let Some(&unknown) = ids.iter().find(|&&id| !self.graph.contains(id)) {
            return Err(RouteError::UnknownLocation(unknown));
        }
        if rest.iter().any(|&id| !self.connected(first, id)) {
            return Err(RouteError::Unreachable);
        }
        Ok(())
    }

    /// Join consecutive stops with A* legs. Every stop needs usable
    /// coordinates once there is at least one leg.
    fn sequential_legs(&self, stops: &[LocationId]) -> Result<(f64, Vec<LocationId>), RouteError> {
        if stops.len() > 1 {
            if let Some(&id) = stops.iter().find(|&&id| {
                self.graph
                    .location(id)
                    .and_then(Location::valid_coordinates)
                    .is_none()
            }) {
                return Err(RouteError::MissingCoordinates(id));
            }
        }

        let mut total = 0.0;
        let mut path: Vec<LocationId> = stops.first().copied().into_iter().collect();
        for pair in stops.windows(2) {
            let leg = astar(
                self.graph,
                pair[0],
                pair[1],
                self.config.heuristic_cost_per_km,
            )
            .ok_or(RouteError::Unreachable)?;
            total += leg.cost;
            path.extend(leg.nodes.into_iter().skip(1));
        }
        Ok((total, path))
    }

    fn fixed_route<C: Clock>(
        &self,
        ids: &[LocationId],
        clock: &C,
        stages: &mut Stages,
    ) -> Result<RouteResult, RouteError> {
        let (legs, duration) = timed(clock, || self.sequential_legs(ids));
        let (total_cost, path) = legs?;
        stages.legs = Some(StageDiagnostics {
            duration,
            metrics: StageMetrics::Legs {
                legs: ids.len() - 1,
                path_nodes: path.len(),
            },
        });

        Ok(RouteResult {
            algorithm: Algorithm::SequentialAStar,
            total_cost,
            stops: ids.to_vec(),
            path,
        })
    }

    fn flexible_route<C: Clock>(
        &self,
        ids: &[LocationId],
        clock: &C,
        stages: &mut Stages,
    ) -> Result<RouteResult, RouteError> {
        let n = ids.len();

        let (road, duration) = timed(clock, || RoadMatrix::build(self.graph, ids));
        let matrix = road.matrix();
        stages.matrix = Some(StageDiagnostics {
            duration,
            metrics: StageMetrics::Matrix {
                size: n,
                symmetric: matrix.is_symmetric(),
                finite_pairs: finite_pairs(matrix),
            },
        });

        let plan = self.plan(n);
        debug!(?plan, symmetric = matrix.is_symmetric(), "selected tour plan");

        let exact = matches!(plan, Plan::Exact | Plan::Race).then(|| {
            let (solution, duration) = timed(clock, || solve_exact(matrix));
            stages.exact = Some(StageDiagnostics {
                duration,
                metrics: StageMetrics::Exact {
                    states: (1usize << n) * n,
                    cost: solution.cost,
                },
            });
            Candidate {
                algorithm: Algorithm::HeldKarp,
                order: solution.order,
                cost: solution.cost,
            }
        });

        let approximate = match plan {
            Plan::Exact => None,
            Plan::Race => Some(Algorithm::MstTwoOpt),
            Plan::Approximate(algorithm) => Some(algorithm),
        }
        .map(|algorithm| {
            let ((candidate, initial_cost, reversals), duration) =
                timed(clock, || self.approximate(matrix, algorithm));
            stages.approximation = Some(StageDiagnostics {
                duration,
                metrics: StageMetrics::Approximation {
                    algorithm,
                    initial_cost,
                    cost: candidate.cost,
                    reversals,
                },
            });
            candidate
        });

        if let (Some(e), Some(a)) = (&exact, &approximate) {
            debug!(exact = e.cost, approximate = a.cost, "race finished");
        }

        let best = [exact, approximate]
            .into_iter()
            .flatten()
            .reduce(|best, c| if c.cost < best.cost { c } else { best })
            .filter(|c| c.is_complete(n))
            .ok_or(RouteError::Unreachable)?;

        let (expanded, duration) = timed(clock, || road.expand(&best.order));
        let (stops, path) = expanded.ok_or(RouteError::Unreachable)?;
        stages.legs = Some(StageDiagnostics {
            duration,
            metrics: StageMetrics::Legs {
                legs: n - 1,
                path_nodes: path.len(),
            },
        });

        Ok(RouteResult {
            algorithm: best.algorithm,
            total_cost: best.cost,
            stops,
            path,
        })
    }

    fn plan(&self, n: usize) -> Plan {
        let exact_limit = self.config.exact_threshold.min(EXACT_LIMIT);
        let race_limit = self.config.race_threshold.min(EXACT_LIMIT);
        match self.config.strategy {
            TourStrategy::Auto if n <= exact_limit => Plan::Exact,
            TourStrategy::Auto if n <= race_limit => Plan::Race,
            TourStrategy::Exact if n <= EXACT_LIMIT => Plan::Exact,
            TourStrategy::Auto | TourStrategy::Exact | TourStrategy::MstTwoOpt => {
                Plan::Approximate(Algorithm::MstTwoOpt)
            }
            TourStrategy::NearestNeighbor => Plan::Approximate(Algorithm::NearestNeighbor),
        }
    }

    /// Build an approximate tour from row 0. Returns the candidate, the
    /// cost before improvement, and the number of 2-opt reversals.
    fn approximate(&self, matrix: &DistanceMatrix, algorithm: Algorithm) -> (Candidate, f64, usize) {
        let n = matrix.len();
        let mut order = if algorithm == Algorithm::NearestNeighbor {
            nearest_neighbor(matrix, 0)
        } else {
            let edges: Vec<WeightedEdge> = (0..n)
                .flat_map(|i| {
                    ((i + 1)..n)
                        .map(move |j| WeightedEdge::new(i, j, matrix.get(i, j).min(matrix.get(j, i))))
                })
                .collect();
            mst_to_tour(&kruskal(&edges, n), n, 0)
        };

        let initial_cost = tour_cost(&order, matrix);
        let reversals = if algorithm == Algorithm::MstTwoOpt && order.len() == n {
            two_opt(
                &mut order,
                matrix,
                self.config.two_opt_tolerance,
                self.config.two_opt_max_passes,
            )
        } else {
            0
        };
        let cost = tour_cost(&order, matrix);

        (
            Candidate {
                algorithm,
                order,
                cost,
            },
            initial_cost,
            reversals,
        )
    }
}

fn finite_pairs(matrix: &DistanceMatrix) -> usize {
    let n = matrix.len();
    (0..n)
        .flat_map(|i| (0..n).map(move |j| (i, j)))
        .filter(|&(i, j)| i != j && matrix.get(i, j).is_finite())
        .count()
}
