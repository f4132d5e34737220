//! Single-source (Dijkstra) and point-to-point (A*) shortest-path search.
//!
//! Both searches run over dense node indices with a binary-heap frontier
//! and discard stale heap entries lazily on pop.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::geodesic;
use crate::graph::Graph;
use crate::types::LocationId;

/// Frontier entry ordered so that `BinaryHeap` pops the smallest key.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    key: f64,
    index: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .total_cmp(&self.key)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// Dijkstra
// ---------------------------------------------------------------------------

/// Result of a single-source search: costs and predecessors for every node.
#[derive(Debug, Clone)]
pub struct ShortestPathTree<'g> {
    graph: &'g Graph,
    cost: Vec<f64>,
    predecessor: Vec<Option<usize>>,
}

impl ShortestPathTree<'_> {
    /// Shortest cost from the source to `target`; infinite if unreachable
    /// or unknown.
    #[must_use]
    pub fn cost(&self, target: LocationId) -> f64 {
        self.graph
            .index_of(target)
            .map_or(f64::INFINITY, |i| self.cost[i])
    }

    /// Cost by dense index.
    pub(crate) fn cost_at(&self, index: usize) -> f64 {
        self.cost[index]
    }

    /// Node sequence from the source to `target`, both inclusive.
    ///
    /// `None` if `target` is unknown or unreachable.
    #[must_use]
    pub fn path_to(&self, target: LocationId) -> Option<Vec<LocationId>> {
        let end = self.graph.index_of(target)?;
        if !self.cost[end].is_finite() {
            return None;
        }
        let mut path = vec![target];
        let mut current = end;
        while let Some(prev) = self.predecessor[current] {
            path.push(self.graph.id_at(prev)?);
            current = prev;
        }
        path.reverse();
        Some(path)
    }
}

/// Shortest costs from `source` to every node.
///
/// An unknown `source` yields a tree with every cost infinite.
#[must_use]
pub fn dijkstra(graph: &Graph, source: LocationId) -> ShortestPathTree<'_> {
    let n = graph.node_count();
    let mut cost = vec![f64::INFINITY; n];
    let mut predecessor = vec![None; n];
    let mut settled = vec![false; n];

    if let Some(s) = graph.index_of(source) {
        cost[s] = 0.0;
        let mut heap = BinaryHeap::new();
        heap.push(Frontier { key: 0.0, index: s });

        while let Some(Frontier { key, index: u }) = heap.pop() {
            if settled[u] || key > cost[u] {
                continue;
            }
            settled[u] = true;

            for edge in graph.neighbors_at(u) {
                let Some(v) = graph.index_of(edge.target) else {
                    continue;
                };
                let candidate = key + edge.weight;
                if candidate < cost[v] {
                    cost[v] = candidate;
                    predecessor[v] = Some(u);
                    heap.push(Frontier {
                        key: candidate,
                        index: v,
                    });
                }
            }
        }
    }

    ShortestPathTree {
        graph,
        cost,
        predecessor,
    }
}

// ---------------------------------------------------------------------------
// A*
// ---------------------------------------------------------------------------

/// A road path between two locations.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Total travel cost.
    pub cost: f64,
    /// Every node traversed, endpoints included.
    pub nodes: Vec<LocationId>,
}

/// Point-to-point search guided by the great-circle estimate.
///
/// Returns `None` if either endpoint is unknown or lacks usable
/// coordinates, or if `goal` is unreachable. `cost_per_km` scales the
/// haversine estimate and must not overestimate real travel cost.
#[must_use]
pub fn astar(graph: &Graph, start: LocationId, goal: LocationId, cost_per_km: f64) -> Option<Path> {
    let s = graph.index_of(start)?;
    let t = graph.index_of(goal)?;
    let goal_coords = graph.location_at(t).valid_coordinates()?;
    graph.location_at(s).valid_coordinates()?;

    if s == t {
        return Some(Path {
            cost: 0.0,
            nodes: vec![start],
        });
    }

    let n = graph.node_count();
    let h = |i: usize| {
        geodesic::estimate(
            graph.location_at(i).valid_coordinates(),
            Some(goal_coords),
            cost_per_km,
        )
    };

    let mut g_score = vec![f64::INFINITY; n];
    let mut came_from: Vec<Option<usize>> = vec![None; n];
    let mut closed = vec![false; n];
    let mut open = BinaryHeap::new();

    g_score[s] = 0.0;
    open.push(Frontier { key: h(s), index: s });

    while let Some(Frontier { key, index: u }) = open.pop() {
        if closed[u] || key > g_score[u] + h(u) {
            continue;
        }
        if u == t {
            return Some(Path {
                cost: g_score[t],
                nodes: reconstruct(graph, &came_from, t)?,
            });
        }
        closed[u] = true;

        for edge in graph.neighbors_at(u) {
            let Some(v) = graph.index_of(edge.target) else {
                continue;
            };
            if closed[v] {
                continue;
            }
            let tentative = g_score[u] + edge.weight;
            if tentative < g_score[v] {
                came_from[v] = Some(u);
                g_score[v] = tentative;
                open.push(Frontier {
                    key: tentative + h(v),
                    index: v,
                });
            }
        }
    }

    None
}

fn reconstruct(graph: &Graph, came_from: &[Option<usize>], end: usize) -> Option<Vec<LocationId>> {
    let mut nodes = vec![graph.id_at(end)?];
    let mut current = end;
    while let Some(prev) = came_from[current] {
        nodes.push(graph.id_at(prev)?);
        current = prev;
    }
    nodes.reverse();
    Some(nodes)
}
