//! Dense distance matrices among a subset of locations.

use crate::graph::Graph;
use crate::shortest_path::{ShortestPathTree, dijkstra};
use crate::types::LocationId;

/// Dense `n x n` cost matrix. Unreachable pairs are `f64::INFINITY`.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    costs: Vec<f64>,
    symmetric: bool,
}

impl DistanceMatrix {
    /// Build from row vectors. Rows shorter than the row count are padded
    /// with `f64::INFINITY`; the diagonal is forced to zero.
    #[must_use]
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let n = rows.len();
        let mut costs = vec![f64::INFINITY; n * n];
        for (i, row) in rows.iter().enumerate() {
            for (j, &c) in row.iter().take(n).enumerate() {
                costs[i * n + j] = c;
            }
            costs[i * n + i] = 0.0;
        }
        Self::from_costs(n, costs)
    }

    fn from_costs(n: usize, costs: Vec<f64>) -> Self {
        let symmetric = (0..n).all(|i| {
            ((i + 1)..n).all(|j| {
                let (a, b) = (costs[i * n + j], costs[j * n + i]);
                a.total_cmp(&b).is_eq() || (a - b).abs() <= f64::EPSILON * a.abs().max(b.abs())
            })
        });
        Self {
            n,
            costs,
            symmetric,
        }
    }

    /// Number of rows (and columns).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.n
    }

    /// Returns `true` for the `0 x 0` matrix.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Cost from `i` to `j`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.costs[i * self.n + j]
    }

    /// Whether `get(i, j) == get(j, i)` for every pair.
    #[must_use]
    pub const fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    /// Whether every off-diagonal entry is finite.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.costs.iter().all(|c| c.is_finite())
    }
}

/// A [`DistanceMatrix`] over graph locations, keeping one shortest-path
/// tree per row so legs can be expanded into road paths.
#[derive(Debug, Clone)]
pub struct RoadMatrix<'g> {
    ids: Vec<LocationId>,
    matrix: DistanceMatrix,
    trees: Vec<ShortestPathTree<'g>>,
}

impl<'g> RoadMatrix<'g> {
    /// Run one Dijkstra search per location in `ids`.
    #[must_use]
    pub fn build(graph: &'g Graph, ids: &[LocationId]) -> Self {
        let n = ids.len();
        let trees: Vec<_> = ids.iter().map(|&id| dijkstra(graph, id)).collect();

        let mut costs = vec![f64::INFINITY; n * n];
        for (i, tree) in trees.iter().enumerate() {
            for (j, &target) in ids.iter().enumerate() {
                costs[i * n + j] = if i == j {
                    0.0
                } else {
                    graph
                        .index_of(target)
                        .map_or(f64::INFINITY, |t| tree.cost_at(t))
                };
            }
        }

        Self {
            ids: ids.to_vec(),
            matrix: DistanceMatrix::from_costs(n, costs),
            trees,
        }
    }

    /// The underlying cost matrix.
    #[must_use]
    pub const fn matrix(&self) -> &DistanceMatrix {
        &self.matrix
    }

    /// Location id of row `i`.
    #[must_use]
    pub fn id(&self, i: usize) -> LocationId {
        self.ids[i]
    }

    /// Road path from row `i` to row `j`, endpoints included.
    #[must_use]
    pub fn leg(&self, i: usize, j: usize) -> Option<Vec<LocationId>> {
        if i == j {
            return Some(vec![self.ids[i]]);
        }
        self.trees[i].path_to(self.ids[j])
    }

    /// Stops and joined road path for a tour of row indices.
    ///
    /// `None` if any leg is unreachable.
    #[must_use]
    pub fn expand(&self, tour: &[usize]) -> Option<(Vec<LocationId>, Vec<LocationId>)> {
        let stops: Vec<LocationId> = tour.iter().map(|&i| self.ids[i]).collect();
        let mut path = Vec::new();
        if let Some(&first) = tour.first() {
            path.push(self.ids[first]);
        }
        for pair in tour.windows(2) {
            let leg = self.leg(pair[0], pair[1])?;
            path.extend(leg.into_iter().skip(1));
        }
        Some((stops, path))
    }
}
