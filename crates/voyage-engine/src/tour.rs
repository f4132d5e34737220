//! Tour construction and local improvement over a [`DistanceMatrix`].
//!
//! Tours are open paths: they start at their first element and end at
//! their last, with no return leg.

use crate::matrix::DistanceMatrix;
use crate::mst::WeightedEdge;

/// Depth-first preorder walk of an MST from `root`.
///
/// Children are visited in the order their edges appear in `mst`. Nodes
/// not connected to `root` are left out.
#[must_use]
pub fn mst_to_tour(mst: &[WeightedEdge], n: usize, root: usize) -> Vec<usize> {
    if root >= n {
        return Vec::new();
    }

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    for edge in mst {
        adjacency[edge.a].push(edge.b);
        adjacency[edge.b].push(edge.a);
    }

    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut stack = vec![root];
    while let Some(u) = stack.pop() {
        if visited[u] {
            continue;
        }
        visited[u] = true;
        order.push(u);
        for &v in adjacency[u].iter().rev() {
            if !visited[v] {
                stack.push(v);
            }
        }
    }
    order
}

/// Open-path cost of visiting `tour` in order.
#[must_use]
pub fn tour_cost(tour: &[usize], matrix: &DistanceMatrix) -> f64 {
    tour.windows(2).map(|w| matrix.get(w[0], w[1])).sum()
}

/// Greedy tour from `start`, always moving to the cheapest reachable
/// unvisited index (lowest index on ties).
///
/// Stops early when no unvisited index is reachable, so the result may
/// be shorter than the matrix.
#[must_use]
pub fn nearest_neighbor(matrix: &DistanceMatrix, start: usize) -> Vec<usize> {
    let n = matrix.len();
    if start >= n {
        return Vec::new();
    }

    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut current = start;
    visited[current] = true;
    order.push(current);

    while order.len() < n {
        let next = (0..n)
            .filter(|&j| !visited[j] && matrix.get(current, j).is_finite())
            .min_by(|&a, &b| {
                matrix
                    .get(current, a)
                    .total_cmp(&matrix.get(current, b))
                    .then(a.cmp(&b))
            });
        let Some(next) = next else {
            break;
        };
        visited[next] = true;
        order.push(next);
        current = next;
    }
    order
}

/// Improve `tour` in place by segment reversal. Returns the number of
/// reversals applied.
///
/// The first element stays fixed. A reversal of `tour[i..=j]` is applied
/// when it lowers the open-path cost by more than `tolerance`; passes
/// repeat until one makes no change or `max_passes` is reached.
pub fn two_opt(
    tour: &mut [usize],
    matrix: &DistanceMatrix,
    tolerance: f64,
    max_passes: usize,
) -> usize {
    let len = tour.len();
    if len < 3 {
        return 0;
    }
    let asymmetric = !matrix.is_symmetric();
    let d = |a: usize, b: usize| matrix.get(a, b);

    let mut applied = 0;
    for _ in 0..max_passes {
        let mut improved = false;
        for i in 1..len - 1 {
            for j in (i + 1)..len {
                let (prev, first, last) = (tour[i - 1], tour[i], tour[j]);
                let mut before = d(prev, first);
                let mut after = d(prev, last);
                if let Some(&next) = tour.get(j + 1) {
                    before += d(last, next);
                    after += d(first, next);
                }
                if asymmetric {
                    for k in i..j {
                        before += d(tour[k], tour[k + 1]);
                        after += d(tour[k + 1], tour[k]);
                    }
                }

                if before - after > tolerance {
                    tour[i..=j].reverse();
                    applied += 1;
                    improved = true;
                }
            }
        }
        if !improved {
            break;
        }
    }
    applied
}
