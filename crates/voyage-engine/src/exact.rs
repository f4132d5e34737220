//! Exact open-path tour by bitmask dynamic programming (Held-Karp).
//!
//! The path starts at index 0 and may end at any index. Time is
//! `O(2^n * n^2)` and memory `O(2^n * n)`, so instances are capped at
//! [`EXACT_LIMIT`].

use crate::matrix::DistanceMatrix;

/// Largest instance the exact solver accepts.
pub const EXACT_LIMIT: usize = 15;

/// Optimal visiting order and its cost.
#[derive(Debug, Clone, PartialEq)]
pub struct ExactSolution {
    /// Open-path cost; infinite when no complete path exists.
    pub cost: f64,
    /// Matrix indices in visiting order, starting with `0`. Empty when
    /// `cost` is infinite.
    pub order: Vec<usize>,
}

impl ExactSolution {
    const fn infeasible() -> Self {
        Self {
            cost: f64::INFINITY,
            order: Vec::new(),
        }
    }
}

/// Solve the open-path tour exactly.
///
/// Only finite matrix entries are used as transitions. Among equally
/// cheap complete paths the one ending at the lowest index wins.
#[must_use]
pub fn solve_exact(matrix: &DistanceMatrix) -> ExactSolution {
    let n = matrix.len();
    if n == 0 || n > EXACT_LIMIT {
        return ExactSolution::infeasible();
    }
    if n == 1 {
        return ExactSolution {
            cost: 0.0,
            order: vec![0],
        };
    }

    let states = 1usize << n;
    let mut dp = vec![f64::INFINITY; states * n];
    let mut parent = vec![usize::MAX; states * n];
    // Mask {0}, ending at 0.
    dp[n] = 0.0;

    for mask in 1..states {
        if mask & 1 == 0 {
            continue;
        }
        for u in 0..n {
            let here = dp[mask * n + u];
            if mask & (1 << u) == 0 || !here.is_finite() {
                continue;
            }
            for v in 0..n {
                if mask & (1 << v) != 0 {
                    continue;
                }
                let w = matrix.get(u, v);
                if !w.is_finite() {
                    continue;
                }
                let next = mask | (1 << v);
                let candidate = here + w;
                if candidate < dp[next * n + v] {
                    dp[next * n + v] = candidate;
                    parent[next * n + v] = u;
                }
            }
        }
    }

    let full = states - 1;
    let mut best_cost = f64::INFINITY;
    let mut best_end = None;
    for u in 0..n {
        if dp[full * n + u] < best_cost {
            best_cost = dp[full * n + u];
            best_end = Some(u);
        }
    }
    let Some(mut current) = best_end else {
        return ExactSolution::infeasible();
    };

    let mut order = Vec::with_capacity(n);
    let mut mask = full;
    loop {
        order.push(current);
        let prev = parent[mask * n + current];
        mask &= !(1 << current);
        if prev == usize::MAX {
            break;
        }
        current = prev;
    }
    order.reverse();

    ExactSolution {
        cost: best_cost,
        order,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::tour::tour_cost;

    /// Cheapest open path from 0 over all permutations of the rest.
    fn brute_force(matrix: &DistanceMatrix) -> f64 {
        fn permute(rest: &mut Vec<usize>, k: usize, matrix: &DistanceMatrix, best: &mut f64) {
            if k == rest.len() {
                let mut tour = vec![0];
                tour.extend_from_slice(rest);
                let cost = tour_cost(&tour, matrix);
                if cost < *best {
                    *best = cost;
                }
                return;
            }
            for i in k..rest.len() {
                rest.swap(k, i);
                permute(rest, k + 1, matrix, best);
                rest.swap(k, i);
            }
        }

        let mut rest: Vec<usize> = (1..matrix.len()).collect();
        let mut best = f64::INFINITY;
        permute(&mut rest, 0, matrix, &mut best);
        best
    }

    #[test]
    fn empty_is_infeasible() {
        let solution = solve_exact(&DistanceMatrix::from_rows(&[]));
        assert!(solution.cost.is_infinite());
        assert!(solution.order.is_empty());
    }

    #[test]
    fn single_is_free() {
        let solution = solve_exact(&DistanceMatrix::from_rows(&[vec![0.0]]));
        assert!(solution.cost.abs() < f64::EPSILON);
        assert_eq!(solution.order, vec![0]);
    }

    #[test]
    fn above_limit_is_infeasible() {
        let n = EXACT_LIMIT + 1;
        let rows = vec![vec![1.0; n]; n];
        let solution = solve_exact(&DistanceMatrix::from_rows(&rows));
        assert!(solution.cost.is_infinite());
        assert!(solution.order.is_empty());
    }

    #[test]
    fn triangle_open_path() {
        let m = DistanceMatrix::from_rows(&[
            vec![0.0, 1.0, 4.0],
            vec![1.0, 0.0, 2.0],
            vec![4.0, 2.0, 0.0],
        ]);
        let solution = solve_exact(&m);
        assert!((solution.cost - 3.0).abs() < f64::EPSILON);
        assert_eq!(solution.order, vec![0, 1, 2]);
    }

    #[test]
    fn ties_keep_lowest_end_index() {
        let rows = vec![vec![1.0; 3]; 3];
        let solution = solve_exact(&DistanceMatrix::from_rows(&rows));
        assert!((solution.cost - 2.0).abs() < f64::EPSILON);
        assert_eq!(solution.order.last(), Some(&1));
    }

    #[test]
    fn unreachable_index_is_infeasible() {
        let inf = f64::INFINITY;
        let m = DistanceMatrix::from_rows(&[
            vec![0.0, 1.0, inf],
            vec![1.0, 0.0, inf],
            vec![inf, inf, 0.0],
        ]);
        let solution = solve_exact(&m);
        assert!(solution.cost.is_infinite());
        assert!(solution.order.is_empty());
    }

    #[test]
    fn uses_only_finite_transitions() {
        let inf = f64::INFINITY;
        // Only 0 -> 2 -> 1 exists.
        let m = DistanceMatrix::from_rows(&[
            vec![0.0, inf, 3.0],
            vec![inf, 0.0, inf],
            vec![inf, 2.0, 0.0],
        ]);
        let solution = solve_exact(&m);
        assert_eq!(solution.order, vec![0, 2, 1]);
        assert!((solution.cost - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn matches_brute_force_on_random_matrices() {
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..40 {
            let n = rng.random_range(2..=8usize);
            let symmetric = rng.random_bool(0.5);
            let mut rows = vec![vec![0.0; n]; n];
            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    if symmetric && j < i {
                        rows[i][j] = rows[j][i];
                    } else {
                        rows[i][j] = rng.random_range(1.0..100.0);
                    }
                }
            }
            let m = DistanceMatrix::from_rows(&rows);
            let solution = solve_exact(&m);

            assert!((solution.cost - brute_force(&m)).abs() < 1e-9);
            assert_eq!(solution.order.len(), n);
            assert_eq!(solution.order[0], 0);
            assert!((tour_cost(&solution.order, &m) - solution.cost).abs() < 1e-9);
        }
    }
}
