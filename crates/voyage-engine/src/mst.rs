//! Kruskal minimum spanning tree (forest) over dense indices.

use crate::union_find::UnionFind;

/// An undirected weighted edge between dense indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedEdge {
    /// One endpoint.
    pub a: usize,
    /// The other endpoint.
    pub b: usize,
    /// Edge weight.
    pub weight: f64,
}

impl WeightedEdge {
    /// Create an edge.
    #[must_use]
    pub const fn new(a: usize, b: usize, weight: f64) -> Self {
        Self { a, b, weight }
    }
}

/// Minimum spanning forest of `edges` over `0..n`.
///
/// Edges are stably sorted by weight, so equal-weight edges are accepted
/// in input order. Infinite or NaN weights are never accepted. The result
/// has `n - 1` edges exactly when the finite edges connect all `n` nodes.
#[must_use]
pub fn kruskal(edges: &[WeightedEdge], n: usize) -> Vec<WeightedEdge> {
    let mut sorted: Vec<WeightedEdge> = edges
        .iter()
        .copied()
        .filter(|e| e.weight.is_finite())
        .collect();
    sorted.sort_by(|x, y| x.weight.total_cmp(&y.weight));

    let mut uf = UnionFind::new(n);
    let mut tree = Vec::with_capacity(n.saturating_sub(1));
    for edge in sorted {
        if tree.len() + 1 >= n {
            break;
        }
        if uf.unite(edge.a, edge.b) {
            tree.push(edge);
        }
    }
    tree
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use petgraph::algo::min_spanning_tree;
    use petgraph::data::Element;
    use petgraph::graph::UnGraph;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn total(edges: &[WeightedEdge]) -> f64 {
        edges.iter().map(|e| e.weight).sum()
    }

    #[test]
    fn empty_and_single() {
        assert!(kruskal(&[], 0).is_empty());
        assert!(kruskal(&[], 1).is_empty());
    }

    #[test]
    fn triangle_drops_heaviest() {
        let edges = [
            WeightedEdge::new(0, 1, 1.0),
            WeightedEdge::new(1, 2, 2.0),
            WeightedEdge::new(0, 2, 4.0),
        ];
        let tree = kruskal(&edges, 3);
        assert_eq!(tree.len(), 2);
        assert!((total(&tree) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn equal_weights_keep_input_order() {
        let edges = [
            WeightedEdge::new(0, 2, 1.0),
            WeightedEdge::new(0, 1, 1.0),
            WeightedEdge::new(1, 2, 1.0),
        ];
        let tree = kruskal(&edges, 3);
        assert_eq!(tree, vec![edges[0], edges[1]]);
    }

    #[test]
    fn disconnected_yields_forest() {
        let edges = [WeightedEdge::new(0, 1, 1.0), WeightedEdge::new(2, 3, 1.0)];
        assert_eq!(kruskal(&edges, 4).len(), 2);
    }

    #[test]
    fn infinite_edges_never_accepted() {
        let edges = [
            WeightedEdge::new(0, 1, f64::INFINITY),
            WeightedEdge::new(1, 2, 1.0),
        ];
        let tree = kruskal(&edges, 3);
        assert_eq!(tree, vec![edges[1]]);
    }

    #[test]
    fn matches_reference_weight_on_random_graphs() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..30 {
            let n = rng.random_range(2..9usize);
            let mut edges = Vec::new();
            let mut reference = UnGraph::<(), f64>::with_capacity(n, n * n);
            for _ in 0..n {
                reference.add_node(());
            }
            for a in 0..n {
                for b in (a + 1)..n {
                    if rng.random_bool(0.6) {
                        let w = f64::from(rng.random_range(1..20u32));
                        edges.push(WeightedEdge::new(a, b, w));
                        reference.add_edge(
                            petgraph::graph::NodeIndex::new(a),
                            petgraph::graph::NodeIndex::new(b),
                            w,
                        );
                    }
                }
            }

            let expected: f64 = min_spanning_tree(&reference)
                .filter_map(|element| match element {
                    Element::Edge { weight, .. } => Some(weight),
                    Element::Node { .. } => None,
                })
                .sum();
            let tree = kruskal(&edges, n);
            assert!((total(&tree) - expected).abs() < 1e-9);
        }
    }
}
