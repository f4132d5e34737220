//! Disjoint-set forest over a fixed universe `0..n`.
//!
//! Used by the MST builder and to freeze whole-graph connectivity for
//! the optimizer's reachability pre-check.

/// Union-find with path compression and union by rank.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    /// Create `n` singleton sets.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    /// Number of elements in the universe.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.parent.len()
    }

    /// Returns `true` if the universe is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of the set containing `x`.
    ///
    /// Every node on the walk is relinked directly to the root.
    pub fn find(&mut self, x: usize) -> usize {
        debug_assert!(x < self.len(), "element {x} outside universe");

        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut current = x;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }

        root
    }

    /// Merge the sets containing `x` and `y`.
    ///
    /// Returns `false` if they were already in the same set.
    pub fn unite(&mut self, x: usize, y: usize) -> bool {
        let rx = self.find(x);
        let ry = self.find(y);
        if rx == ry {
            return false;
        }

        match self.rank[rx].cmp(&self.rank[ry]) {
            std::cmp::Ordering::Less => self.parent[rx] = ry,
            std::cmp::Ordering::Greater => self.parent[ry] = rx,
            std::cmp::Ordering::Equal => {
                self.parent[ry] = rx;
                self.rank[rx] = self.rank[rx].saturating_add(1);
            }
        }
        true
    }

    /// Whether `x` and `y` share a representative.
    pub fn connected(&mut self, x: usize, y: usize) -> bool {
        self.find(x) == self.find(y)
    }

    /// Representative of every element, in element order.
    ///
    /// Compresses every path, so the returned labels can be compared
    /// without further mutation.
    pub fn components(&mut self) -> Vec<usize> {
        (0..self.len()).map(|x| self.find(x)).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use petgraph::graph::UnGraph;
    use petgraph::algo::has_path_connecting;

    use super::*;

    #[test]
    fn singletons_are_disconnected() {
        let mut uf = UnionFind::new(4);
        assert_eq!(uf.len(), 4);
        for i in 0..4 {
            assert_eq!(uf.find(i), i);
        }
        assert!(!uf.connected(0, 1));
    }

    #[test]
    fn empty_universe() {
        let mut uf = UnionFind::new(0);
        assert!(uf.is_empty());
        assert!(uf.components().is_empty());
    }

    #[test]
    fn unite_merges_and_reports() {
        let mut uf = UnionFind::new(5);
        assert!(uf.unite(0, 1));
        assert!(uf.unite(2, 3));
        assert!(!uf.unite(1, 0));
        assert!(uf.connected(0, 1));
        assert!(!uf.connected(1, 2));
        assert!(uf.unite(1, 3));
        assert!(uf.connected(0, 2));
        assert!(!uf.connected(0, 4));
    }

    #[test]
    fn equal_rank_root_is_first_argument() {
        let mut uf = UnionFind::new(2);
        uf.unite(0, 1);
        assert_eq!(uf.find(1), 0);
        assert_eq!(uf.rank[0], 1);
    }

    #[test]
    fn lower_rank_goes_under_higher_rank() {
        let mut uf = UnionFind::new(3);
        uf.unite(0, 1); // root 0, rank 1
        uf.unite(2, 0); // rank(2) = 0 < rank(0) = 1
        assert_eq!(uf.find(2), 0);
        assert_eq!(uf.rank[0], 1);
    }

    #[test]
    fn find_compresses_paths() {
        let mut uf = UnionFind::new(4);
        // Build the chain 3 -> 2 -> 1 -> 0 by hand.
        uf.parent = vec![0, 0, 1, 2];
        assert_eq!(uf.find(3), 0);
        assert_eq!(uf.parent, vec![0, 0, 0, 0]);
        // Idempotent once the root is stable.
        assert_eq!(uf.find(3), 0);
    }

    #[test]
    fn long_chain_does_not_recurse() {
        let n = 200_000;
        let mut uf = UnionFind::new(n);
        uf.parent = (0..n).map(|i| i.saturating_sub(1)).collect();
        assert_eq!(uf.find(n - 1), 0);
    }

    #[test]
    fn agrees_with_reference_reachability() {
        // Two components plus an isolated node.
        let edges = [(0u32, 1u32), (1, 2), (3, 4), (4, 5), (5, 3)];
        let n = 7;

        let mut uf = UnionFind::new(n);
        for &(a, b) in &edges {
            uf.unite(a as usize, b as usize);
        }

        let mut graph = UnGraph::<(), ()>::with_capacity(n, edges.len());
        for _ in 0..n {
            graph.add_node(());
        }
        for &(a, b) in &edges {
            graph.add_edge(a.into(), b.into(), ());
        }

        for a in 0..n {
            for b in 0..n {
                let reference = has_path_connecting(
                    &graph,
                    petgraph::graph::NodeIndex::new(a),
                    petgraph::graph::NodeIndex::new(b),
                    None,
                );
                assert_eq!(uf.connected(a, b), reference, "pair ({a}, {b})");
            }
        }
    }

    #[test]
    fn components_are_canonical() {
        let mut uf = UnionFind::new(5);
        uf.unite(0, 4);
        uf.unite(1, 2);
        let labels = uf.components();
        assert_eq!(labels[0], labels[4]);
        assert_eq!(labels[1], labels[2]);
        assert_ne!(labels[0], labels[1]);
        assert_ne!(labels[3], labels[0]);
    }
}
