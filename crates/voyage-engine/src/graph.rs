//! Weighted road network: node table, name registry, adjacency lists.
//!
//! Nodes are stored densely in insertion order; [`Graph::index_of`] and
//! [`Graph::id_at`] translate between [`LocationId`]s and those dense
//! indices for the search code.

use std::collections::{BTreeMap, HashMap};

use crate::types::{GraphError, Location, LocationId, Neighbor};

/// A directed, weighted graph of locations.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    locations: Vec<Location>,
    adjacency: Vec<Vec<Neighbor>>,
    index: BTreeMap<LocationId, usize>,
    names: HashMap<String, LocationId>,
    edge_count: usize,
}

impl Graph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a location, or overwrite the existing location with the same id.
    ///
    /// Overwriting keeps the node's adjacency and re-registers its name.
    pub fn add_location(&mut self, location: Location) {
        let id = location.id;
        if let Some(&i) = self.index.get(&id) {
            let old_name = std::mem::take(&mut self.locations[i].name);
            if self.names.get(&old_name) == Some(&id) {
                self.names.remove(&old_name);
            }
            self.names.insert(location.name.clone(), id);
            self.locations[i] = location;
            return;
        }

        self.names.insert(location.name.clone(), id);
        self.index.insert(id, self.locations.len());
        self.locations.push(location);
        self.adjacency.push(Vec::new());
    }

    /// Append a directed edge `from -> to`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownLocation`] if either endpoint is
    /// missing and [`GraphError::InvalidWeight`] if `weight` is negative
    /// or not finite.
    pub fn add_edge(
        &mut self,
        from: LocationId,
        to: LocationId,
        weight: f64,
    ) -> Result<(), GraphError> {
        let (i, _) = self.check_edge(from, to, weight)?;
        self.adjacency[i].push(Neighbor { target: to, weight });
        self.edge_count += 1;
        Ok(())
    }

    /// Append `from -> to` and `to -> from` with the same weight.
    ///
    /// # Errors
    ///
    /// Same as [`add_edge`](Self::add_edge). Nothing is inserted on error.
    pub fn add_undirected_edge(
        &mut self,
        from: LocationId,
        to: LocationId,
        weight: f64,
    ) -> Result<(), GraphError> {
        let (i, j) = self.check_edge(from, to, weight)?;
        self.adjacency[i].push(Neighbor { target: to, weight });
        self.adjacency[j].push(Neighbor {
            target: from,
            weight,
        });
        self.edge_count += 2;
        Ok(())
    }

    fn check_edge(
        &self,
        from: LocationId,
        to: LocationId,
        weight: f64,
    ) -> Result<(usize, usize), GraphError> {
        let i = self
            .index_of(from)
            .ok_or(GraphError::UnknownLocation(from))?;
        let j = self.index_of(to).ok_or(GraphError::UnknownLocation(to))?;
        if !weight.is_finite() || weight < 0.0 {
            return Err(GraphError::InvalidWeight { from, to, weight });
        }
        Ok((i, j))
    }

    /// Outgoing neighbors of `id`, or an empty slice for unknown ids.
    #[must_use]
    pub fn neighbors(&self, id: LocationId) -> &[Neighbor] {
        match self.index_of(id) {
            Some(i) => &self.adjacency[i],
            None => &[],
        }
    }

    /// Outgoing neighbors by dense index.
    pub(crate) fn neighbors_at(&self, index: usize) -> &[Neighbor] {
        &self.adjacency[index]
    }

    /// Weight of the first `from -> to` entry, if any.
    #[must_use]
    pub fn edge_weight(&self, from: LocationId, to: LocationId) -> Option<f64> {
        self.neighbors(from)
            .iter()
            .find(|n| n.target == to)
            .map(|n| n.weight)
    }

    /// Look up a location id by display name.
    #[must_use]
    pub fn id_by_name(&self, name: &str) -> Option<LocationId> {
        self.names.get(name).copied()
    }

    /// The location record for `id`.
    #[must_use]
    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.index_of(id).map(|i| &self.locations[i])
    }

    /// Location record by dense index.
    pub(crate) fn location_at(&self, index: usize) -> &Location {
        &self.locations[index]
    }

    /// Whether `id` is in the node table.
    #[must_use]
    pub fn contains(&self, id: LocationId) -> bool {
        self.index.contains_key(&id)
    }

    /// All location ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = LocationId> + '_ {
        self.index.keys().copied()
    }

    /// All locations, in ascending id order.
    pub fn locations(&self) -> impl Iterator<Item = &Location> + '_ {
        self.index.values().map(|&i| &self.locations[i])
    }

    /// Number of distinct locations.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.locations.len()
    }

    /// Number of directed adjacency entries.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Dense index of `id`.
    #[must_use]
    pub fn index_of(&self, id: LocationId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Location id at dense index `index`.
    #[must_use]
    pub fn id_at(&self, index: usize) -> Option<LocationId> {
        self.locations.get(index).map(|l| l.id)
    }
}
