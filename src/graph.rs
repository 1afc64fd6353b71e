// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::hash_map::{Entry, HashMap};

use crate::{Edge, Heuristic, Location, LocationId, Segment};

/// Represents a weighted, directed spatial network as a set of [Locations](Location)
/// and outgoing [Edges](Edge) between them.
///
/// Every distinct location is assigned a dense [LocationId] the first time it is seen.
/// Ids are never reused or invalidated, so they remain stable for the lifetime of the graph.
///
/// The graph is plain data without interior mutability: it can be shared between
/// threads and searched concurrently, as long as nobody mutates it in the meantime.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph {
    nodes: Vec<(Location, Vec<Edge>)>,
    ids: HashMap<Location, LocationId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of locations in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph has no locations.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the total number of edges in the graph, counting parallel edges separately.
    pub fn segment_count(&self) -> usize {
        self.nodes.iter().map(|(_, edges)| edges.len()).sum()
    }

    /// Returns an iterator over all known [Locations](Location) and their ids, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (LocationId, Location)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(id, &(location, _))| (id, location))
    }

    /// Returns the id of the provided [Location], assigning a new one if necessary.
    pub fn add_location(&mut self, location: Location) -> LocationId {
        match self.ids.entry(location) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                let id = self.nodes.len();
                self.nodes.push((location, Vec::default()));
                *e.insert(id)
            }
        }
    }

    /// Retrieves the id of a known [Location].
    pub fn id_of(&self, location: Location) -> Option<LocationId> {
        self.ids.get(&location).copied()
    }

    /// Retrieves the [Location] with the provided id.
    pub fn get_location(&self, id: LocationId) -> Option<Location> {
        self.nodes.get(id).map(|&(location, _)| location)
    }

    /// Appends a [Segment] to the outgoing edges of `segment.start`.
    ///
    /// Both endpoints are added to the graph if they are not known yet.
    /// No deduplication happens; parallel segments between the same pair
    /// of locations are all kept and considered by route finding.
    pub fn insert(&mut self, segment: Segment) {
        let from = self.add_location(segment.start);
        let to = self.add_location(segment.end);
        self.nodes[from].1.push(Edge {
            to,
            cost: segment.cost,
        });
    }

    /// Returns all outgoing [Segments](Segment) from the provided location.
    ///
    /// Unknown locations simply have no segments.
    pub fn neighbors_of(&self, location: Location) -> impl Iterator<Item = Segment> + '_ {
        let edges = self
            .id_of(location)
            .map(|id| self.get_edges(id))
            .unwrap_or_default();

        edges.iter().map(move |edge| Segment {
            start: location,
            end: self.nodes[edge.to].0,
            cost: edge.cost,
        })
    }

    /// Gets all outgoing [Edges](Edge) from a location with a given id.
    pub fn get_edges(&self, from_id: LocationId) -> &[Edge] {
        self.nodes
            .get(from_id)
            .map(|(_, edges)| edges.as_slice())
            .unwrap_or_default()
    }

    /// Gets the cost of the cheapest [Edge] from one location to another.
    /// If such an edge doesn't exist, returns [f64::INFINITY].
    pub fn get_edge(&self, from_id: LocationId, to_id: LocationId) -> f64 {
        self.get_edges(from_id)
            .iter()
            .filter(|edge| edge.to == to_id)
            .map(|edge| edge.cost)
            .fold(f64::INFINITY, f64::min)
    }

    /// Finds the known location closest to `target`, as measured by `metric`.
    ///
    /// This function requires computing the distance to every location in the graph,
    /// and is not suitable for repeated lookups in large graphs - use a [KDTree](crate::KDTree) instead.
    pub fn find_nearest<H: Heuristic + ?Sized>(
        &self,
        target: Location,
        metric: &H,
    ) -> Option<(LocationId, Location)> {
        self.iter()
            .map(|(id, location)| (metric.estimate(target, location), id, location))
            .min_by(|(a_dist, _, _), (b_dist, _, _)| a_dist.total_cmp(b_dist))
            .map(|(_, id, location)| (id, location))
    }
}

impl Extend<Segment> for Graph {
    fn extend<I: IntoIterator<Item = Segment>>(&mut self, segments: I) {
        segments.into_iter().for_each(|s| self.insert(s));
    }
}

impl FromIterator<Segment> for Graph {
    fn from_iter<I: IntoIterator<Item = Segment>>(segments: I) -> Self {
        let mut g = Self::default();
        g.extend(segments);
        g
    }
}
