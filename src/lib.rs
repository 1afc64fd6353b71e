// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Point-to-point route planning over weighted spatial graphs.
//!
//! Locations are pairs of floating-point coordinates, connected by directed
//! [Segments](Segment) with non-negative costs. [find_path] runs A* over a
//! [Graph] using a pluggable [Heuristic], and the resulting [Route] can be
//! labelled with human-readable names through an [Annotator].
//!
//! # Example
//!
//! ```
//! use waypath::{find_path, Euclidean, Graph, Location, Segment};
//!
//! let a = Location::new(0.0, 0.0);
//! let b = Location::new(0.0, 4.0);
//! let c = Location::new(3.0, 2.0);
//!
//! let mut g = Graph::new();
//! g.insert(Segment::new(a, b, 10.0));
//! g.insert(Segment::new(a, c, 4.0));
//! g.insert(Segment::new(c, b, 4.0));
//!
//! let route = find_path(&g, &Euclidean, a, b).expect("a route must exist");
//! assert_eq!(route.waypoints, vec![a, c, b]);
//! assert_eq!(route.cost, 8.0);
//! ```

mod annotate;
mod astar;
mod distance;
mod graph;
mod heuristic;
mod kd;
pub mod reader;

pub use annotate::{annotate, AnnotationError, Annotator, CoordinateAnnotator, Gazetteer, Waypoint};
pub use astar::{
    find_path, find_path_by_id, find_path_with_limits, Route, SearchError, SearchLimits,
    DEFAULT_STEP_LIMIT,
};
pub use distance::{earth_distance, euclidean_distance};
pub use graph::Graph;
pub use heuristic::{Euclidean, Haversine, Heuristic, Scaled, Zero};
pub use kd::KDTree;

/// Dense identifier assigned by a [Graph] to every distinct [Location] it knows about.
pub type LocationId = usize;

/// A point identified by two floating-point coordinates.
///
/// The coordinates are usually latitude and longitude, but any planar
/// `(x, y)` pair works as long as the chosen [Heuristic] understands it.
///
/// Two locations are equal if and only if both coordinates are bit-for-bit equal.
/// Hashing and ordering follow the same rule, which makes `Location` usable as a
/// map key, but also means that `0.0` and `-0.0` are different locations, and that
/// two values computed in different ways may not match. Use [Location::snapped]
/// to quantize coordinates coming from lossy sources.
#[derive(Debug, Clone, Copy)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns true if both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Rounds both coordinates to the nearest multiple of `step`.
    /// Non-positive, non-finite or subnormal steps leave the location untouched.
    pub fn snapped(self, step: f64) -> Self {
        // Dividing by the reciprocal keeps decimal steps exact (3 / 10 == 0.3,
        // while 3 * 0.1 != 0.3). Adding 0.0 folds -0.0 into 0.0.
        let scale = step.recip();
        if !(step.is_finite() && step > 0.0 && scale.is_finite()) {
            return self;
        }

        Self {
            lat: (self.lat * scale).round() / scale + 0.0,
            lon: (self.lon * scale).round() / scale + 0.0,
        }
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.lat.to_bits() == other.lat.to_bits() && self.lon.to_bits() == other.lon.to_bits()
    }
}

impl Eq for Location {}

impl std::hash::Hash for Location {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.lat.to_bits().hash(state);
        self.lon.to_bits().hash(state);
    }
}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // total_cmp only reports Equal for identical bit patterns,
        // which keeps this consistent with PartialEq.
        self.lat
            .total_cmp(&other.lat)
            .then_with(|| self.lon.total_cmp(&other.lon))
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

/// A directed connection between two [Locations](Location).
///
/// `cost` is expected to be non-negative (travel time or distance). This is
/// not checked by the [Graph], but [find_path] never traverses segments with
/// negative or NaN costs; see [reader] for validated ingestion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Location,
    pub end: Location,
    pub cost: f64,
}

impl Segment {
    pub const fn new(start: Location, end: Location, cost: f64) -> Self {
        Self { start, end, cost }
    }

    /// Returns the same segment travelled in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            start: self.end,
            end: self.start,
            cost: self.cost,
        }
    }
}

/// Represents an outgoing (one-way) connection from a specific location,
/// as stored in a [Graph].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: LocationId,
    pub cost: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn location_bitwise_equality() {
        assert_eq!(Location::new(52.379189, 4.899431), Location::new(52.379189, 4.899431));
        assert_ne!(Location::new(0.0, 1.0), Location::new(-0.0, 1.0));
        assert_ne!(Location::new(0.1 + 0.2, 0.0), Location::new(0.3, 0.0));

        let nan = Location::new(f64::NAN, 0.0);
        assert_eq!(nan, nan);
    }

    #[test]
    fn location_as_key() {
        let set: HashSet<Location> = [
            Location::new(1.0, 2.0),
            Location::new(1.0, 2.0),
            Location::new(2.0, 1.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn location_ordering() {
        let mut locations = vec![
            Location::new(1.0, 2.0),
            Location::new(0.0, 5.0),
            Location::new(1.0, -1.0),
        ];
        locations.sort();
        assert_eq!(
            locations,
            vec![
                Location::new(0.0, 5.0),
                Location::new(1.0, -1.0),
                Location::new(1.0, 2.0),
            ]
        );
        assert_eq!(
            Location::new(0.5, 0.5).cmp(&Location::new(0.5, 0.5)),
            std::cmp::Ordering::Equal
        );
    }

    #[test]
    fn location_snapped() {
        assert_eq!(Location::new(0.1 + 0.2, 1.04).snapped(0.1), Location::new(0.3, 1.0));
        assert_eq!(Location::new(-0.01, 0.0).snapped(0.1), Location::new(0.0, 0.0));
        assert_eq!(Location::new(1.23, 4.56).snapped(0.0), Location::new(1.23, 4.56));
        assert_eq!(Location::new(1.23, 4.56).snapped(1e-310), Location::new(1.23, 4.56));
    }

    #[test]
    fn segment_reversed() {
        let s = Segment::new(Location::new(1.0, 2.0), Location::new(3.0, 4.0), 5.0);
        let r = s.reversed();
        assert_eq!(r.start, s.end);
        assert_eq!(r.end, s.start);
        assert_eq!(r.cost, 5.0);
    }
}
