// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{earth_distance, euclidean_distance, Location};

/// Estimates the remaining cost between two [Locations](Location).
///
/// For [find_path](crate::find_path) to return cost-optimal routes, the estimate must be
/// *admissible* (never greater than the true cost of any route between the two locations)
/// and *consistent* (`estimate(a, goal) <= cost(a, b) + estimate(b, goal)` for every
/// segment `a -> b`). Neither property is checked; violating them silently degrades
/// route quality.
///
/// Straight-line distances are only admissible if segment costs are distances as well.
/// For time-valued costs wrap the heuristic in [Scaled].
pub trait Heuristic {
    fn estimate(&self, from: Location, to: Location) -> f64;
}

impl<F: Fn(Location, Location) -> f64> Heuristic for F {
    #[inline]
    fn estimate(&self, from: Location, to: Location) -> f64 {
        self(from, to)
    }
}

/// Straight-line distance, treating `lat` and `lon` as planar `y` and `x` coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Euclidean;

impl Heuristic for Euclidean {
    #[inline]
    fn estimate(&self, from: Location, to: Location) -> f64 {
        euclidean_distance(from.lon, from.lat, to.lon, to.lat)
    }
}

/// Great-circle distance in kilometers, see [earth_distance].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Haversine;

impl Heuristic for Haversine {
    #[inline]
    fn estimate(&self, from: Location, to: Location) -> f64 {
        earth_distance(from.lat, from.lon, to.lat, to.lon)
    }
}

/// Always estimates zero, turning A* into Dijkstra's algorithm.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Zero;

impl Heuristic for Zero {
    #[inline]
    fn estimate(&self, _: Location, _: Location) -> f64 {
        0.0
    }
}

/// Converts a distance-based heuristic into a time-based one by dividing
/// by the maximum travel rate (distance units per cost unit) anywhere in the graph.
///
/// E.g. with [Haversine] and costs in hours, `max_rate` is the top speed in km/h.
/// `max_rate` must be positive and finite, otherwise the estimates are meaningless.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaled<H> {
    pub inner: H,
    pub max_rate: f64,
}

impl<H: Heuristic> Scaled<H> {
    pub fn new(inner: H, max_rate: f64) -> Self {
        Self { inner, max_rate }
    }
}

impl<H: Heuristic> Heuristic for Scaled<H> {
    #[inline]
    fn estimate(&self, from: Location, to: Location) -> f64 {
        self.inner.estimate(from, to) / self.max_rate
    }
}
