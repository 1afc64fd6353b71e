// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::Location;

/// A route found by [find_path](crate::find_path).
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Visited locations, starting with the start location and ending with the goal.
    /// Never empty.
    pub waypoints: Vec<Location>,

    /// Sum of costs of all traversed segments.
    pub cost: f64,
}

impl Route {
    /// Number of segments traversed by the route.
    pub fn hop_count(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }

    pub fn start(&self) -> Option<Location> {
        self.waypoints.first().copied()
    }

    pub fn goal(&self) -> Option<Location> {
        self.waypoints.last().copied()
    }

    /// Returns consecutive pairs of waypoints, one for every traversed segment.
    pub fn legs(&self) -> impl Iterator<Item = (Location, Location)> + '_ {
        self.waypoints.windows(2).map(|pair| (pair[0], pair[1]))
    }
}
