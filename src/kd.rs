// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{Graph, Heuristic, Location, LocationId};

/// KDTree implements the [k-d tree data structure](https://en.wikipedia.org/wiki/K-d_tree),
/// which can be used to speed up nearest-neighbor search for large datasets.
/// [Graph::find_nearest] needs to look at every location, which dominates
/// the running time when snapping many query points onto the graph. A k-d tree
/// can help with that, trading memory usage for CPU time.
///
/// The tree splits space along the raw `lat` and `lon` axes, and prunes branches using
/// the distance to the splitting axis as measured by the provided metric. This is exact for
/// [Euclidean](crate::Euclidean) and a good approximation for [Haversine](crate::Haversine),
/// except close to the antimeridian (180°/-180° longitude) or the poles (90°/-90° latitude),
/// or when the data spans multiple continents.
#[derive(Debug, Clone)]
pub struct KDTree {
    pivot: (LocationId, Location),
    left: Option<Box<KDTree>>,
    right: Option<Box<KDTree>>,
}

impl KDTree {
    /// Finds the location closest to `target`, returning its id and position.
    pub fn find_nearest<H: Heuristic + ?Sized>(
        &self,
        target: Location,
        metric: &H,
    ) -> (LocationId, Location) {
        self.find_nearest_impl(target, metric, false).0
    }

    fn find_nearest_impl<H: Heuristic + ?Sized>(
        &self,
        target: Location,
        metric: &H,
        lon_divides: bool,
    ) -> ((LocationId, Location), f64) {
        // Start by assuming that pivot is the closest
        let mut best = self.pivot;
        let mut best_dist = metric.estimate(target, best.1);

        // Select which branch to recurse into first
        let first_left = if lon_divides {
            target.lon < best.1.lon
        } else {
            target.lat < best.1.lat
        };
        let (first, second) = if first_left {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        };

        // Recurse into the first branch
        if let Some(ref branch) = first {
            let (alt, alt_dist) = branch.find_nearest_impl(target, metric, !lon_divides);
            if alt_dist < best_dist {
                best = alt;
                best_dist = alt_dist;
            }
        }

        // (Optionally) recurse into the second branch
        if let Some(ref branch) = second {
            // A closer location is possible in the second branch if and only if
            // the splitting axis is closer than the current best candidate.
            let axis = if lon_divides {
                Location::new(target.lat, self.pivot.1.lon)
            } else {
                Location::new(self.pivot.1.lat, target.lon)
            };
            let dist_to_axis = metric.estimate(target, axis);

            if dist_to_axis < best_dist {
                let (alt, alt_dist) = branch.find_nearest_impl(target, metric, !lon_divides);
                if alt_dist < best_dist {
                    best = alt;
                    best_dist = alt_dist;
                }
            }
        }

        return (best, best_dist);
    }

    /// Builds a k-d tree over all locations of a [Graph].
    /// Returns `None` if the graph is empty.
    pub fn from_graph(g: &Graph) -> Option<Self> {
        Self::from_iter(g.iter())
    }

    /// Builds a k-d tree from an iterable of locations and their ids.
    /// Locations with non-finite coordinates are skipped.
    pub fn from_iter<I: IntoIterator<Item = (LocationId, Location)>>(locations: I) -> Option<Self> {
        let mut locations = locations
            .into_iter()
            .filter(|(_, l)| l.is_finite())
            .collect::<Vec<_>>();
        Self::build(locations.as_mut_slice())
    }

    /// Builds a k-d tree from a mutable slice of locations and their ids. Elements will be
    /// reordered in the slice to facilitate building the tree.
    pub fn build(locations: &mut [(LocationId, Location)]) -> Option<Self> {
        Self::build_impl(locations, false)
    }

    fn build_impl(locations: &mut [(LocationId, Location)], lon_divides: bool) -> Option<Self> {
        match locations.len() {
            0 => None,
            1 => Some(Self {
                pivot: locations[0],
                left: None,
                right: None,
            }),
            _ => {
                if lon_divides {
                    locations.sort_by(|(_, a), (_, b)| a.lon.total_cmp(&b.lon));
                } else {
                    locations.sort_by(|(_, a), (_, b)| a.lat.total_cmp(&b.lat));
                }
                let median = locations.len() / 2;
                let pivot = locations[median];
                let (left, right_and_pivot) = locations.split_at_mut(median);
                let right = &mut right_and_pivot[1..];
                Some(Self {
                    pivot,
                    left: Self::build_impl(left, !lon_divides).map(Box::new),
                    right: Self::build_impl(right, !lon_divides).map(Box::new),
                })
            }
        }
    }
}
