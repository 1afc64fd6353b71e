// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use super::{Route, SearchError, SearchLimits};
use crate::{Edge, Graph, Heuristic, Location, LocationId};

#[derive(Debug, Clone, Copy)]
struct QueueItem {
    at: LocationId,
    cost: f64,
    score: f64,
    seq: u64,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for QueueItem {}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // NOTE: We revert the order of comparison,
        // as lower scores and earlier insertions are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Priority queue of locations to expand. Items with equal scores
/// are popped in insertion order, which makes searches reproducible.
#[derive(Debug, Default)]
struct OpenSet {
    heap: BinaryHeap<QueueItem>,
    next_seq: u64,
}

impl OpenSet {
    fn push(&mut self, at: LocationId, cost: f64, score: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueueItem {
            at,
            cost,
            score,
            seq,
        });
    }

    fn pop(&mut self) -> Option<QueueItem> {
        self.heap.pop()
    }
}

fn reconstruct_path(
    came_from: &HashMap<LocationId, LocationId>,
    first: LocationId,
    mut last: LocationId,
) -> Vec<LocationId> {
    let mut path = vec![last];

    // A well-formed chain has at most one link per entry.
    for _ in 0..came_from.len() {
        if last == first {
            break;
        }
        let Some(&nd) = came_from.get(&last) else {
            break;
        };
        path.push(nd);
        last = nd;
    }

    path.reverse();
    return path;
}

/// Uses the [A* algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// to find the cheapest route between two locations in the provided graph.
///
/// If `start == goal`, a single-element route is returned without consulting the graph.
/// Otherwise, [SearchError::NotFound] is returned if there is no route between the locations,
/// including the case where any of them is not present in the graph.
///
/// Segments with negative or NaN costs are never traversed, so the search always terminates.
/// The returned route is cost-optimal if `heuristic` is admissible and consistent (see [Heuristic]).
/// Equal-priority candidates are expanded in the order they were discovered,
/// so repeated searches over the same graph return the same route.
///
/// This function places no bound on the amount of work done; see [find_path_with_limits].
pub fn find_path<H: Heuristic + ?Sized>(
    g: &Graph,
    heuristic: &H,
    start: Location,
    goal: Location,
) -> Result<Route, SearchError> {
    find_path_with_limits(g, heuristic, start, goal, &SearchLimits::UNLIMITED)
}

/// Like [find_path], but gives up with [SearchError::StepLimitExceeded] or
/// [SearchError::DeadlineExceeded] once the provided [SearchLimits] are exceeded.
pub fn find_path_with_limits<H: Heuristic + ?Sized>(
    g: &Graph,
    heuristic: &H,
    start: Location,
    goal: Location,
    limits: &SearchLimits,
) -> Result<Route, SearchError> {
    if start == goal {
        return Ok(Route {
            waypoints: vec![start],
            cost: 0.0,
        });
    }

    let from_id = g.id_of(start).ok_or(SearchError::NotFound)?;
    let to_id = g.id_of(goal).ok_or(SearchError::NotFound)?;
    find_path_by_id(g, heuristic, from_id, to_id, limits)
}

/// Like [find_path_with_limits], but takes the start and goal as [LocationIds](LocationId)
/// of the provided graph.
pub fn find_path_by_id<H: Heuristic + ?Sized>(
    g: &Graph,
    heuristic: &H,
    from_id: LocationId,
    to_id: LocationId,
    limits: &SearchLimits,
) -> Result<Route, SearchError> {
    let from = g.get_location(from_id).ok_or(SearchError::NotFound)?;
    let to = g.get_location(to_id).ok_or(SearchError::NotFound)?;

    if from_id == to_id {
        return Ok(Route {
            waypoints: vec![from],
            cost: 0.0,
        });
    }

    let mut queue = OpenSet::default();
    let mut came_from: HashMap<LocationId, LocationId> = HashMap::default();
    let mut known_costs: HashMap<LocationId, f64> = HashMap::default();
    let mut steps: usize = 0;

    log::debug!("searching for a path from {} to {}", from, to);
    known_costs.insert(from_id, 0.0);
    queue.push(from_id, 0.0, heuristic.estimate(from, to));

    while let Some(item) = queue.pop() {
        // Contrary to the wikipedia definition, we might keep multiple items in the queue for the same location.
        // Only the one matching the best known cost is current; the rest are stale.
        if item.cost > known_costs.get(&item.at).copied().unwrap_or(f64::INFINITY) {
            continue;
        }

        if item.at == to_id {
            log::debug!("path found after {} expansions, cost {}", steps, item.cost);
            let waypoints = reconstruct_path(&came_from, from_id, to_id)
                .into_iter()
                .filter_map(|id| g.get_location(id))
                .collect();
            return Ok(Route {
                waypoints,
                cost: item.cost,
            });
        }

        limits.check(steps)?;
        steps += 1;
        log::trace!("expanding {} at cost {}", item.at, item.cost);

        for &Edge {
            to: neighbor_id,
            cost: edge_cost,
        } in g.get_edges(item.at)
        {
            let Some(neighbor) = g.get_location(neighbor_id) else {
                continue;
            };

            // Also false for NaN
            if !(edge_cost >= 0.0) {
                log::trace!(
                    "ignoring segment {} -> {} with cost {}",
                    item.at,
                    neighbor_id,
                    edge_cost
                );
                continue;
            }

            // Check if this is the cheapest way to the neighbor
            let neighbor_cost = item.cost + edge_cost;
            if neighbor_cost
                >= known_costs
                    .get(&neighbor_id)
                    .copied()
                    .unwrap_or(f64::INFINITY)
            {
                continue;
            }

            // Push the new item into the queue
            came_from.insert(neighbor_id, item.at);
            known_costs.insert(neighbor_id, neighbor_cost);
            queue.push(
                neighbor_id,
                neighbor_cost,
                neighbor_cost + heuristic.estimate(neighbor, to),
            );
        }
    }

    log::debug!("no path found after {} expansions", steps);
    Err(SearchError::NotFound)
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::{Euclidean, Segment, Zero};

    const A: Location = Location::new(52.379189, 4.899431);
    const B: Location = Location::new(52.3676, 4.9041);
    const C: Location = Location::new(52.3731, 4.8926);
    const D: Location = Location::new(52.3600, 4.8852);

    fn graph(segments: &[(Location, Location, f64)]) -> Graph {
        segments
            .iter()
            .map(|&(start, end, cost)| Segment::new(start, end, cost))
            .collect()
    }

    #[test]
    fn single_segment() {
        let g = graph(&[(A, B, 5.0)]);
        let route = find_path(&g, &Euclidean, A, B).unwrap();
        assert_eq!(route.waypoints, vec![A, B]);
        assert_eq!(route.cost, 5.0);
        assert_eq!(route.hop_count(), 1);
    }

    #[test]
    fn detour_is_cheaper() {
        let g = graph(&[(A, B, 10.0), (A, C, 3.0), (C, B, 3.0)]);
        let route = find_path(&g, &Euclidean, A, B).unwrap();
        assert_eq!(route.waypoints, vec![A, C, B]);
        assert_eq!(route.cost, 6.0);
    }

    #[test]
    fn empty_graph() {
        let g = Graph::new();
        assert_eq!(find_path(&g, &Euclidean, A, B), Err(SearchError::NotFound));
    }

    #[test]
    fn start_is_goal() {
        let g = graph(&[(A, B, 5.0)]);
        let route = find_path(&g, &Euclidean, A, A).unwrap();
        assert_eq!(route.waypoints, vec![A]);
        assert_eq!(route.cost, 0.0);
        assert_eq!(route.hop_count(), 0);

        // Works even for locations unknown to the graph
        let route = find_path(&Graph::new(), &Euclidean, D, D).unwrap();
        assert_eq!(route.waypoints, vec![D]);
    }

    #[test]
    fn cheaper_parallel_segment_wins() {
        let g = graph(&[(A, B, 4.0), (A, B, 2.0)]);
        let route = find_path(&g, &Zero, A, B).unwrap();
        assert_eq!(route.waypoints, vec![A, B]);
        assert_eq!(route.cost, 2.0);
    }

    #[test]
    fn directed_segments() {
        let g = graph(&[(A, B, 1.0), (B, C, 1.0)]);
        assert!(find_path(&g, &Zero, A, C).is_ok());
        assert_eq!(find_path(&g, &Zero, C, A), Err(SearchError::NotFound));
        assert_eq!(find_path(&g, &Zero, A, D), Err(SearchError::NotFound));
    }

    #[test]
    fn ties_are_broken_by_insertion_order() {
        let via_b = graph(&[(A, B, 1.0), (A, C, 1.0), (B, D, 1.0), (C, D, 1.0)]);
        let via_c = graph(&[(A, C, 1.0), (A, B, 1.0), (B, D, 1.0), (C, D, 1.0)]);

        for _ in 0..3 {
            assert_eq!(find_path(&via_b, &Zero, A, D).unwrap().waypoints, vec![A, B, D]);
            assert_eq!(find_path(&via_c, &Zero, A, D).unwrap().waypoints, vec![A, C, D]);
        }
    }

    #[test]
    fn stale_entries_are_skipped() {
        // B is first queued at cost 10, then improved to 2 via C.
        // The stale entry must not count as an expansion.
        let g = graph(&[(A, B, 10.0), (A, C, 1.0), (C, B, 1.0), (B, D, 20.0)]);

        let route = find_path_with_limits(&g, &Zero, A, D, &SearchLimits::with_step_limit(3)).unwrap();
        assert_eq!(route.waypoints, vec![A, C, B, D]);
        assert_eq!(route.cost, 22.0);

        assert_eq!(
            find_path_with_limits(&g, &Zero, A, D, &SearchLimits::with_step_limit(2)),
            Err(SearchError::StepLimitExceeded)
        );
    }

    #[test]
    fn deadline() {
        let g = graph(&[(A, B, 1.0)]);
        let limits = SearchLimits::with_deadline(Instant::now());
        assert_eq!(
            find_path_with_limits(&g, &Zero, A, B, &limits),
            Err(SearchError::DeadlineExceeded)
        );

        // Trivial searches need no exploration
        assert!(find_path_with_limits(&g, &Zero, A, A, &limits).is_ok());
    }

    #[test]
    fn negative_cycle_terminates() {
        let g = graph(&[(A, B, 1.0), (B, A, -5.0), (C, D, 1.0)]);
        assert_eq!(find_path(&g, &Zero, A, D), Err(SearchError::NotFound));

        let route = find_path(&g, &Zero, A, B).unwrap();
        assert_eq!(route.waypoints, vec![A, B]);
        assert_eq!(route.cost, 1.0);
    }

    #[test]
    fn nan_cost_cycle_terminates() {
        let g = graph(&[(A, B, f64::NAN), (B, A, 1.0), (D, A, 1.0)]);
        assert_eq!(find_path(&g, &Zero, A, D), Err(SearchError::NotFound));
        assert_eq!(find_path(&g, &Zero, A, B), Err(SearchError::NotFound));

        let route = find_path(&g, &Zero, D, A).unwrap();
        assert_eq!(route.waypoints, vec![D, A]);
    }

    #[test]
    fn negative_segments_are_not_traversed() {
        // The negative segment would make A -> C -> B cheaper
        let g = graph(&[(A, B, 5.0), (A, C, 1.0), (C, B, -3.0)]);
        let route = find_path(&g, &Zero, A, B).unwrap();
        assert_eq!(route.waypoints, vec![A, B]);
        assert_eq!(route.cost, 5.0);
    }

    #[test]
    fn by_id() {
        let g = graph(&[(A, C, 1.0), (C, B, 1.0)]);
        let a = g.id_of(A).unwrap();
        let b = g.id_of(B).unwrap();

        let route = find_path_by_id(&g, &Zero, a, b, &SearchLimits::default()).unwrap();
        assert_eq!(route.waypoints, vec![A, C, B]);

        assert_eq!(
            find_path_by_id(&g, &Zero, a, 99, &SearchLimits::default()),
            Err(SearchError::NotFound)
        );
    }

    #[test]
    fn reconstruct_path_guards_against_cycles() {
        let came_from = HashMap::from([(1, 2), (2, 1), (3, 1)]);
        let path = reconstruct_path(&came_from, 0, 3);
        assert!(path.len() <= came_from.len() + 1);
        assert_eq!(path.last(), Some(&3));
    }
}
