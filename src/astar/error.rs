// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::time::Instant;

/// Recommended value for [SearchLimits::step_limit] when searching large graphs.
pub const DEFAULT_STEP_LIMIT: usize = 1_000_000;

/// Outcomes other than a found route which may be returned by
/// [find_path](crate::find_path) and related functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// No route exists between the start and goal locations.
    ///
    /// This is a normal outcome of a search, returned both when the
    /// locations are not connected and when either of them is unknown.
    #[error("no path found")]
    NotFound,

    /// Route search has expanded more locations than permitted by [SearchLimits::step_limit].
    #[error("step limit exceeded")]
    StepLimitExceeded,

    /// Route search was still running at [SearchLimits::deadline].
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Bounds the amount of work done by a single [find_path_with_limits](crate::find_path_with_limits) call.
///
/// Concluding that no route exists requires expanding every location reachable
/// from the start, which on large graphs can take a long time. Both limits are checked
/// at the top of the exploration loop, before expanding the next location.
/// The default places no limits at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Maximum number of locations which may be expanded.
    pub step_limit: usize,

    /// Instant after which the search gives up.
    pub deadline: Option<Instant>,
}

impl SearchLimits {
    pub const UNLIMITED: Self = Self {
        step_limit: usize::MAX,
        deadline: None,
    };

    pub fn with_step_limit(step_limit: usize) -> Self {
        Self {
            step_limit,
            ..Self::UNLIMITED
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            ..Self::UNLIMITED
        }
    }

    /// Checks whether another step may be taken, given how many have been taken so far.
    pub(super) fn check(&self, steps: usize) -> Result<(), SearchError> {
        if steps >= self.step_limit {
            return Err(SearchError::StepLimitExceeded);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(SearchError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::UNLIMITED
    }
}
