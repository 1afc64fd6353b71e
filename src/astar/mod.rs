// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod error;
mod route;
mod search;

pub use error::{SearchError, SearchLimits, DEFAULT_STEP_LIMIT};
pub use route::Route;
pub use search::{find_path, find_path_by_id, find_path_with_limits};
