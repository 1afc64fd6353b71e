// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::Segment;

/// A single segment described in the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    pub segment: Segment,

    /// Whether the reverse segment should be added as well.
    pub both: bool,

    /// Line number (text) or element number (XML), starting at 1.
    pub position: usize,
}

/// Union over everything a [SegmentReader](super::SegmentReader) can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Record(Record),

    /// An entry which could not be parsed. Skipped by the loader.
    Malformed { position: usize, reason: String },
}

impl Entry {
    pub fn malformed(position: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            position,
            reason: reason.into(),
        }
    }
}
