// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{Graph, Location, Segment};

use super::model::{Entry, Record};
use super::{Error, LoadSummary, Options, SegmentReader};

/// Helper object used for validating [entries](Entry) and inserting them into a [Graph].
pub(super) struct SegmentLoader<'a> {
    g: &'a mut Graph,
    options: &'a Options,
    ignore_bbox: bool,
    summary: LoadSummary,
}

impl<'a> SegmentLoader<'a> {
    pub(super) fn new(g: &'a mut Graph, options: &'a Options) -> Self {
        let ignore_bbox =
            options.bbox.iter().all(|&x| x == 0.0) || options.bbox.iter().any(|x| !x.is_finite());

        if options.bbox.iter().any(|x| !x.is_finite()) {
            log::warn!("ignoring non-finite bounding box {:?}", options.bbox);
        }

        Self {
            g,
            options,
            ignore_bbox,
            summary: LoadSummary::default(),
        }
    }

    /// Add all entries from the provided [SegmentReader].
    pub(super) fn add_segments<R: SegmentReader>(
        mut self,
        mut reader: R,
    ) -> Result<LoadSummary, Error> {
        while let Some(e) = reader.next()? {
            self.add_entry(e);
        }

        log::debug!(
            "loaded {} segments ({} entries skipped), graph has {} locations",
            self.summary.added,
            self.summary.skipped,
            self.g.len(),
        );
        Ok(self.summary)
    }

    fn add_entry(&mut self, e: Entry) {
        match e {
            Entry::Record(r) => self.add_record(r),
            Entry::Malformed { position, reason } => {
                log::warn!("entry {}: {}", position, reason);
                self.summary.skipped += 1;
            }
        }
    }

    fn add_record(&mut self, r: Record) {
        let segment = match self.validate(&r.segment) {
            Ok(segment) => segment,
            Err(reason) => {
                log::warn!("entry {}: {}", r.position, reason);
                self.summary.skipped += 1;
                return;
            }
        };

        if !(self.is_in_bbox(segment.start) && self.is_in_bbox(segment.end)) {
            self.summary.skipped += 1;
            return;
        }

        self.g.insert(segment);
        self.summary.added += 1;

        if r.both {
            self.g.insert(segment.reversed());
            self.summary.added += 1;
        }
    }

    /// Checks that a segment is usable for route finding and applies snapping.
    fn validate(&self, s: &Segment) -> Result<Segment, &'static str> {
        if !(s.start.is_finite() && s.end.is_finite()) {
            return Err("non-finite coordinates");
        }

        if !(s.cost.is_finite() && s.cost >= 0.0) {
            return Err("cost must be finite and non-negative");
        }

        let snapped = Segment::new(
            s.start.snapped(self.options.snap),
            s.end.snapped(self.options.snap),
            s.cost,
        );
        if !(snapped.start.is_finite() && snapped.end.is_finite()) {
            return Err("non-finite coordinates after snapping");
        }

        Ok(snapped)
    }

    fn is_in_bbox(&self, l: Location) -> bool {
        if self.ignore_bbox {
            return true;
        }
        let [min_lon, min_lat, max_lon, max_lat] = self.options.bbox;
        l.lat >= min_lat && l.lat <= max_lat && l.lon >= min_lon && l.lon <= max_lon
    }
}
