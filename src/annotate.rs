// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::io;

use crate::{Location, Route};

/// Error returned by an [Annotator] which couldn't describe a location.
#[derive(Debug, thiserror::Error)]
pub enum AnnotationError {
    #[error("no label known for {0}")]
    NoMatch(Location),

    #[error("lookup failed: {0}")]
    Lookup(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Turns [Locations](Location) into human-readable descriptions, e.g. by reverse geocoding.
///
/// Implementations are free to perform I/O; failures are reported per location and
/// never abort [annotate].
pub trait Annotator {
    fn describe(&self, at: Location) -> Result<String, AnnotationError>;
}

impl<F: Fn(Location) -> Result<String, AnnotationError>> Annotator for F {
    fn describe(&self, at: Location) -> Result<String, AnnotationError> {
        self(at)
    }
}

/// A [Route] waypoint together with its description.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub location: Location,

    /// Description of the location, empty if the [Annotator] failed.
    pub label: String,
}

/// Describes every waypoint of a [Route].
///
/// Failed lookups are logged and degrade to an empty label.
pub fn annotate<A: Annotator + ?Sized>(route: &Route, annotator: &A) -> Vec<Waypoint> {
    route
        .waypoints
        .iter()
        .map(|&location| {
            let label = annotator.describe(location).unwrap_or_else(|e| {
                log::warn!("failed to describe {}: {}", location, e);
                String::default()
            });
            Waypoint { location, label }
        })
        .collect()
}

/// Describes locations by their coordinates, rounded to a fixed number of decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateAnnotator {
    pub precision: usize,
}

impl Default for CoordinateAnnotator {
    fn default() -> Self {
        // 5 decimal places of a degree are roughly a meter
        Self { precision: 5 }
    }
}

impl Annotator for CoordinateAnnotator {
    fn describe(&self, at: Location) -> Result<String, AnnotationError> {
        Ok(format!("{:.*}, {:.*}", self.precision, at.lat, self.precision, at.lon))
    }
}

/// An in-memory table of place names.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Gazetteer(HashMap<Location, String>);

impl Gazetteer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sets the label of a location, replacing any previous one.
    pub fn insert(&mut self, at: Location, label: impl Into<String>) {
        self.0.insert(at, label.into());
    }

    /// Reads labels from lines in the form `lat lon label...`, where coordinates may also
    /// be separated by commas. Empty lines and lines starting with `#` are ignored, as are
    /// (with a warning) lines without a label or with unparsable coordinates.
    pub fn from_io<R: io::BufRead>(reader: R) -> io::Result<Self> {
        let mut g = Self::default();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match parse_label_line(line) {
                Some((at, label)) => g.insert(at, label),
                None => log::warn!("labels line {}: expected 'lat lon label'", idx + 1),
            }
        }

        Ok(g)
    }
}

impl Annotator for Gazetteer {
    fn describe(&self, at: Location) -> Result<String, AnnotationError> {
        self.0.get(&at).cloned().ok_or(AnnotationError::NoMatch(at))
    }
}

fn parse_label_line(line: &str) -> Option<(Location, String)> {
    let mut rest = line;
    let mut coordinates = [0.0; 2];

    for c in coordinates.iter_mut() {
        rest = rest.trim_start_matches(|ch: char| ch.is_whitespace() || ch == ',');
        let end = rest
            .find(|ch: char| ch.is_whitespace() || ch == ',')
            .unwrap_or(rest.len());
        *c = rest[..end].parse().ok()?;
        rest = &rest[end..];
    }

    let label = rest
        .trim_start_matches(|ch: char| ch.is_whitespace() || ch == ',')
        .trim_end();
    if label.is_empty() {
        None
    } else {
        Some((Location::new(coordinates[0], coordinates[1]), label.to_string()))
    }
}
