// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Loading [Segments](crate::Segment) from files into a [Graph].
//!
//! Two formats are understood. The text format has one segment per line:
//!
//! ```text
//! # start_lat start_lon end_lat end_lon cost [both]
//! 52.379189 4.899431 52.3676 4.9041 5.0
//! 52.3676,4.9041,52.3731,4.8926,2.5,both
//! ```
//!
//! Fields may be separated by whitespace or commas, and `#` starts a comment.
//! A trailing `both` also adds the reverse segment (`oneway` is accepted as the default).
//!
//! The XML format consists of `segment` elements, anywhere in the document:
//!
//! ```xml
//! <segments>
//!   <segment from-lat="52.379189" from-lon="4.899431" to-lat="52.3676" to-lon="4.9041" cost="5.0"/>
//!   <segment from-lat="52.3676" from-lon="4.9041" to-lat="52.3731" to-lon="4.8926" cost="2.5" both="yes"/>
//! </segments>
//! ```
//!
//! Both formats may be compressed with gzip or bzip2.
//!
//! Segments with non-finite coordinates, or with negative or non-finite costs are skipped
//! (and logged), as are malformed lines or elements. Route finding assumes non-negative
//! costs, and this is the place where that assumption is enforced.

use std::fs::File;
use std::io;
use std::path::Path;

use loader::SegmentLoader;

use crate::Graph;

mod loader;
mod model;
mod text;
mod xml;

/// Format of the input segment file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Unknown format - detect compression by magic bytes,
    /// and treat the content as XML if it starts with `<`, as text otherwise
    Unknown,

    /// Force uncompressed text
    Text,

    /// Force text with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    TextGz,

    /// Force text with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    TextBz2,

    /// Force uncompressed XML
    Xml,

    /// Force XML with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    XmlGz,

    /// Force XML with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    XmlBz2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compression {
    None,
    Gzip,
    Bzip2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Syntax {
    Text,
    Xml,
}

impl FileFormat {
    fn compression(self) -> Option<Compression> {
        match self {
            Self::Unknown => None,
            Self::Text | Self::Xml => Some(Compression::None),
            Self::TextGz | Self::XmlGz => Some(Compression::Gzip),
            Self::TextBz2 | Self::XmlBz2 => Some(Compression::Bzip2),
        }
    }

    fn syntax(self) -> Option<Syntax> {
        match self {
            Self::Unknown => None,
            Self::Text | Self::TextGz | Self::TextBz2 => Some(Syntax::Text),
            Self::Xml | Self::XmlGz | Self::XmlBz2 => Some(Syntax::Xml),
        }
    }
}

/// Additional controls for loading segments into a [Graph].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Options {
    /// Format of the input data.
    pub file_format: FileFormat,

    /// Filter segments by a specific bounding box; both endpoints must lie within it.
    /// In order: left (min lon), bottom (min lat), right (max lon), top (max lat).
    /// Ignored if all values are set to zero, or at least one of them is not finite.
    pub bbox: [f64; 4],

    /// If positive, snap all coordinates to multiples of this value (see [Location::snapped](crate::Location::snapped)),
    /// so that nearly-identical coordinates are merged into a single location.
    pub snap: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            file_format: FileFormat::Unknown,
            bbox: [0.0; 4],
            snap: 0.0,
        }
    }
}

/// Error which can occur when loading segments.
/// Individual malformed or invalid segments are skipped instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Statistics of a single load.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    /// Number of segments inserted into the graph (bidirectional entries count twice).
    pub added: usize,

    /// Number of entries which were malformed, invalid or outside of the bounding box.
    pub skipped: usize,
}

/// Internal trait for objects which can stream [entries](model::Entry)
/// from an underlying source.
trait SegmentReader {
    fn next(&mut self) -> Result<Option<model::Entry>, Error>;
}

/// Parse segments from a reader into a [Graph] as per the provided [Options].
///
/// The provided stream will be automatically wrapped in a buffered reader.
pub fn add_segments_from_io<R: io::Read>(
    g: &mut Graph,
    options: &Options,
    reader: R,
) -> Result<LoadSummary, Error> {
    let mut b = io::BufReader::new(reader);
    let compression = match options.file_format.compression() {
        Some(c) => c,
        None => detect_compression(&mut b)?,
    };

    match compression {
        Compression::None => add_segments_from_buf_read(g, options, b),

        Compression::Gzip => {
            let d = flate2::read::MultiGzDecoder::new(b);
            add_segments_from_buf_read(g, options, io::BufReader::new(d))
        }

        Compression::Bzip2 => {
            let d = bzip2::read::MultiBzDecoder::new(b);
            add_segments_from_buf_read(g, options, io::BufReader::new(d))
        }
    }
}

/// Parse segments from a file at the provided path into a [Graph] as per the provided [Options].
pub fn add_segments_from_file<P: AsRef<Path>>(
    g: &mut Graph,
    options: &Options,
    path: P,
) -> Result<LoadSummary, Error> {
    let f = File::open(path)?;
    add_segments_from_io(g, options, f)
}

/// Parse segments from a static buffer into a [Graph] as per the provided [Options].
pub fn add_segments_from_buffer(
    g: &mut Graph,
    options: &Options,
    data: &[u8],
) -> Result<LoadSummary, Error> {
    if options.file_format == FileFormat::Xml {
        // Fast path is available for in-memory XML data
        let r = xml::Reader::from_buffer(data);
        SegmentLoader::new(g, options).add_segments(r)
    } else {
        // Wrap the buffer in a cursor and use the IO path
        let cursor = io::Cursor::new(data);
        add_segments_from_io(g, options, cursor)
    }
}

fn add_segments_from_buf_read<R: io::BufRead>(
    g: &mut Graph,
    options: &Options,
    mut reader: R,
) -> Result<LoadSummary, Error> {
    let syntax = match options.file_format.syntax() {
        Some(s) => s,
        None => detect_syntax(&mut reader)?,
    };

    let loader = SegmentLoader::new(g, options);
    match syntax {
        Syntax::Text => loader.add_segments(text::Reader::new(reader)),
        Syntax::Xml => loader.add_segments(xml::Reader::from_io(reader)),
    }
}

fn detect_compression<R: io::BufRead>(reader: &mut R) -> io::Result<Compression> {
    let head = reader.fill_buf()?;
    if head.starts_with(&[0x1F, 0x8B]) {
        Ok(Compression::Gzip)
    } else if head.starts_with(b"BZh") {
        Ok(Compression::Bzip2)
    } else {
        Ok(Compression::None)
    }
}

fn detect_syntax<R: io::BufRead>(reader: &mut R) -> io::Result<Syntax> {
    let head = reader.fill_buf()?;
    let head = head.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(head);
    match head.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(&b'<') => Ok(Syntax::Xml),
        _ => Ok(Syntax::Text),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::{find_path, Euclidean, Location};

    const SIMPLE_TXT: &[u8] = include_bytes!("test_fixtures/simple.txt");
    const SIMPLE_XML: &[u8] = include_bytes!("test_fixtures/simple.xml");

    const CENTRAAL: Location = Location::new(52.379189, 4.899431);
    const DAM: Location = Location::new(52.3731, 4.8926);
    const MUNTPLEIN: Location = Location::new(52.3667, 4.8936);
    const WATERLOOPLEIN: Location = Location::new(52.3676, 4.9041);

    fn options(file_format: FileFormat) -> Options {
        Options {
            file_format,
            ..Options::default()
        }
    }

    fn gz(data: &[u8]) -> Vec<u8> {
        let mut e = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        e.write_all(data).unwrap();
        e.finish().unwrap()
    }

    fn bz2(data: &[u8]) -> Vec<u8> {
        let mut e = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        e.write_all(data).unwrap();
        e.finish().unwrap()
    }

    fn check_simple_graph(g: &Graph, summary: LoadSummary) {
        //  CENTRAAL ──4──> WATERLOOPLEIN
        //     │  ^              ^
        //     1  1              1
        //     v  │              │
        //      DAM <──1.5──> MUNTPLEIN
        assert_eq!(summary, LoadSummary { added: 6, skipped: 3 });
        assert_eq!(g.len(), 4);
        assert_eq!(g.segment_count(), 6);

        let id = |l: Location| g.id_of(l).unwrap();
        assert_eq!(g.get_edge(id(CENTRAAL), id(WATERLOOPLEIN)), 4.0);
        assert_eq!(g.get_edge(id(CENTRAAL), id(DAM)), 1.0);
        assert_eq!(g.get_edge(id(DAM), id(CENTRAAL)), 1.0);
        assert_eq!(g.get_edge(id(DAM), id(MUNTPLEIN)), 1.5);
        assert_eq!(g.get_edge(id(MUNTPLEIN), id(DAM)), 1.5);
        assert_eq!(g.get_edge(id(MUNTPLEIN), id(WATERLOOPLEIN)), 1.0);
        assert!(g.get_edge(id(WATERLOOPLEIN), id(MUNTPLEIN)).is_infinite());

        let route = find_path(g, &Euclidean, CENTRAAL, WATERLOOPLEIN).unwrap();
        assert_eq!(route.waypoints, vec![CENTRAAL, DAM, MUNTPLEIN, WATERLOOPLEIN]);
        assert_eq!(route.cost, 3.5);
    }

    fn load(data: &[u8], file_format: FileFormat) -> (Graph, LoadSummary) {
        let mut g = Graph::default();
        let summary = add_segments_from_buffer(&mut g, &options(file_format), data).unwrap();
        (g, summary)
    }

    #[test]
    fn text() {
        let (g, summary) = load(SIMPLE_TXT, FileFormat::Text);
        check_simple_graph(&g, summary);
    }

    #[test]
    fn xml() {
        let (g, summary) = load(SIMPLE_XML, FileFormat::Xml);
        check_simple_graph(&g, summary);
    }

    #[test]
    fn xml_io() {
        let mut g = Graph::default();
        let summary = add_segments_from_io(&mut g, &options(FileFormat::Xml), SIMPLE_XML).unwrap();
        check_simple_graph(&g, summary);
    }

    #[test]
    fn compressed() {
        let (g, summary) = load(&gz(SIMPLE_TXT), FileFormat::TextGz);
        check_simple_graph(&g, summary);

        let (g, summary) = load(&bz2(SIMPLE_TXT), FileFormat::TextBz2);
        check_simple_graph(&g, summary);

        let (g, summary) = load(&gz(SIMPLE_XML), FileFormat::XmlGz);
        check_simple_graph(&g, summary);

        let (g, summary) = load(&bz2(SIMPLE_XML), FileFormat::XmlBz2);
        check_simple_graph(&g, summary);
    }

    #[test]
    fn unknown_format_is_detected() {
        for data in [
            SIMPLE_TXT.to_vec(),
            SIMPLE_XML.to_vec(),
            gz(SIMPLE_TXT),
            gz(SIMPLE_XML),
            bz2(SIMPLE_TXT),
            bz2(SIMPLE_XML),
        ] {
            let (g, summary) = load(&data, FileFormat::Unknown);
            check_simple_graph(&g, summary);
        }
    }

    #[test]
    fn bbox() {
        let mut g = Graph::default();
        let options = Options {
            file_format: FileFormat::Text,
            // Cuts off WATERLOOPLEIN (lon 4.9041)
            bbox: [4.89, 52.36, 4.90, 52.38],
            snap: 0.0,
        };
        let summary = add_segments_from_buffer(&mut g, &options, SIMPLE_TXT).unwrap();

        assert_eq!(summary, LoadSummary { added: 4, skipped: 5 });
        assert_eq!(g.len(), 3);
        assert!(g.id_of(WATERLOOPLEIN).is_none());
    }

    #[test]
    fn snap() {
        const DATA: &[u8] = b"0.30000000000000004 1.0 2.0 2.0 1.0\n0.3 1.0 5.0 5.0 1.0\n";

        let mut g = Graph::default();
        add_segments_from_buffer(&mut g, &options(FileFormat::Text), DATA).unwrap();
        assert_eq!(g.len(), 4);

        let mut g = Graph::default();
        let options = Options {
            file_format: FileFormat::Text,
            snap: 0.001,
            ..Options::default()
        };
        add_segments_from_buffer(&mut g, &options, DATA).unwrap();
        assert_eq!(g.len(), 3);
        assert_eq!(g.neighbors_of(Location::new(0.3, 1.0)).count(), 2);
    }

    #[test]
    fn invalid_xml() {
        let mut g = Graph::default();
        let r = add_segments_from_buffer(
            &mut g,
            &options(FileFormat::Xml),
            b"<segments><segment cost=\"1\"></oops></segments>",
        );
        assert!(matches!(r, Err(Error::Xml(_))));
    }

    #[test]
    fn missing_file() {
        let mut g = Graph::default();
        let r = add_segments_from_file(&mut g, &Options::default(), "/nonexistent/segments.txt");
        assert!(matches!(r, Err(Error::Io(_))));
    }
}
