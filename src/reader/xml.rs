// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::io;
use std::str::from_utf8;

use quick_xml::events::{BytesStart, Event};

use super::model::{Entry, Record};
use super::{Error, SegmentReader};
use crate::{Location, Segment};

/// Parser is a trait for objects which can parse XML.
///
/// This trait only exists to fix the mismatch of
/// [quick_xml::Reader::read_event] when working on buffered data
/// and [quick_xml::Reader::read_event_into] when working on IO.
pub(super) trait Parser {
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>>;
}

/// IoParser implements [Parser] over an [std::io::BufRead].
pub(super) struct IoParser<R: io::BufRead>(quick_xml::Reader<R>, Vec<u8>);

impl<R: io::BufRead> IoParser<R> {
    #[inline]
    fn new(reader: R) -> Self {
        Self(quick_xml::Reader::from_reader(reader), Vec::default())
    }
}

impl<R: io::BufRead> Parser for IoParser<R> {
    #[inline]
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>> {
        self.1.clear();
        self.0.read_event_into(&mut self.1)
    }
}

/// BufParser implements [Parser] over a slice of bytes (`&[u8]`).
pub(super) struct BufParser<'a>(quick_xml::Reader<&'a [u8]>);

impl<'a> BufParser<'a> {
    #[inline]
    fn new(data: &'a [u8]) -> Self {
        Self(quick_xml::Reader::from_reader(data))
    }
}

impl<'a> Parser for BufParser<'a> {
    #[inline]
    fn read_event<'b>(&'b mut self) -> quick_xml::Result<Event<'b>> {
        self.0.read_event()
    }
}

/// Reader reads [Entries](Entry) from `segment` elements of an XML document.
pub(super) struct Reader<P: Parser> {
    parser: P,
    position: usize,
}

impl<P: Parser> Reader<P> {
    #[inline]
    fn new(parser: P) -> Self {
        Self {
            parser,
            position: 0,
        }
    }
}

impl<'a> Reader<BufParser<'a>> {
    #[inline]
    pub(super) fn from_buffer(data: &'a [u8]) -> Self {
        Self::new(BufParser::new(data))
    }
}

impl<R: io::BufRead> Reader<IoParser<R>> {
    #[inline]
    pub(super) fn from_io(reader: R) -> Self {
        Self::new(IoParser::new(reader))
    }
}

impl<P: Parser> SegmentReader for Reader<P> {
    fn next(&mut self) -> Result<Option<Entry>, Error> {
        loop {
            match self.parser.read_event()? {
                // Attributes carry all the data, so <segment .../> and
                // <segment ...></segment> are equivalent.
                Event::Empty(start) | Event::Start(start)
                    if start.local_name().as_ref() == b"segment" =>
                {
                    self.position += 1;
                    return Ok(Some(parse_segment(&start, self.position)));
                }

                Event::Eof => return Ok(None),

                _ => {}
            }
        }
    }
}

fn parse_segment(start: &BytesStart<'_>, position: usize) -> Entry {
    let mut from_lat = None;
    let mut from_lon = None;
    let mut to_lat = None;
    let mut to_lon = None;
    let mut cost = None;
    let mut both = false;

    for attr in start.attributes() {
        let attr = match attr {
            Ok(attr) => attr,
            Err(e) => return Entry::malformed(position, format!("invalid attribute: {}", e)),
        };

        let target = match attr.key.as_ref() {
            b"from-lat" => &mut from_lat,
            b"from-lon" => &mut from_lon,
            b"to-lat" => &mut to_lat,
            b"to-lon" => &mut to_lon,
            b"cost" => &mut cost,
            b"both" => {
                both = matches!(attr.value.as_ref(), b"yes" | b"true" | b"1");
                continue;
            }
            _ => continue,
        };

        match parse_number(&attr.value) {
            Some(x) => *target = Some(x),
            None => {
                return Entry::malformed(
                    position,
                    format!(
                        "invalid number in {}: {:?}",
                        String::from_utf8_lossy(attr.key.as_ref()),
                        String::from_utf8_lossy(&attr.value),
                    ),
                )
            }
        }
    }

    match (from_lat, from_lon, to_lat, to_lon, cost) {
        (Some(from_lat), Some(from_lon), Some(to_lat), Some(to_lon), Some(cost)) => {
            Entry::Record(Record {
                segment: Segment::new(
                    Location::new(from_lat, from_lon),
                    Location::new(to_lat, to_lon),
                    cost,
                ),
                both,
                position,
            })
        }
        _ => Entry::malformed(
            position,
            "segment requires from-lat, from-lon, to-lat, to-lon and cost",
        ),
    }
}

fn parse_number(value: &[u8]) -> Option<f64> {
    from_utf8(value).ok()?.trim().parse().ok()
}
