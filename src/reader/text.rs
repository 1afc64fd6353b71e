// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::io;

use super::model::{Entry, Record};
use super::{Error, SegmentReader};
use crate::{Location, Segment};

/// Reader reads [Entries](Entry) from the line-based text format.
pub(super) struct Reader<R: io::BufRead> {
    reader: R,
    line: String,
    line_no: usize,
}

impl<R: io::BufRead> Reader<R> {
    pub(super) fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::default(),
            line_no: 0,
        }
    }
}

impl<R: io::BufRead> SegmentReader for Reader<R> {
    fn next(&mut self) -> Result<Option<Entry>, Error> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let content = match self.line.split_once('#') {
                Some((before, _)) => before,
                None => &self.line,
            };
            let content = content.trim();

            if !content.is_empty() {
                return Ok(Some(parse_line(content, self.line_no)));
            }
        }
    }
}

fn parse_line(line: &str, position: usize) -> Entry {
    let fields: Vec<&str> = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|f| !f.is_empty())
        .collect();

    if fields.len() != 5 && fields.len() != 6 {
        return Entry::malformed(position, format!("expected 5 or 6 fields, got {}", fields.len()));
    }

    let mut numbers = [0.0; 5];
    for (number, field) in numbers.iter_mut().zip(&fields) {
        match field.parse::<f64>() {
            Ok(x) => *number = x,
            Err(_) => return Entry::malformed(position, format!("invalid number: {:?}", field)),
        }
    }

    let both = match fields.get(5) {
        None | Some(&"oneway") => false,
        Some(&"both") => true,
        Some(other) => {
            return Entry::malformed(position, format!("invalid direction: {:?}", other));
        }
    };

    let [start_lat, start_lon, end_lat, end_lon, cost] = numbers;
    Entry::Record(Record {
        segment: Segment::new(
            Location::new(start_lat, start_lon),
            Location::new(end_lat, end_lon),
            cost,
        ),
        both,
        position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(data: &[u8]) -> Vec<Entry> {
        let mut r = Reader::new(data);
        let mut entries = Vec::default();
        while let Some(e) = r.next().unwrap() {
            entries.push(e);
        }
        entries
    }

    #[test]
    fn records() {
        let entries = read_all(b"1 2 3 4 5\n\n  # comment\n1.5,2.5, 3.5 ,4.5,0 both # trailing\n");

        assert_eq!(
            entries,
            vec![
                Entry::Record(Record {
                    segment: Segment::new(Location::new(1.0, 2.0), Location::new(3.0, 4.0), 5.0),
                    both: false,
                    position: 1,
                }),
                Entry::Record(Record {
                    segment: Segment::new(Location::new(1.5, 2.5), Location::new(3.5, 4.5), 0.0),
                    both: true,
                    position: 4,
                }),
            ]
        );
    }

    #[test]
    fn malformed() {
        let entries = read_all(b"1 2 3 4\n1 2 x 4 5\n1 2 3 4 5 up\n1 2 3 4 5 6 7\n");
        assert_eq!(entries.len(), 4);
        assert!(entries
            .iter()
            .all(|e| matches!(e, Entry::Malformed { .. })));
        assert!(matches!(entries[1], Entry::Malformed { position: 2, .. }));
    }

    #[test]
    fn no_trailing_newline() {
        let entries = read_all(b"1 2 3 4 5");
        assert_eq!(entries.len(), 1);
    }
}
