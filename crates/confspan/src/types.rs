//! source positions, ranges and value metadata
//!
//! Everything the pipeline decodes is annotated with a [Metadata]: the
//! [Range] it was read from, the [Source] it came from, and a [Provenance]
//! flag telling whether the value was taken verbatim from the document or
//! synthesized because the document omitted it. Defaulted values carry the
//! range of their *enclosing* resource, never an empty range.

use std::fmt;
use std::sync::Arc;

/// A 1-based (line, column) cursor into a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }

    /// The first character of a document.
    pub fn start() -> Self {
        Position { line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Inclusive start/end span in the original document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start <= end, "range start must not be after its end");
        Range { start, end }
    }

    /// A single-character range.
    pub fn at(position: Position) -> Self {
        Range {
            start: position,
            end: position,
        }
    }

    pub fn start_line(&self) -> usize {
        self.start.line
    }

    pub fn end_line(&self) -> usize {
        self.end.line
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl serde::Serialize for Range {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Label for where a document came from.
///
/// Only ever reported back to the user, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Source(Arc<str>);

impl Source {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn from_path(path: &std::path::Path) -> Self {
        Source(path.to_string_lossy().into())
    }
}

impl From<&str> for Source {
    fn from(value: &str) -> Self {
        Source(value.into())
    }
}

impl From<String> for Source {
    fn from(value: String) -> Self {
        Source(value.into())
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for Source {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Whether a value was read from the document or synthesized as a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Explicit,
    Defaulted,
}

/// Where a decoded value came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    range: Range,
    source: Source,
    provenance: Provenance,
}

impl Metadata {
    /// Metadata for a value taken verbatim from the document.
    pub fn new(range: Range, source: Source) -> Self {
        Metadata {
            range,
            source,
            provenance: Provenance::Explicit,
        }
    }

    /// Metadata for a value synthesized because the document omitted it,
    /// stamped with the enclosing element's range.
    pub fn defaulted_at(&self) -> Metadata {
        Metadata {
            range: self.range,
            source: self.source.clone(),
            provenance: Provenance::Defaulted,
        }
    }

    /// Metadata for a value with no source location at all.
    ///
    /// Only for structures assembled outside any document, e.g. expected
    /// values in tests. Decoded fields never carry this.
    pub fn detached() -> Metadata {
        Metadata {
            range: Range::at(Position::start()),
            source: Source::from("<detached>"),
            provenance: Provenance::Defaulted,
        }
    }

    pub fn range(&self) -> Range {
        self.range
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn is_defaulted(&self) -> bool {
        self.provenance == Provenance::Defaulted
    }
}

impl serde::Serialize for Metadata {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Metadata", 3)?;
        state.serialize_field("source", &self.source)?;
        state.serialize_field("range", &self.range)?;
        state.serialize_field("defaulted", &self.is_defaulted())?;
        state.end()
    }
}

/// Translates byte offsets of a parsed document into [Position]s.
///
/// Used for notations parsed by external parsers that report spans as byte
/// offsets (hcl-edit).
#[derive(Debug)]
pub struct LineIndex {
    text: String,
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset + 1);
            }
        }
        LineIndex {
            text: text.to_string(),
            line_starts,
        }
    }

    /// Columns count characters, matching the cursor of the hand-written
    /// reader; `offset` is floored to the nearest character boundary.
    pub fn position(&self, offset: usize) -> Position {
        let mut offset = offset.min(self.text.len());
        while offset > 0 && !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = self.line_starts.partition_point(|start| *start <= offset);
        let line_start = self.line_starts[line - 1];
        Position {
            line,
            column: self.text[line_start..offset].chars().count() + 1,
        }
    }

    /// Converts an end-exclusive byte span into an inclusive [Range].
    pub fn range(&self, span: std::ops::Range<usize>) -> Range {
        let last = span.end.saturating_sub(1).max(span.start);
        Range::new(self.position(span.start), self.position(last))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn line_index_positions() {
        let index = LineIndex::new("one\ntwo\n\nfour");

        assert_eq!(index.position(0), Position::new(1, 1));
        assert_eq!(index.position(2), Position::new(1, 3));
        assert_eq!(index.position(4), Position::new(2, 1));
        assert_eq!(index.position(8), Position::new(3, 1));
        assert_eq!(index.position(9), Position::new(4, 1));
        assert_eq!(index.position(12), Position::new(4, 4));
    }

    #[test]
    fn line_index_spans_become_inclusive_ranges() {
        let index = LineIndex::new("one\ntwo\n\nfour");

        // "two" occupies bytes 4..7
        assert_eq!(
            index.range(4..7),
            Range::new(Position::new(2, 1), Position::new(2, 3))
        );
    }

    #[test]
    fn line_index_columns_count_characters() {
        let index = LineIndex::new("aé = \"café\"\nnext");

        // 'é' is two bytes but one column; '=' sits at byte 4, column 4
        assert_eq!(index.position(4), Position::new(1, 4));
        // offsets inside a multi-byte character floor to its start
        assert_eq!(index.position(2), Position::new(1, 2));
        // "café" with quotes occupies bytes 6..13 and columns 6..=11
        assert_eq!(
            index.range(6..13),
            Range::new(Position::new(1, 6), Position::new(1, 11))
        );
    }

    #[test]
    fn defaulted_metadata_keeps_the_enclosing_range() {
        let range = Range::new(Position::new(2, 1), Position::new(5, 1));
        let metadata = Metadata::new(range, Source::from("main.tf"));

        let defaulted = metadata.defaulted_at();
        assert_eq!(defaulted.range(), range);
        assert!(defaulted.is_defaulted());
        assert!(!metadata.is_defaulted());
    }

    #[test]
    fn range_renders_start_and_end() {
        let range = Range::new(Position::new(2, 3), Position::new(4, 1));
        assert_eq!(range.to_string(), "2:3-4:1");
    }
}
