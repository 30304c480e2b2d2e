//! Source locations for LHC.
//!
//! The type checker never reads source text itself; it only carries the
//! spans handed to it by the analyzer so that unification failures can be
//! reported against the expression or pattern that produced them.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};

/// A byte offset into a source file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct BytePos(pub u32);

impl BytePos {
    /// Offset zero.
    pub const ZERO: Self = Self(0);

    /// Create a new byte position.
    #[must_use]
    pub const fn new(pos: u32) -> Self {
        Self(pos)
    }

    /// The offset as `usize`, for slicing.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// A half-open byte range `[lo, hi)` within one file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start of the span (inclusive).
    pub lo: BytePos,
    /// End of the span (exclusive).
    pub hi: BytePos,
}

impl Span {
    /// Span used for synthesized types that have no source location.
    pub const DUMMY: Self = Self {
        lo: BytePos::ZERO,
        hi: BytePos::ZERO,
    };

    /// Create a span from byte positions.
    #[must_use]
    pub const fn new(lo: BytePos, hi: BytePos) -> Self {
        Self { lo, hi }
    }

    /// Create a span from raw offsets.
    #[must_use]
    pub const fn from_raw(lo: u32, hi: u32) -> Self {
        Self {
            lo: BytePos(lo),
            hi: BytePos(hi),
        }
    }

    /// Returns true for [`Span::DUMMY`].
    #[must_use]
    pub const fn is_dummy(self) -> bool {
        self.lo.0 == 0 && self.hi.0 == 0
    }

    /// Length in bytes; zero for an inverted span.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.hi.0.saturating_sub(self.lo.0)
    }

    /// Returns true if the span covers no bytes.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.lo.0 == self.hi.0
    }

    /// The smallest span covering both `self` and `other`.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            lo: self.lo.min(other.lo),
            hi: self.hi.max(other.hi),
        }
    }
}

/// Identifies a source file within a compilation unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct FileId(pub u32);

impl FileId {
    /// Create a new file id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

/// A span together with the file it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FullSpan {
    /// The file.
    pub file: FileId,
    /// The range within the file.
    pub span: Span,
}

impl FullSpan {
    /// Create a new full span.
    #[must_use]
    pub const fn new(file: FileId, span: Span) -> Self {
        Self { file, span }
    }
}

/// A 1-indexed line and column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineCol {
    /// Line number, starting at 1.
    pub line: u32,
    /// Column in UTF-8 code units, starting at 1.
    pub col: u32,
}

impl LineCol {
    /// Create a new line/column pair.
    #[must_use]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// A source file with a precomputed line table.
#[derive(Clone, Debug)]
pub struct SourceFile {
    /// The file id.
    pub id: FileId,
    /// Display name (usually the path).
    pub name: String,
    /// Full source text.
    pub src: String,
    line_starts: Vec<BytePos>,
}

impl SourceFile {
    /// Create a new source file.
    #[must_use]
    pub fn new(id: FileId, name: String, src: String) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let line_starts = std::iter::once(BytePos::ZERO)
            .chain(src.match_indices('\n').map(|(i, _)| BytePos(i as u32 + 1)))
            .collect();
        Self {
            id,
            name,
            src,
            line_starts,
        }
    }

    /// Line and column of a byte position.
    #[must_use]
    pub fn lookup_line_col(&self, pos: BytePos) -> LineCol {
        let line_idx = self
            .line_starts
            .partition_point(|&start| start <= pos)
            .saturating_sub(1);
        let col = pos.0 - self.line_starts[line_idx].0 + 1;
        #[allow(clippy::cast_possible_truncation)]
        LineCol::new(line_idx as u32 + 1, col)
    }

    /// The source text covered by `span`, or `""` if it is out of range.
    #[must_use]
    pub fn source_text(&self, span: Span) -> &str {
        self.src
            .get(span.lo.as_usize()..span.hi.as_usize())
            .unwrap_or("")
    }

    /// The text of a 0-indexed line, without its newline.
    #[must_use]
    pub fn line_content(&self, line_idx: usize) -> Option<&str> {
        let start = self.line_starts.get(line_idx)?.as_usize();
        let end = self
            .line_starts
            .get(line_idx + 1)
            .map_or(self.src.len(), |next| next.as_usize().saturating_sub(1));
        self.src.get(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_and_len() {
        let a = Span::from_raw(4, 9);
        let b = Span::from_raw(7, 15);
        assert_eq!(a.len(), 5);
        assert_eq!(a.merge(b), Span::from_raw(4, 15));
        assert!(Span::DUMMY.is_dummy());
        assert!(Span::from_raw(3, 3).is_empty());
    }

    #[test]
    fn test_default_span_is_dummy() {
        assert_eq!(Span::default(), Span::DUMMY);
        assert_eq!(BytePos::default(), BytePos::ZERO);
    }

    #[test]
    fn test_inverted_span_has_zero_len() {
        assert_eq!(Span::from_raw(9, 4).len(), 0);
    }

    #[test]
    fn test_lookup_line_col() {
        let file = SourceFile::new(
            FileId::new(0),
            "Main.lhs".to_string(),
            "main = f x\n  where f = id\n".to_string(),
        );
        assert_eq!(file.lookup_line_col(BytePos::new(0)), LineCol::new(1, 1));
        assert_eq!(file.lookup_line_col(BytePos::new(11)), LineCol::new(2, 1));
        assert_eq!(file.lookup_line_col(BytePos::new(19)), LineCol::new(2, 9));
    }

    #[test]
    fn test_line_content_and_text() {
        let file = SourceFile::new(
            FileId::new(1),
            "List.lhs".to_string(),
            "data List a\n  = Nil".to_string(),
        );
        assert_eq!(file.line_content(0), Some("data List a"));
        assert_eq!(file.line_content(1), Some("  = Nil"));
        assert_eq!(file.line_content(2), None);
        assert_eq!(file.source_text(Span::from_raw(5, 9)), "List");
        assert_eq!(file.source_text(Span::from_raw(50, 60)), "");
    }
}
