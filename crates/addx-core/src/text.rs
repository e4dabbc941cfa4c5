//! Text model primitives: sizes, ranges, and line/column conversions.

pub use text_size::{TextRange, TextSize};

/// Zero-based line and UTF-8 byte column.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl LineCol {
    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// Pre-computed line start offsets for a particular text snapshot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    line_ends: Vec<TextSize>,
    text_len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = vec![TextSize::from(0)];
        let mut line_ends = Vec::new();

        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    line_ends.push(TextSize::from(i as u32));
                    line_starts.push(TextSize::from((i + 1) as u32));
                    i += 1;
                }
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    line_ends.push(TextSize::from(i as u32));
                    line_starts.push(TextSize::from((i + 2) as u32));
                    i += 2;
                }
                b'\r' => {
                    line_ends.push(TextSize::from(i as u32));
                    line_starts.push(TextSize::from((i + 1) as u32));
                    i += 1;
                }
                _ => i += 1,
            }
        }
        line_ends.push(TextSize::of(text));

        Self {
            line_starts,
            line_ends,
            text_len: TextSize::of(text),
        }
    }

    #[inline]
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    #[inline]
    pub fn line_start(&self, line: u32) -> Option<TextSize> {
        self.line_starts.get(line as usize).copied()
    }

    fn line_index(&self, offset: TextSize) -> usize {
        // Offsets past the end are clamped; callers may pass `text_len` for EOF.
        let offset = offset.min(self.text_len);
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(insert) => insert.saturating_sub(1),
        }
    }

    /// Convert a byte offset to a line/column pair.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.text_len);
        let line = self.line_index(offset);
        let col = offset.min(self.line_ends[line]) - self.line_starts[line];
        LineCol {
            line: line as u32,
            col: u32::from(col),
        }
    }

    /// Convert a line/column pair to a byte offset.
    ///
    /// Returns `None` when the line does not exist or the column runs past the
    /// end of the line.
    pub fn offset(&self, line_col: LineCol) -> Option<TextSize> {
        let start = self.line_start(line_col.line)?;
        let end = *self.line_ends.get(line_col.line as usize)?;
        let offset = start + TextSize::from(line_col.col);
        (offset <= end).then_some(offset)
    }
}
