use core::fmt;

/// Human-friendly location of a byte offset within a buffer.
///
/// A position describes the code point that *ends* at the offset. Counts
/// are one-based once something has been consumed: the first code point
/// of the buffer is at line 1, line rune 1, buffer rune 1. Offset zero
/// (nothing consumed) reports line 1 with zero counts and a `'\0'` rune.
///
/// Computed by [`Scanner::positions`](crate::Scanner::positions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Code point ending at this offset.
    pub rune: char,
    /// Byte offset in the buffer.
    pub buf_byte: usize,
    /// Number of code points from the start of the buffer.
    pub buf_rune: usize,
    /// Line number, starting at 1.
    pub line: usize,
    /// Bytes from the start of the line.
    pub line_byte: usize,
    /// Code points from the start of the line.
    pub line_rune: usize,
}

/// Renders as:
///
/// ```text
/// U+1F47F '👿' 1,3-5 (3-5)
///              | | |  | |
///           line | |  | buffer byte offset
/// line rune offset |  buffer rune offset
///   line byte offset
/// ```
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "U+{:04X} {:?} {},{}-{} ({}-{})",
            u32::from(self.rune),
            self.rune,
            self.line,
            self.line_rune,
            self.line_byte,
            self.buf_rune,
            self.buf_byte,
        )
    }
}
