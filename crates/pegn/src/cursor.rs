use core::fmt;

/// The last code point scanned and its byte span `[start, end)` in the
/// scanner's buffer.
///
/// `end` is where the next decode begins, so `(start, end)` alone fixes the
/// scanner position. Cursors are plain values: [`Scanner::mark`] hands one
/// out and [`Scanner::goto`] adopts one back.
///
/// [`Scanner::mark`]: crate::Scanner::mark
/// [`Scanner::goto`]: crate::Scanner::goto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    /// Last decoded code point, `'\0'` before anything is scanned.
    pub rune: char,
    /// Byte offset of the first byte of `rune`.
    pub start: usize,
    /// Byte offset just past `rune`.
    pub end: usize,
}

impl Cursor {
    /// The pre-scan cursor: nothing decoded, both offsets zero.
    pub const START: Cursor = Cursor {
        rune: '\0',
        start: 0,
        end: 0,
    };

    /// Byte length of the span.
    #[must_use]
    pub fn width(&self) -> usize {
        self.end - self.start
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::START
    }
}

/// Renders as `'s' 5-6`.
impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}-{}", self.rune, self.start, self.end)
    }
}
