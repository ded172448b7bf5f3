//! Scanner: buffered, rune-centric input for recursive-descent rules.
//!
//! What it does
//! - Owns the whole input up front (PEG assumes unlimited lookahead and
//!   lookbehind) as a shared, read-only byte buffer.
//! - Decodes one UTF-8 code point per [`Scanner::scan`] call and records it
//!   in a [`Cursor`] together with its byte span.
//! - Bookmarks and rewinds in O(1) via [`Scanner::mark`] and
//!   [`Scanner::goto`]; these are the only backtracking primitives.
//! - Collects [`ScanError`]s on a stack so composite rules can report the
//!   deepest failure or discard errors from abandoned alternatives.
//! - Renders diagnostics: a short cursor-plus-preview string and full
//!   line/column [`Position`]s.
//!
//! Rule contract
//! - A failing scan predicate leaves the cursor exactly where it found it
//!   and pushes at least one error. [`Scanner::revert`] does both.
//! - A succeeding scan predicate leaves the cursor on the last code point it
//!   consumed.
//!
//! Invariants
//! - `cursor.start <= cursor.end <= buf.len()`.
//! - `scan()` never pushes an error; reaching the end of the buffer or an
//!   invalid byte sequence simply returns `false` with no state change.
//! - The buffer is shared between clones; cursor and errors are not.

use alloc::{
    string::{String, ToString},
    sync::Arc,
    vec,
    vec::Vec,
};
use core::fmt;

use bstr::ByteSlice;

use crate::{Cursor, Position, ScanError, ScanOptions};

/// Buffered rune scanner. See the [module docs](self).
///
/// Cloning is cheap: the buffer is shared and only the cursor, error stack
/// and options are copied, so speculative branches can each own a scanner.
#[derive(Debug, Clone)]
pub struct Scanner {
    buf: Arc<[u8]>,
    cur: Cursor,
    errors: Vec<ScanError>,
    options: ScanOptions,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(ScanOptions::default())
    }
}

impl Scanner {
    /// An empty scanner configured by `options`.
    #[must_use]
    pub fn new(options: ScanOptions) -> Self {
        Self {
            buf: Arc::from(Vec::new()),
            cur: Cursor::START,
            errors: Vec::new(),
            options,
        }
    }

    /// A default-configured scanner over a copy of `bytes`.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        let mut s = Self::default();
        s.set_buffer(bytes);
        s
    }

    /// A default-configured scanner over the UTF-8 bytes of `text`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::from_bytes(text.as_bytes())
    }

    /// Reads `reader` to the end and scans the result.
    ///
    /// # Errors
    ///
    /// Propagates any error from reading.
    #[cfg(feature = "std")]
    pub fn from_reader<R: std::io::Read>(mut reader: R) -> std::io::Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self::from_bytes(bytes))
    }

    /// Replaces the buffer wholesale and resets the cursor to the pre-scan
    /// state. Accumulated errors are kept; clear them with
    /// [`truncate_errors`](Self::truncate_errors) if needed.
    pub fn set_buffer(&mut self, bytes: impl Into<Arc<[u8]>>) {
        self.buf = bytes.into();
        self.cur = Cursor::START;
    }

    /// The whole buffer.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Options the scanner runs with.
    #[must_use]
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    // ─── cursor ─────────────────────────────────────────────────────────────

    /// Decodes the code point at `cursor().end` and advances onto it.
    ///
    /// Returns `false` without touching any state at the end of the buffer
    /// or when the bytes there are not valid UTF-8.
    pub fn scan(&mut self) -> bool {
        let Some(rest) = self.buf.get(self.cur.end..) else {
            return false;
        };
        let (rune, len) = match rest.first() {
            None => return false,
            Some(&b) if b.is_ascii() => (char::from(b), 1),
            Some(_) => match bstr::decode_utf8(rest) {
                (Some(rune), len) => (rune, len),
                (None, _) => return false,
            },
        };
        self.cur = Cursor {
            rune,
            start: self.cur.end,
            end: self.cur.end + len,
        };
        if self.options.trace {
            tracing::trace!(target: "pegn::scanner", "{self}");
        }
        true
    }

    /// Snapshot of the live cursor.
    #[inline]
    #[must_use]
    pub fn mark(&self) -> Cursor {
        self.cur
    }

    /// Restores a snapshot taken with [`mark`](Self::mark).
    ///
    /// A mark that no longer fits the buffer, for example one taken before
    /// [`set_buffer`](Self::set_buffer) swapped in shorter input, is clamped
    /// onto the last code point of the buffer, or [`Cursor::START`] when
    /// the buffer is empty or ends in invalid UTF-8.
    #[inline]
    pub fn goto(&mut self, m: Cursor) {
        if m.start <= m.end && m.end <= self.buf.len() {
            self.cur = m;
            return;
        }
        self.cur = self.last_cursor();
        tracing::debug!(target: "pegn::scanner", mark = %m, "stale mark clamped to {}", self.cur);
    }

    /// Cursor resting on the final code point of the buffer.
    fn last_cursor(&self) -> Cursor {
        match bstr::decode_last_utf8(&self.buf[..]) {
            (Some(rune), len) => Cursor {
                rune,
                start: self.buf.len() - len,
                end: self.buf.len(),
            },
            (None, _) => Cursor::START,
        }
    }

    /// The live cursor.
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cur
    }

    /// Last code point scanned, `'\0'` before the first scan.
    #[inline]
    #[must_use]
    pub fn rune(&self) -> char {
        self.cur.rune
    }

    /// True if `lit` appears in the buffer starting at the next unscanned
    /// byte. Does not advance.
    #[must_use]
    pub fn peek(&self, lit: impl AsRef<[u8]>) -> bool {
        self.buf
            .get(self.cur.end..)
            .is_some_and(|rest| rest.starts_with(lit.as_ref()))
    }

    /// True if `lit` appears in the buffer starting at the last scanned
    /// code point, so the current rune is included. Does not advance.
    #[must_use]
    pub fn is(&self, lit: impl AsRef<[u8]>) -> bool {
        self.buf
            .get(self.cur.start..)
            .is_some_and(|rest| rest.starts_with(lit.as_ref()))
    }

    /// Nothing left to scan.
    #[must_use]
    pub fn finished(&self) -> bool {
        self.cur.end == self.buf.len()
    }

    /// Nothing scanned yet.
    #[must_use]
    pub fn beginning(&self) -> bool {
        self.cur.end == 0
    }

    // ─── range copies ───────────────────────────────────────────────────────
    //
    // Each copy runs between the live cursor and `m`, whichever comes first.
    // B/E name which edge of the earlier and later cursor bounds the range:
    //
    //    (n,m] - EE
    //    [n,m] - BE
    //    [n,m) - BB
    //    (n,m) - EB

    /// Text after the earlier cursor's rune through the later cursor's rune.
    /// With `m` from a `mark()` taken before a rule ran, this is exactly what
    /// the rule consumed.
    #[must_use]
    pub fn copy_ee(&self, m: Cursor) -> String {
        self.copy_range(m, Edge::End, Edge::End)
    }

    /// Both cursors' runes included.
    #[must_use]
    pub fn copy_be(&self, m: Cursor) -> String {
        self.copy_range(m, Edge::Begin, Edge::End)
    }

    /// The earlier cursor's rune included, the later one's excluded.
    #[must_use]
    pub fn copy_bb(&self, m: Cursor) -> String {
        self.copy_range(m, Edge::Begin, Edge::Begin)
    }

    /// Both cursors' runes excluded.
    #[must_use]
    pub fn copy_eb(&self, m: Cursor) -> String {
        self.copy_range(m, Edge::End, Edge::Begin)
    }

    fn copy_range(&self, m: Cursor, from: Edge, to: Edge) -> String {
        let (first, last) = if m.start <= self.cur.start {
            (m, self.cur)
        } else {
            (self.cur, m)
        };
        let lo = from.of(first).min(self.buf.len());
        let hi = to.of(last).min(self.buf.len());
        if lo >= hi {
            return String::new();
        }
        self.buf[lo..hi].to_str_lossy().into_owned()
    }

    // ─── errors ─────────────────────────────────────────────────────────────

    /// Pushes an error onto the stack.
    pub fn err_push(&mut self, err: ScanError) {
        self.errors.push(err);
    }

    /// Removes and returns the most recent error.
    pub fn err_pop(&mut self) -> Option<ScanError> {
        self.errors.pop()
    }

    /// All errors, oldest first.
    #[must_use]
    pub fn errors(&self) -> &[ScanError] {
        &self.errors
    }

    /// Drops every error pushed after the stack had `len` entries. Used by
    /// composite rules to forget the failures of abandoned alternatives.
    pub fn truncate_errors(&mut self, len: usize) {
        self.errors.truncate(len);
    }

    /// Pushes an expectation failure for `kind` at the live cursor and
    /// returns `false`, so rules can end with `return s.expected(KIND)`.
    pub fn expected(&mut self, kind: i32) -> bool {
        self.errors.push(ScanError { kind, at: self.cur });
        false
    }

    /// Restores `m`, then pushes an expectation failure for `kind` there and
    /// returns `false`. Every failing rule should leave through here.
    pub fn revert(&mut self, m: Cursor, kind: i32) -> bool {
        self.goto(m);
        self.expected(kind)
    }

    /// The configured `max_errors` has been reached.
    #[must_use]
    pub fn error_limit_reached(&self) -> bool {
        self.options
            .max_errors
            .is_some_and(|max| self.errors.len() >= max)
    }

    /// Changes the error limit. `None` removes it.
    pub fn set_max_errors(&mut self, max: Option<usize>) {
        self.options.max_errors = max;
    }

    // ─── observability ──────────────────────────────────────────────────────

    /// Number of upcoming bytes shown by the diagnostic string.
    pub fn set_preview_len(&mut self, len: usize) {
        self.options.preview_len = len;
    }

    /// See [`set_preview_len`](Self::set_preview_len).
    #[must_use]
    pub fn preview_len(&self) -> usize {
        self.options.preview_len
    }

    /// Logs every successful [`scan`](Self::scan) at trace level.
    pub fn trace_on(&mut self) {
        self.options.trace = true;
    }

    /// Stops per-scan logging.
    pub fn trace_off(&mut self) {
        self.options.trace = false;
    }

    /// Every error, one per line.
    #[must_use]
    pub fn error_string(&self) -> String {
        ScanErrors(&self.errors).to_string()
    }

    /// Logs the diagnostic string at debug level.
    pub fn log(&self) {
        tracing::debug!(target: "pegn::scanner", "{self}");
    }

    /// The upcoming bytes shown by `Display`, cut back to a code point
    /// boundary, and whether the buffer continues past them.
    fn preview(&self) -> (&[u8], bool) {
        let start = self.cur.end.min(self.buf.len());
        let mut end = start.saturating_add(self.options.preview_len).min(self.buf.len());
        let truncated = end < self.buf.len();
        if truncated {
            while end > start && is_continuation(self.buf[end]) {
                end -= 1;
            }
        }
        (&self.buf[start..end], truncated)
    }

    // ─── positions ──────────────────────────────────────────────────────────

    /// Position of the live cursor.
    #[must_use]
    pub fn pos(&self) -> Position {
        self.positions(&[self.cur.end])
            .pop()
            .unwrap_or_default()
    }

    /// Resolves each byte offset to a [`Position`] in a single forward pass
    /// over the buffer. Resolve many offsets in one call rather than calling
    /// [`pos`](Self::pos) repeatedly.
    ///
    /// Each configured newline sequence counts as one line break and belongs
    /// to the line it ends. An offset falling inside a newline sequence
    /// resolves to the end of that sequence; offsets past the buffer resolve
    /// to its end.
    #[must_use]
    pub fn positions(&self, offsets: &[usize]) -> Vec<Position> {
        let mut out = vec![Position::default(); offsets.len()];
        if offsets.is_empty() {
            return out;
        }
        let mut order: Vec<usize> = (0..offsets.len()).collect();
        order.sort_unstable_by_key(|&i| offsets[i]);
        let mut pending = order.iter().copied().peekable();

        let buf = &*self.buf;
        let mut here = Position {
            line: 1,
            ..Position::default()
        };
        let mut line_start = 0;
        let mut at = 0;

        loop {
            while let Some(&i) = pending.peek() {
                if offsets[i] > at {
                    break;
                }
                out[i] = here;
                pending.next();
            }
            if pending.peek().is_none() || at >= buf.len() {
                break;
            }

            let rest = &buf[at..];
            let newline = self
                .options
                .newlines
                .iter()
                .find(|nl| !nl.is_empty() && rest.starts_with(nl.as_bytes()));
            let (rune, len, runes) = match newline {
                Some(nl) => (nl.chars().last().unwrap_or('\n'), nl.len(), nl.chars().count()),
                None => match bstr::decode_utf8(rest) {
                    (Some(rune), len) => (rune, len, 1),
                    (None, len) => ('\u{FFFD}', len.max(1), 1),
                },
            };

            at += len;
            here.rune = rune;
            here.buf_byte = at;
            here.buf_rune += runes;
            here.line_byte = at - line_start;
            here.line_rune += runes;

            // offsets inside a multi-byte unit land on its end
            while let Some(&i) = pending.peek() {
                if offsets[i] > at {
                    break;
                }
                out[i] = here;
                pending.next();
            }

            if newline.is_some() {
                here.line += 1;
                here.line_rune = 0;
                here.line_byte = 0;
                line_start = at;
            }
        }

        for i in pending {
            out[i] = here;
        }
        out
    }
}

#[derive(Clone, Copy)]
enum Edge {
    Begin,
    End,
}

impl Edge {
    fn of(self, c: Cursor) -> usize {
        match self {
            Edge::Begin => c.start,
            Edge::End => c.end,
        }
    }
}

fn is_continuation(b: u8) -> bool {
    b & 0b1100_0000 == 0b1000_0000
}

/// Renders the cursor followed by a quoted preview of the next
/// `preview_len` bytes, with `...` when the buffer continues:
///
/// ```text
/// '\0' 0-0 "some"
/// 's' 0-1 "ome"
/// 's' 5-6 " don't hav..."
/// ```
impl fmt::Display for Scanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (bytes, truncated) = self.preview();
        let mut preview = bytes.to_str_lossy().into_owned();
        if truncated {
            preview.push_str("...");
        }
        write!(f, "{} {:?}", self.cur, preview)
    }
}

/// `Display` adapter listing errors one per line.
pub struct ScanErrors<'a>(pub &'a [ScanError]);

impl fmt::Display for ScanErrors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for err in self.0 {
            writeln!(f, "{err}")?;
        }
        Ok(())
    }
}
