//! Core rules every grammar can lean on, with their reserved negative
//! types.
//!
//! Each rule is a unit struct implementing [`Rule`] directly; there is no
//! shared state and no allocation outside of parsing.

use super::Rule;
use crate::{ClassFn, Scanner, class};

/// Type of [`EndOfData`].
pub const END_OF_DATA: i32 = -1;
/// Type of [`WhiteSpace`].
pub const WHITESPACE: i32 = -2;
/// Type of [`EndLine`].
pub const END_LINE: i32 = -3;
/// Type of [`EndPara`].
pub const END_PARA: i32 = -4;
/// Type of [`Field`].
pub const FIELD: i32 = -5;
/// Type of [`Uprint`].
pub const UPRINT: i32 = -6;
/// Type of [`Digit`].
pub const DIGIT: i32 = -7;
/// Type of [`Any`].
pub const ANY: i32 = -8;

/// Every built-in rule, in type order.
pub const ALL: &[&dyn Rule] = &[
    &EndOfData,
    &WhiteSpace,
    &EndLine,
    &EndPara,
    &Field,
    &Uprint,
    &Digit,
    &Any,
];

/// Scans one code point and keeps it if `class` accepts it.
fn one_of(s: &mut Scanner, kind: i32, class: ClassFn) -> bool {
    let m = s.mark();
    if s.scan() && class(s.rune()) {
        return true;
    }
    s.revert(m, kind)
}

/// `!.`: zero-width, matches only once everything is consumed.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndOfData;

impl Rule for EndOfData {
    fn kind(&self) -> i32 {
        END_OF_DATA
    }

    fn ident(&self) -> &str {
        "EndOfData"
    }

    fn pegn(&self) -> &str {
        "!."
    }

    fn desc(&self) -> &str {
        "end of data"
    }

    fn scan(&self, s: &mut Scanner) -> bool {
        s.finished() || s.expected(END_OF_DATA)
    }
}

/// Single space, tab, line feed or carriage return.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhiteSpace;

impl Rule for WhiteSpace {
    fn kind(&self) -> i32 {
        WHITESPACE
    }

    fn ident(&self) -> &str {
        "ws"
    }

    fn pegn(&self) -> &str {
        "SP / TAB / LF / CR"
    }

    fn desc(&self) -> &str {
        "space, tab, line feed ('\\n') or carriage return ('\\r')"
    }

    fn scan(&self, s: &mut Scanner) -> bool {
        one_of(s, WHITESPACE, class::ws)
    }
}

/// A line ending, `LF` or `CRLF`, consumed as one unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndLine;

impl Rule for EndLine {
    fn kind(&self) -> i32 {
        END_LINE
    }

    fn ident(&self) -> &str {
        "EndLine"
    }

    fn pegn(&self) -> &str {
        "LF / CRLF"
    }

    fn desc(&self) -> &str {
        "line feed, or carriage return and line feed"
    }

    fn scan(&self, s: &mut Scanner) -> bool {
        if s.peek("\n") {
            return s.scan();
        }
        if s.peek("\r\n") {
            return s.scan() && s.scan();
        }
        s.expected(END_LINE)
    }
}

/// End of a paragraph: optional blanks, then end of data, a final line
/// ending, or a blank line.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndPara;

impl Rule for EndPara {
    fn kind(&self) -> i32 {
        END_PARA
    }

    fn ident(&self) -> &str {
        "EndPara"
    }

    fn pegn(&self) -> &str {
        "(SP / TAB)* (!. / EndLine (!. / EndLine))"
    }

    fn desc(&self) -> &str {
        "end of data or a blank line, after optional trailing blanks"
    }

    fn scan(&self, s: &mut Scanner) -> bool {
        let m = s.mark();
        let base = s.errors().len();
        while s.peek(" ") || s.peek("\t") {
            s.scan();
        }
        let found = s.finished() || (EndLine.scan(s) && (s.finished() || EndLine.scan(s)));
        s.truncate_errors(base);
        found || s.revert(m, END_PARA)
    }
}

/// One or more printable code points other than space.
#[derive(Debug, Clone, Copy, Default)]
pub struct Field;

impl Rule for Field {
    fn kind(&self) -> i32 {
        FIELD
    }

    fn ident(&self) -> &str {
        "Field"
    }

    fn pegn(&self) -> &str {
        "(!SP uprint)+"
    }

    fn desc(&self) -> &str {
        "one or more printable code points except space"
    }

    fn scan(&self, s: &mut Scanner) -> bool {
        let m = s.mark();
        let base = s.errors().len();
        let mut count = 0;
        while !s.peek(" ") && Uprint.scan(s) {
            count += 1;
        }
        s.truncate_errors(base);
        count > 0 || s.revert(m, FIELD)
    }
}

/// One printable code point.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uprint;

impl Rule for Uprint {
    fn kind(&self) -> i32 {
        UPRINT
    }

    fn ident(&self) -> &str {
        "uprint"
    }

    fn pegn(&self) -> &str {
        "uletter / umark / unumber / upunct / usymbol / SP"
    }

    fn desc(&self) -> &str {
        "printable code point"
    }

    fn scan(&self, s: &mut Scanner) -> bool {
        one_of(s, UPRINT, class::uprint)
    }
}

/// One ASCII digit.
#[derive(Debug, Clone, Copy, Default)]
pub struct Digit;

impl Rule for Digit {
    fn kind(&self) -> i32 {
        DIGIT
    }

    fn ident(&self) -> &str {
        "digit"
    }

    fn pegn(&self) -> &str {
        "[0-9]"
    }

    fn scan(&self, s: &mut Scanner) -> bool {
        one_of(s, DIGIT, class::digit)
    }
}

/// Any single code point.
#[derive(Debug, Clone, Copy, Default)]
pub struct Any;

impl Rule for Any {
    fn kind(&self) -> i32 {
        ANY
    }

    fn ident(&self) -> &str {
        "any"
    }

    fn pegn(&self) -> &str {
        "."
    }

    fn scan(&self, s: &mut Scanner) -> bool {
        one_of(s, ANY, class::any)
    }
}
