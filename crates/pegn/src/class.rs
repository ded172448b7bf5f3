//! Class-membership predicates.
//!
//! A class matches exactly one code point. Each predicate here is a plain
//! [`ClassFn`](crate::ClassFn) so it can be handed to
//! [`Class`](crate::Class) or called inline from hand-written rules.
//!
//! The `u*` classes test the Unicode general category of the code point.
//! `ucontrol` and `uspace` are the exceptions: they follow `Cc` and the
//! `White_Space` property, which [`char`] already exposes.

use unicode_general_category::{GeneralCategory, get_general_category};

/// Major class letter (`L`, `M`, `N`, `P`, `S`, `Z` or `C`) of `c`.
fn major(c: char) -> u8 {
    get_general_category(c)
        .abbreviation()
        .as_bytes()
        .first()
        .copied()
        .unwrap_or(b'C')
}

/// `SP / TAB / LF / CR`
#[must_use]
pub fn ws(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// `%x30-39`
#[must_use]
pub fn digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Printable code point: `L`, `M`, `N`, `P` or `S`, plus the ASCII space.
/// Other separators, format characters, private use and unassigned code
/// points are excluded.
#[must_use]
pub fn uprint(c: char) -> bool {
    c == ' ' || matches!(major(c), b'L' | b'M' | b'N' | b'P' | b'S')
}

/// Like [`uprint`] but admits every `Zs` space separator.
#[must_use]
pub fn ugraphic(c: char) -> bool {
    matches!(major(c), b'L' | b'M' | b'N' | b'P' | b'S')
        || get_general_category(c) == GeneralCategory::SpaceSeparator
}

/// `L`
#[must_use]
pub fn uletter(c: char) -> bool {
    major(c) == b'L'
}

/// `M`
#[must_use]
pub fn umark(c: char) -> bool {
    major(c) == b'M'
}

/// `N`
#[must_use]
pub fn unumber(c: char) -> bool {
    major(c) == b'N'
}

/// `Nd`
#[must_use]
pub fn udigit(c: char) -> bool {
    get_general_category(c) == GeneralCategory::DecimalNumber
}

/// `P`
#[must_use]
pub fn upunct(c: char) -> bool {
    major(c) == b'P'
}

/// `S`
#[must_use]
pub fn usymbol(c: char) -> bool {
    major(c) == b'S'
}

/// `Cc`
#[must_use]
pub fn ucontrol(c: char) -> bool {
    c.is_control()
}

/// `White_Space`
#[must_use]
pub fn uspace(c: char) -> bool {
    c.is_whitespace()
}

/// `Ll`
#[must_use]
pub fn ulower(c: char) -> bool {
    get_general_category(c) == GeneralCategory::LowercaseLetter
}

/// `Lu`
#[must_use]
pub fn uupper(c: char) -> bool {
    get_general_category(c) == GeneralCategory::UppercaseLetter
}

/// `Lt`
#[must_use]
pub fn utitle(c: char) -> bool {
    get_general_category(c) == GeneralCategory::TitlecaseLetter
}

/// Any code point at all.
#[must_use]
pub fn any(_: char) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_is_exactly_four_characters() {
        for c in [' ', '\t', '\n', '\r'] {
            assert!(ws(c), "{c:?}");
        }
        for c in ['1', 'a', '\u{b}', '\u{a0}', '\u{2028}'] {
            assert!(!ws(c), "{c:?}");
        }
    }

    #[test]
    fn uprint_excludes_controls_and_odd_space() {
        for c in ['a', 'É', '1', '٣', '-', '€', '👿', ' ', '\'', '\u{301}'] {
            assert!(uprint(c), "{c:?}");
        }
        for c in ['\0', '\n', '\t', '\u{7f}', '\u{85}', '\u{a0}', '\u{2028}', '\u{3000}'] {
            assert!(!uprint(c), "{c:?}");
        }
    }

    #[test]
    fn uprint_excludes_format_private_and_unassigned() {
        // ZWSP, BOM, soft hyphen, private use, unassigned
        for c in ['\u{200b}', '\u{feff}', '\u{ad}', '\u{e000}', '\u{378}'] {
            assert!(!uprint(c), "{c:?}");
            assert!(!ugraphic(c), "{c:?}");
        }
    }

    #[test]
    fn ugraphic_admits_space_separators() {
        for c in [' ', '\u{a0}', '\u{3000}', 'a', '€'] {
            assert!(ugraphic(c), "{c:?}");
        }
        for c in ['\t', '\u{2028}', '\u{200b}'] {
            assert!(!ugraphic(c), "{c:?}");
        }
    }

    #[test]
    fn unicode_classes() {
        assert!(digit('7') && !digit('٣'));
        assert!(unumber('٣') && unumber('7') && unumber('Ⅳ'));
        assert!(udigit('٣') && udigit('7') && !udigit('Ⅳ'));
        assert!(uletter('ж') && !uletter('1') && !uletter('\u{301}'));
        assert!(umark('\u{301}') && !umark('e'));
        assert!(upunct('-') && upunct('\'') && !upunct('+'));
        assert!(usymbol('+') && usymbol('€') && !usymbol('-'));
        assert!(ulower('ж') && !ulower('Ж'));
        assert!(uupper('Ж') && !uupper('ж'));
        assert!(utitle('ǅ') && !utitle('Ǆ') && !utitle('ǆ'));
        assert!(ucontrol('\u{1}') && !ucontrol('a'));
        assert!(uspace('\u{a0}') && !uspace('a'));
        assert!(any('\0') && any('👿'));
    }
}
