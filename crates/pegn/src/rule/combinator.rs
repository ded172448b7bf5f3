//! PEG operators over boxed rules, plus literal and class leaves.
//!
//! Backtracking is plain [`mark`](Scanner::mark)/[`goto`](Scanner::goto);
//! nothing is memoized, so ambiguous alternatives rescan their input.
//!
//! Typed composites ([`Seq`], [`Choice`], [`Repeat`]) produce one branch
//! node holding the nodes of their parts. If no part produced a node, the
//! composite becomes a leaf carrying the consumed text instead. Untyped
//! composites are transparent: their parts attach straight to the caller's
//! parent.
//!
//! ```rust
//! use pegn::{Choice, Literal, Repeat, Rule, Scanner, Seq, builtin::Digit};
//!
//! // Number <- '-'? [0-9]+
//! let number = Seq::new(1, [
//!     Repeat::optional(0, Literal::new(0, "-")).boxed(),
//!     Repeat::one_or_more(0, Digit).boxed(),
//! ]);
//! let mut s = Scanner::from_text("-42,");
//! assert!(number.scan(&mut s));
//! assert_eq!(s.cursor().end, 3);
//!
//! let sign = Choice::new(0, [Literal::new(2, "+").boxed(), Literal::new(3, "-").boxed()]);
//! assert!(!sign.scan(&mut s));
//! ```

use alloc::{borrow::Cow, boxed::Box, vec::Vec};

use super::{Rule, UNTYPED, attach};
use crate::{ClassFn, Cursor, NodeId, Scanner, Tree};

/// Where a composite sends its parts: nowhere for a plain scan, or under a
/// node while parsing.
enum Sink<'t> {
    Scan,
    Node(&'t mut Tree, NodeId),
}

impl Sink<'_> {
    fn run(&mut self, rule: &dyn Rule, s: &mut Scanner) -> bool {
        match self {
            Self::Scan => rule.scan(s),
            Self::Node(tree, node) => rule.parse_into(s, tree, *node),
        }
    }
}

/// Restores `m` and makes sure the failure left a diagnostic. Typed rules
/// always report themselves; untyped ones only when their parts said
/// nothing.
fn fail(s: &mut Scanner, m: Cursor, kind: i32, base: usize) -> bool {
    s.goto(m);
    if kind != UNTYPED || s.errors().len() <= base {
        s.expected(kind);
    }
    false
}

/// Composite rules differ only in how they run their parts.
trait Compose: Rule {
    fn fill(&self, s: &mut Scanner, sink: &mut Sink<'_>) -> bool;

    fn compose_scan(&self, s: &mut Scanner) -> bool {
        let m = s.mark();
        let base = s.errors().len();
        self.fill(s, &mut Sink::Scan) || fail(s, m, self.kind(), base)
    }

    /// Parts go under a fresh node of this rule's type.
    fn compose_parse(&self, s: &mut Scanner, tree: &mut Tree) -> Option<NodeId> {
        let kind = self.kind();
        let m = s.mark();
        let base = s.errors().len();
        let checkpoint = tree.checkpoint();
        let node = tree.new_node(kind, "");
        if !self.fill(s, &mut Sink::Node(tree, node)) {
            tree.rollback(checkpoint);
            fail(s, m, kind, base);
            return None;
        }
        if tree.count(node) == 0 {
            tree.rollback(checkpoint);
            return Some(tree.new_node(kind, s.copy_ee(m)));
        }
        Some(node)
    }

    fn compose_into(&self, s: &mut Scanner, tree: &mut Tree, parent: NodeId) -> bool {
        if self.kind() != UNTYPED {
            return attach(self, s, tree, parent);
        }
        let m = s.mark();
        let base = s.errors().len();
        let checkpoint = tree.checkpoint();
        if self.fill(s, &mut Sink::Node(tree, parent)) {
            return true;
        }
        tree.rollback(checkpoint);
        fail(s, m, UNTYPED, base)
    }
}

macro_rules! impl_rule_for_compose {
    ($($t:ident => $ident:literal),+ $(,)?) => {
        $(
            impl Rule for $t {
                fn kind(&self) -> i32 {
                    self.kind
                }

                fn ident(&self) -> &str {
                    $ident
                }

                fn scan(&self, s: &mut Scanner) -> bool {
                    self.compose_scan(s)
                }

                fn parse(&self, s: &mut Scanner, tree: &mut Tree) -> Option<NodeId> {
                    self.compose_parse(s, tree)
                }

                fn parse_into(&self, s: &mut Scanner, tree: &mut Tree, parent: NodeId) -> bool {
                    self.compose_into(s, tree, parent)
                }
            }
        )+
    };
}

impl_rule_for_compose!(Seq => "Seq", Choice => "Choice", Repeat => "Repeat");

// ─── sequence ───────────────────────────────────────────────────────────────

/// `a b c`: every part in order, or nothing.
pub struct Seq {
    kind: i32,
    rules: Vec<Box<dyn Rule>>,
}

impl Seq {
    /// Matches each rule in turn.
    #[must_use]
    pub fn new(kind: i32, rules: impl IntoIterator<Item = Box<dyn Rule>>) -> Self {
        Self {
            kind,
            rules: rules.into_iter().collect(),
        }
    }
}

impl Compose for Seq {
    fn fill(&self, s: &mut Scanner, sink: &mut Sink<'_>) -> bool {
        self.rules.iter().all(|rule| sink.run(rule.as_ref(), s))
    }
}

// ─── ordered choice ─────────────────────────────────────────────────────────

/// `a / b / c`: the first alternative that matches.
///
/// Errors from alternatives tried before the winner are discarded. Once the
/// scanner's error limit is reached no further alternatives are tried.
pub struct Choice {
    kind: i32,
    alternatives: Vec<Box<dyn Rule>>,
}

impl Choice {
    /// Tries each alternative in order; the first match wins.
    #[must_use]
    pub fn new(kind: i32, alternatives: impl IntoIterator<Item = Box<dyn Rule>>) -> Self {
        Self {
            kind,
            alternatives: alternatives.into_iter().collect(),
        }
    }
}

impl Compose for Choice {
    fn fill(&self, s: &mut Scanner, sink: &mut Sink<'_>) -> bool {
        let base = s.errors().len();
        for alternative in &self.alternatives {
            if s.error_limit_reached() {
                tracing::debug!(target: "pegn::rule", kind = self.kind, "error limit reached, giving up on choice");
                return false;
            }
            if sink.run(alternative.as_ref(), s) {
                s.truncate_errors(base);
                return true;
            }
        }
        false
    }
}

// ─── repetition ─────────────────────────────────────────────────────────────

/// `a*`, `a+`, `a?` and `a{min,max}`.
///
/// Stops at the first failed attempt, at `max` matches, or after a match
/// that consumed nothing. The diagnostics of the final failed attempt are
/// discarded when at least `min` matches were made.
pub struct Repeat {
    kind: i32,
    rule: Box<dyn Rule>,
    min: usize,
    max: Option<usize>,
}

impl Repeat {
    /// Matches `rule` at least `min` and at most `max` times. `None` is
    /// unbounded.
    #[must_use]
    pub fn new(kind: i32, rule: impl Rule + 'static, min: usize, max: Option<usize>) -> Self {
        Self {
            kind,
            rule: rule.boxed(),
            min,
            max,
        }
    }

    /// `a?`
    #[must_use]
    pub fn optional(kind: i32, rule: impl Rule + 'static) -> Self {
        Self::new(kind, rule, 0, Some(1))
    }

    /// `a*`
    #[must_use]
    pub fn zero_or_more(kind: i32, rule: impl Rule + 'static) -> Self {
        Self::new(kind, rule, 0, None)
    }

    /// `a+`
    #[must_use]
    pub fn one_or_more(kind: i32, rule: impl Rule + 'static) -> Self {
        Self::new(kind, rule, 1, None)
    }
}

impl Compose for Repeat {
    fn fill(&self, s: &mut Scanner, sink: &mut Sink<'_>) -> bool {
        let mut matched = 0;
        while self.max.is_none_or(|max| matched < max) {
            if s.error_limit_reached() {
                return false;
            }
            let before = s.mark();
            let base = s.errors().len();
            if !sink.run(self.rule.as_ref(), s) {
                if matched >= self.min {
                    s.truncate_errors(base);
                }
                break;
            }
            matched += 1;
            if s.mark().end == before.end {
                break;
            }
        }
        matched >= self.min
    }
}

// ─── lookahead ──────────────────────────────────────────────────────────────

/// `!a`: succeeds, consuming nothing, where `a` fails.
pub struct Not {
    kind: i32,
    rule: Box<dyn Rule>,
}

impl Not {
    /// Succeeds without consuming when `rule` does not match.
    #[must_use]
    pub fn new(kind: i32, rule: impl Rule + 'static) -> Self {
        Self {
            kind,
            rule: rule.boxed(),
        }
    }
}

impl Rule for Not {
    fn kind(&self) -> i32 {
        self.kind
    }

    fn ident(&self) -> &str {
        "Not"
    }

    fn scan(&self, s: &mut Scanner) -> bool {
        let m = s.mark();
        let base = s.errors().len();
        if self.rule.scan(s) {
            return s.revert(m, self.kind);
        }
        s.truncate_errors(base);
        true
    }

    /// An empty leaf of this rule's type.
    fn parse(&self, s: &mut Scanner, tree: &mut Tree) -> Option<NodeId> {
        self.scan(s).then(|| tree.new_node(self.kind, ""))
    }

    fn parse_into(&self, s: &mut Scanner, _: &mut Tree, _: NodeId) -> bool {
        self.scan(s)
    }
}

/// `&a`: succeeds, consuming nothing, where `a` matches.
pub struct And {
    kind: i32,
    rule: Box<dyn Rule>,
}

impl And {
    /// Succeeds without consuming when `rule` matches.
    #[must_use]
    pub fn new(kind: i32, rule: impl Rule + 'static) -> Self {
        Self {
            kind,
            rule: rule.boxed(),
        }
    }
}

impl Rule for And {
    fn kind(&self) -> i32 {
        self.kind
    }

    fn ident(&self) -> &str {
        "And"
    }

    fn scan(&self, s: &mut Scanner) -> bool {
        let m = s.mark();
        let base = s.errors().len();
        if self.rule.scan(s) {
            s.goto(m);
            return true;
        }
        fail(s, m, self.kind, base)
    }

    /// An empty leaf of this rule's type.
    fn parse(&self, s: &mut Scanner, tree: &mut Tree) -> Option<NodeId> {
        self.scan(s).then(|| tree.new_node(self.kind, ""))
    }

    fn parse_into(&self, s: &mut Scanner, _: &mut Tree, _: NodeId) -> bool {
        self.scan(s)
    }
}

// ─── leaves ─────────────────────────────────────────────────────────────────

/// An exact byte sequence, such as `'abc'` or `CRLF`.
#[derive(Debug, Clone)]
pub struct Literal {
    kind: i32,
    text: Cow<'static, str>,
}

impl Literal {
    /// Matches `text` exactly.
    #[must_use]
    pub fn new(kind: i32, text: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

impl Rule for Literal {
    fn kind(&self) -> i32 {
        self.kind
    }

    fn ident(&self) -> &str {
        &self.text
    }

    fn scan(&self, s: &mut Scanner) -> bool {
        let m = s.mark();
        if !s.peek(self.text.as_bytes()) {
            return s.expected(self.kind);
        }
        let end = m.end + self.text.len();
        while s.cursor().end < end {
            if !s.scan() {
                return s.revert(m, self.kind);
            }
        }
        true
    }
}

/// One code point accepted by a [`ClassFn`].
#[derive(Debug, Clone, Copy)]
pub struct Class {
    kind: i32,
    ident: &'static str,
    class: ClassFn,
}

impl Class {
    /// Matches one code point accepted by `class`.
    #[must_use]
    pub const fn new(kind: i32, ident: &'static str, class: ClassFn) -> Self {
        Self { kind, ident, class }
    }
}

impl Rule for Class {
    fn kind(&self) -> i32 {
        self.kind
    }

    fn ident(&self) -> &str {
        self.ident
    }

    fn scan(&self, s: &mut Scanner) -> bool {
        let m = s.mark();
        if s.scan() && (self.class)(s.rune()) {
            return true;
        }
        s.revert(m, self.kind)
    }
}
