//! The rule protocol: a scan predicate paired with a parse function.
//!
//! A [`Rule`] must honor the scanner's failure contract:
//!
//! - `scan` returning `false` leaves the cursor exactly as it found it and
//!   pushes at least one [`ScanError`](crate::ScanError);
//! - `parse` returning `None` additionally leaves the [`Tree`] without any
//!   new attached nodes;
//! - success leaves the cursor on the last code point consumed.
//!
//! Rule types are integers. [`UNTYPED`] (zero) marks rules that produce no
//! node of their own, negative types are reserved for [`builtin`] rules,
//! and grammars number their rules from one.

use alloc::{
    boxed::Box,
    collections::BTreeMap,
    string::{String, ToString},
};

use crate::{NodeId, RegistryError, Scanner, Tree, UnknownCategory};

pub mod builtin;
pub mod combinator;

/// Type of rules that produce no node of their own.
pub const UNTYPED: i32 = 0;

/// Class-membership predicate: does this code point belong to the class?
pub type ClassFn = fn(char) -> bool;

/// Scan predicate as a plain function.
pub type ScanFn = fn(&mut Scanner) -> bool;

/// Parse function as a plain function, building into the given tree.
pub type ParseFn = fn(&mut Scanner, &mut Tree) -> Option<NodeId>;

/// A grammar rule.
///
/// Only [`kind`](Self::kind), [`ident`](Self::ident) and
/// [`scan`](Self::scan) are required. The provided
/// [`parse`](Self::parse) turns whatever `scan` consumed into a leaf node,
/// which is right for tokens and classes; rules that build subtrees
/// override it.
pub trait Rule {
    /// Node type this rule produces and reports in errors.
    fn kind(&self) -> i32;

    /// Name used in diagnostics and the [`Registry`].
    fn ident(&self) -> &str;

    /// PEGN notation of the rule, if known.
    fn pegn(&self) -> &str {
        ""
    }

    /// Human-friendly description, if any.
    fn desc(&self) -> &str {
        ""
    }

    /// Consumes a match and reports success. On failure the cursor is
    /// restored and an error pushed.
    fn scan(&self, s: &mut Scanner) -> bool;

    /// Scans and, on success, returns a new standalone node for what was
    /// consumed.
    fn parse(&self, s: &mut Scanner, tree: &mut Tree) -> Option<NodeId> {
        parse_leaf(self, s, tree)
    }

    /// Parses and attaches the result as the last child of `parent`.
    ///
    /// An [`UNTYPED`] rule only consumes; nothing is attached. On failure
    /// nothing is attached either and any nodes allocated by the attempt
    /// are rolled back.
    fn parse_into(&self, s: &mut Scanner, tree: &mut Tree, parent: NodeId) -> bool {
        if self.kind() == UNTYPED {
            return self.scan(s);
        }
        attach(self, s, tree, parent)
    }

    /// Boxes the rule for use inside combinators.
    fn boxed(self) -> Box<dyn Rule>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

impl<R: Rule + ?Sized> Rule for Box<R> {
    fn kind(&self) -> i32 {
        (**self).kind()
    }

    fn ident(&self) -> &str {
        (**self).ident()
    }

    fn pegn(&self) -> &str {
        (**self).pegn()
    }

    fn desc(&self) -> &str {
        (**self).desc()
    }

    fn scan(&self, s: &mut Scanner) -> bool {
        (**self).scan(s)
    }

    fn parse(&self, s: &mut Scanner, tree: &mut Tree) -> Option<NodeId> {
        (**self).parse(s, tree)
    }

    fn parse_into(&self, s: &mut Scanner, tree: &mut Tree, parent: NodeId) -> bool {
        (**self).parse_into(s, tree, parent)
    }
}

/// Leaf node of the rule's type holding the consumed text.
fn parse_leaf<R: Rule + ?Sized>(rule: &R, s: &mut Scanner, tree: &mut Tree) -> Option<NodeId> {
    let m = s.mark();
    if !rule.scan(s) {
        return None;
    }
    Some(tree.new_node(rule.kind(), s.copy_ee(m)))
}

/// `parse` followed by `append`, undone as a whole if either fails.
pub(crate) fn attach<R: Rule + ?Sized>(
    rule: &R,
    s: &mut Scanner,
    tree: &mut Tree,
    parent: NodeId,
) -> bool {
    let m = s.mark();
    let checkpoint = tree.checkpoint();
    let Some(node) = rule.parse(s, tree) else {
        tree.rollback(checkpoint);
        return false;
    };
    if tree.append(parent, node).is_ok() {
        return true;
    }
    tree.rollback(checkpoint);
    s.revert(m, rule.kind())
}

/// A rule assembled from plain functions, the shape generated grammar code
/// takes.
///
/// ```rust
/// use pegn::{FnRule, Rule, Scanner};
///
/// fn abc(s: &mut Scanner) -> bool {
///     let m = s.mark();
///     if s.peek("abc") {
///         s.scan();
///         s.scan();
///         s.scan();
///         return true;
///     }
///     s.revert(m, 1)
/// }
///
/// let rule = FnRule::new(1, "Abc", abc).with_pegn("'abc'");
/// let mut s = Scanner::from_text("abcd");
/// assert!(rule.scan(&mut s));
/// assert_eq!(s.cursor().end, 3);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnRule {
    /// Node type.
    pub kind: i32,
    /// Rule name.
    pub ident: &'static str,
    /// PEGN notation, empty if unknown.
    pub pegn: &'static str,
    /// Scan predicate.
    pub scan: ScanFn,
    /// Custom parse function. Without one, the consumed text becomes a
    /// leaf node.
    pub parse: Option<ParseFn>,
}

impl FnRule {
    /// A rule with a scan function and the default leaf parse.
    #[must_use]
    pub const fn new(kind: i32, ident: &'static str, scan: ScanFn) -> Self {
        Self {
            kind,
            ident,
            pegn: "",
            scan,
            parse: None,
        }
    }

    /// Sets the PEGN notation.
    #[must_use]
    pub const fn with_pegn(mut self, pegn: &'static str) -> Self {
        self.pegn = pegn;
        self
    }

    /// Replaces the default leaf parse.
    #[must_use]
    pub const fn with_parse(mut self, parse: ParseFn) -> Self {
        self.parse = Some(parse);
        self
    }
}

impl Rule for FnRule {
    fn kind(&self) -> i32 {
        self.kind
    }

    fn ident(&self) -> &str {
        self.ident
    }

    fn pegn(&self) -> &str {
        self.pegn
    }

    fn scan(&self, s: &mut Scanner) -> bool {
        (self.scan)(s)
    }

    fn parse(&self, s: &mut Scanner, tree: &mut Tree) -> Option<NodeId> {
        match self.parse {
            Some(parse) => parse(s, tree),
            None => parse_leaf(self, s, tree),
        }
    }

    fn parse_into(&self, s: &mut Scanner, tree: &mut Tree, parent: NodeId) -> bool {
        if self.parse.is_none() && self.kind == UNTYPED {
            return self.scan(s);
        }
        attach(self, s, tree, parent)
    }
}

/// Which PEGN naming convention a rule name follows.
///
/// `Mixed` names are rules, `CAPS` names are tokens and `lower` names are
/// classes. Serialized as `0`, `1` and `2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "u8", try_from = "u8")
)]
pub enum RuleCategory {
    /// `Mixed` case: builds a node.
    #[default]
    Rule,
    /// `CAPS`: a fixed sequence of code points.
    Token,
    /// `lower`: a single code point from a set.
    Class,
}

impl RuleCategory {
    /// Category implied by the case of `name`.
    ///
    /// ```rust
    /// use pegn::RuleCategory;
    ///
    /// assert_eq!(RuleCategory::of_name("Field"), RuleCategory::Rule);
    /// assert_eq!(RuleCategory::of_name("CRLF"), RuleCategory::Token);
    /// assert_eq!(RuleCategory::of_name("uprint"), RuleCategory::Class);
    /// ```
    #[must_use]
    pub fn of_name(name: &str) -> Self {
        match name.chars().next() {
            Some(c) if c.is_lowercase() => Self::Class,
            Some(_)
                if name.chars().any(char::is_uppercase)
                    && !name.chars().any(char::is_lowercase) =>
            {
                Self::Token
            }
            _ => Self::Rule,
        }
    }
}

impl From<RuleCategory> for u8 {
    fn from(category: RuleCategory) -> Self {
        match category {
            RuleCategory::Rule => 0,
            RuleCategory::Token => 1,
            RuleCategory::Class => 2,
        }
    }
}

impl TryFrom<u8> for RuleCategory {
    type Error = UnknownCategory;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            0 => Ok(Self::Rule),
            1 => Ok(Self::Token),
            2 => Ok(Self::Class),
            _ => Err(UnknownCategory(n)),
        }
    }
}

/// Descriptive record of a rule: its type, name and notation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
pub struct RuleInfo {
    /// Node type.
    #[cfg_attr(any(test, feature = "serde"), serde(rename = "id"))]
    pub kind: i32,
    /// Rule name, unique in a [`Registry`] regardless of case.
    pub name: String,
    /// Rule, token or class.
    #[cfg_attr(any(test, feature = "serde"), serde(rename = "type", default))]
    pub category: RuleCategory,
    /// PEGN notation.
    #[cfg_attr(
        any(test, feature = "serde"),
        serde(default, skip_serializing_if = "String::is_empty")
    )]
    pub pegn: String,
    /// Human-friendly description.
    #[cfg_attr(
        any(test, feature = "serde"),
        serde(default, skip_serializing_if = "String::is_empty")
    )]
    pub desc: String,
}

impl RuleInfo {
    /// Snapshot of a rule's metadata.
    #[must_use]
    pub fn of(rule: &dyn Rule) -> Self {
        Self {
            kind: rule.kind(),
            name: rule.ident().to_string(),
            category: RuleCategory::of_name(rule.ident()),
            pegn: rule.pegn().to_string(),
            desc: rule.desc().to_string(),
        }
    }
}

/// Maps rule types to names so diagnostics can say `expecting Field`
/// instead of `expecting -5`. Scanning and parsing never consult it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    rules: BTreeMap<i32, RuleInfo>,
    /// Lowercased name to type.
    names: BTreeMap<String, i32>,
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every rule in [`builtin`].
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for rule in builtin::ALL {
            let info = RuleInfo::of(*rule);
            registry.names.insert(info.name.to_lowercase(), info.kind);
            registry.rules.insert(info.kind, info);
        }
        registry
    }

    /// Records a grammar rule.
    ///
    /// Registering the same type under the same name again is a no-op.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Reserved`] for [`UNTYPED`] and negative types.
    /// - [`RegistryError::Taken`] if the type is registered under another
    ///   name.
    /// - [`RegistryError::NameTaken`] if another type already owns the
    ///   name, compared case-insensitively.
    pub fn register(&mut self, rule: &dyn Rule) -> Result<(), RegistryError> {
        self.insert(RuleInfo::of(rule))
    }

    /// Like [`register`](Self::register), from a bare record.
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register).
    pub fn insert(&mut self, info: RuleInfo) -> Result<(), RegistryError> {
        if info.kind <= UNTYPED {
            return Err(RegistryError::Reserved(info.kind));
        }
        if let Some(existing) = self.rules.get(&info.kind) {
            if existing.name == info.name {
                return Ok(());
            }
            return Err(RegistryError::Taken {
                kind: info.kind,
                existing: existing.name.clone(),
            });
        }
        let key = info.name.to_lowercase();
        if let Some(&existing) = self.names.get(&key) {
            return Err(RegistryError::NameTaken {
                name: info.name,
                existing,
            });
        }
        self.names.insert(key, info.kind);
        self.rules.insert(info.kind, info);
        Ok(())
    }

    /// Registered name of a rule type.
    #[must_use]
    pub fn name(&self, kind: i32) -> Option<&str> {
        self.rules.get(&kind).map(|info| info.name.as_str())
    }

    /// Full record of a rule type.
    #[must_use]
    pub fn get(&self, kind: i32) -> Option<&RuleInfo> {
        self.rules.get(&kind)
    }

    /// All records in ascending type order.
    pub fn iter(&self) -> impl Iterator<Item = &RuleInfo> {
        self.rules.values()
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
