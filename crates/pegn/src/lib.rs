//! Scanning and parsing toolkit for grammars written in PEGN (Parsing
//! Expression Grammar Notation: ABNF-style token and class definitions
//! combined with PEG operators).
//!
//! The crate has three layers:
//!
//! - [`Scanner`]: a buffered, rune-centric scanner with a [`Cursor`] that
//!   can be bookmarked with [`Scanner::mark`] and restored with
//!   [`Scanner::goto`]. Failed rules push [`ScanError`]s onto the scanner's
//!   error stack.
//! - [`Tree`]: an arena-backed rooted node tree with parent and sibling
//!   links, used to hold parse results and serialized to a compact JSON
//!   form (`{"T":1,"V":"x"}` / `{"T":0,"N":[...]}`).
//! - [`Rule`]: the protocol tying a scan predicate to a parse function,
//!   plus combinators ([`Seq`], [`Choice`], [`Repeat`], [`Not`], [`And`])
//!   and a handful of core rules in [`builtin`].
//!
//! ```rust
//! use pegn::{Rule, Scanner, builtin::Field};
//!
//! let mut s = Scanner::from_text("fields don't have so-called spaces");
//! assert!(Field.scan(&mut s));
//! assert_eq!(s.cursor().end, 6);
//! ```

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod cursor;
mod error;
mod options;
mod position;

pub mod class;
pub mod driver;
pub mod node;
pub mod rule;
pub mod scanner;


pub use cursor::Cursor;
pub use error::{Failure, FailureReason, NodeError, RegistryError, ScanError, UnknownCategory};
pub use node::{Children, NodeId, NodeRef, Tree};
pub use options::ScanOptions;
pub use position::Position;
pub use rule::{
    ClassFn, FnRule, ParseFn, Registry, Rule, RuleCategory, RuleInfo, ScanFn, UNTYPED, builtin,
    combinator::{And, Choice, Class, Literal, Not, Repeat, Seq},
};
pub use scanner::Scanner;
