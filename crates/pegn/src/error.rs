use alloc::{
    format,
    string::{String, ToString},
    vec::Vec,
};

use thiserror::Error;

use crate::{Cursor, NodeId, Position, Registry};

/// An expectation failure: the rule of type `kind` did not match at `at`.
///
/// This is the only error kind the scanner knows about. Invalid UTF-8 and
/// end of input surface as ordinary expectation failures of whichever rule
/// was trying to match.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("expecting {kind} at {at}")]
pub struct ScanError {
    /// Type of the rule that was expected.
    pub kind: i32,
    /// Cursor at the point the expectation failed.
    pub at: Cursor,
}

impl ScanError {
    /// Renders the error with the rule's registered name in place of its
    /// integer type. Unregistered types fall back to the integer.
    #[must_use]
    pub fn render(&self, names: &Registry) -> String {
        match names.name(self.kind) {
            Some(name) => format!("expecting {name} at {}", self.at),
            None => self.to_string(),
        }
    }
}

/// Violations of the node tree's structural invariants, and node JSON that
/// cannot be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// A node holding a value was given a child.
    #[error("node {0} carries a value and cannot take children")]
    ChildUnderLeaf(NodeId),
    /// A node with children was given a value.
    #[error("node {0} has children and cannot carry a value")]
    ValueOnBranch(NodeId),
    /// The node to attach already has a parent. Detach it first.
    #[error("node {0} is already attached to a parent")]
    AlreadyAttached(NodeId),
    /// Attaching `child` under `parent` would close a loop.
    #[error("node {child} cannot be placed under {parent}, its own descendant")]
    Cycle {
        /// Prospective parent.
        parent: NodeId,
        /// Node that is an ancestor of `parent`.
        child: NodeId,
    },
    /// A decoded node object had both a value and children.
    #[error("node object carries both \"V\" and \"N\"")]
    ValueAndNodes,
    /// The JSON text itself was malformed or had the wrong shape.
    #[error("invalid node JSON: {0}")]
    Json(String),
}

/// Rejected attempts to name a rule type in a [`Registry`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Types at or below zero belong to the built-in rules.
    #[error("rule type {0} is reserved")]
    Reserved(i32),
    /// The type already carries a different name.
    #[error("rule type {kind} is already registered as {existing}")]
    Taken {
        /// Type being registered.
        kind: i32,
        /// Name it already carries.
        existing: String,
    },
    /// The name, compared case-insensitively, already belongs to another
    /// type.
    #[error("rule name {name} is already registered as type {existing}")]
    NameTaken {
        /// Name being registered.
        name: String,
        /// Type that already owns the name.
        existing: i32,
    },
}

/// A serialized rule category outside `0..=2`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unknown rule category {0}")]
pub struct UnknownCategory(pub u8);

/// Why a top-level scan or parse failed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The top-level rule did not match.
    #[error("input rejected")]
    Rejected,
    /// The rule matched but input was left over.
    #[error("unconsumed input remains")]
    Incomplete,
    /// The scanner stopped after collecting this many errors.
    #[error("error limit of {0} reached")]
    ErrorLimit(usize),
}

/// Result of a failed [`driver::scan`](crate::driver::scan) or
/// [`driver::parse`](crate::driver::parse): the reason plus every error
/// left on the scanner, each paired with its resolved [`Position`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason} ({} errors)", .errors.len())]
pub struct Failure {
    /// Why the run failed.
    pub reason: FailureReason,
    /// Errors in the order they were pushed.
    pub errors: Vec<ScanError>,
    /// `positions[i]` locates `errors[i]`.
    pub positions: Vec<Position>,
}

impl Failure {
    /// One `error: expecting <rule> at <position>` line per error.
    #[must_use]
    pub fn report(&self, names: &Registry) -> String {
        let mut out = String::new();
        for (err, pos) in self.errors.iter().zip(&self.positions) {
            let rule = names
                .name(err.kind)
                .map_or_else(|| err.kind.to_string(), ToString::to_string);
            out.push_str(&format!("error: expecting {rule} at {pos}\n"));
        }
        out
    }
}
