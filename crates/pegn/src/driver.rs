//! Top-level entry points.
//!
//! Each call builds its own [`Scanner`] from the input and the caller's
//! [`ScanOptions`], runs one rule, and turns a failure into a [`Failure`]
//! carrying every diagnostic with its resolved [`Position`](crate::Position).
//!
//! ```rust
//! use pegn::{FailureReason, Registry, ScanOptions, builtin::Field, driver};
//!
//! let options = ScanOptions::default();
//! assert_eq!(driver::scan(&Field, "word", &options).unwrap().end, 4);
//!
//! let failure = driver::scan(&Field, "two words", &options).unwrap_err();
//! assert_eq!(failure.reason, FailureReason::Incomplete);
//! assert_eq!(
//!     failure.report(&Registry::builtin()),
//!     "error: expecting EndOfData at U+006F 'o' 1,3-3 (3-3)\n",
//! );
//! ```

use alloc::vec::Vec;

use crate::{
    Cursor, Failure, FailureReason, NodeId, Rule, ScanOptions, Scanner, Tree,
    builtin::END_OF_DATA,
};

/// Runs `rule`'s scan predicate over `input` and returns the final cursor.
///
/// # Errors
///
/// - [`FailureReason::Rejected`] if the rule fails.
/// - [`FailureReason::ErrorLimit`] if it fails with `max_errors`
///   diagnostics collected.
/// - [`FailureReason::Incomplete`] if it matches but input remains and
///   [`ScanOptions::allow_partial`] is off.
pub fn scan(
    rule: &dyn Rule,
    input: impl AsRef<[u8]>,
    options: &ScanOptions,
) -> Result<Cursor, Failure> {
    let mut s = session(rule, input.as_ref(), options);
    let matched = rule.scan(&mut s);
    settle(rule, &mut s, matched)?;
    Ok(s.cursor())
}

/// Runs `rule`'s parse function over `input` and returns the tree holding
/// the result together with the result's root.
///
/// # Errors
///
/// Same as [`scan`].
pub fn parse(
    rule: &dyn Rule,
    input: impl AsRef<[u8]>,
    options: &ScanOptions,
) -> Result<(Tree, NodeId), Failure> {
    let mut s = session(rule, input.as_ref(), options);
    let mut tree = Tree::new();
    let root = rule.parse(&mut s, &mut tree);
    settle(rule, &mut s, root.is_some())?;
    root.map(|root| (tree, root))
        .ok_or_else(|| failure(&s, FailureReason::Rejected))
}

fn session(rule: &dyn Rule, input: &[u8], options: &ScanOptions) -> Scanner {
    tracing::debug!(
        target: "pegn::driver",
        rule = rule.ident(),
        kind = rule.kind(),
        len = input.len(),
        "start"
    );
    let mut s = Scanner::new(options.clone());
    s.set_buffer(input);
    s
}

fn settle(rule: &dyn Rule, s: &mut Scanner, matched: bool) -> Result<(), Failure> {
    let reason = if !matched {
        match s.options().max_errors {
            Some(max) if s.error_limit_reached() => FailureReason::ErrorLimit(max),
            _ => FailureReason::Rejected,
        }
    } else if !s.finished() && !s.options().allow_partial {
        s.expected(END_OF_DATA);
        FailureReason::Incomplete
    } else {
        tracing::debug!(target: "pegn::driver", rule = rule.ident(), end = s.cursor().end, "matched");
        return Ok(());
    };
    tracing::debug!(
        target: "pegn::driver",
        rule = rule.ident(),
        %reason,
        errors = s.errors().len(),
        "failed"
    );
    Err(failure(s, reason))
}

fn failure(s: &Scanner, reason: FailureReason) -> Failure {
    let errors = s.errors().to_vec();
    let offsets: Vec<usize> = errors.iter().map(|e| e.at.end).collect();
    Failure {
        reason,
        positions: s.positions(&offsets),
        errors,
    }
}
