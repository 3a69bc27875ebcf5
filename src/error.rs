//! Error types, layered by how recoverable they are.
//!
//! - [`UnderspecifiedError`] — strict evaluation could not resolve a value.
//!   Raised only on the `evaluate` paths; the optimistic operations
//!   (`has_conflict`, `matches`, `infer`) swallow it internally and treat it
//!   as "cannot prove anything here".
//! - [`ParseError`] — the template text itself is malformed. Always fatal to
//!   the call that supplied the template; there is no partial recovery.
//! - [`ShapeError`] — the guard-level verdict. Carries enough context to
//!   print an expected-vs-actual diagnostic without re-running the match.

use thiserror::Error;

use crate::shape::Shape;
use crate::template::PartialShape;

/// Strict evaluation hit something that has no resolved value yet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnderspecifiedError {
    /// A named dimension is not in the known-dims table.
    #[error("unknown dimension `{0}`")]
    Unbound(String),
    /// An ellipsis stands for an unknown number of positions, so the
    /// template has no fixed expansion.
    #[error("an ellipsis (...) has no fixed expansion")]
    Ellipsis,
    /// An arithmetic operand resolved to an absent (dynamic) entry.
    #[error("arithmetic over a dynamic dimension with no value")]
    AbsentOperand,
    /// Division by a dimension that resolved to zero.
    #[error("division by zero while resolving a dimension")]
    DivisionByZero,
    /// Dimension arithmetic left the representable range.
    #[error("dimension arithmetic overflowed")]
    Overflow,
}

/// The template text could not be parsed.
///
/// Offsets are byte positions into the template string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A character outside the template alphabet.
    #[error("unexpected character `{ch}` at byte {at}")]
    UnexpectedChar { ch: char, at: usize },
    /// A well-formed token in a position the grammar does not allow.
    #[error("unexpected `{found}` at byte {at}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
        at: usize,
    },
    /// The template ended while the grammar still needed something.
    #[error("template ended early, expected {expected}")]
    UnexpectedEnd { expected: &'static str },
    /// A numeric literal that does not fit a dimension size.
    #[error("number `{text}` at byte {at} is too large for a dimension")]
    BadNumber { text: String, at: usize },
    /// Templates may absorb positions in at most one place.
    #[error("a template may contain at most one ellipsis, second `...` at byte {at}")]
    DuplicateEllipsis { at: usize },
    /// Empty or whitespace-only input.
    #[error("empty template")]
    Empty,
}

/// Verdict of a guard call that did not succeed.
///
/// The mismatch variants are only ever built by the orchestration layer in
/// [`crate::api`]; the template and expression layers report booleans and
/// maps and never construct one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// The template text is malformed.
    #[error("template parse error: {0}")]
    Template(#[from] ParseError),
    /// The shape has the wrong number of dimensions for the template.
    #[error(
        "tensor has the wrong rank ({actual} != {expected})\n\
         expected shape: {partial} (from template `{template}`)\n\
           actual shape: {shape}"
    )]
    RankMismatch {
        expected: usize,
        actual: usize,
        template: String,
        partial: PartialShape,
        shape: Shape,
    },
    /// Rank is fine but at least one position provably disagrees, even
    /// after inference had its say.
    #[error(
        "shape mismatch\n\
         expected shape: {partial} (from template `{template}`)\n\
           actual shape: {shape}"
    )]
    Mismatch {
        template: String,
        partial: PartialShape,
        shape: Shape,
    },
    /// Strict evaluation was requested for a template that cannot deliver.
    #[error(transparent)]
    Underspecified(#[from] UnderspecifiedError),
}
