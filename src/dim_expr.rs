//! Dimension expressions: the AST behind a single template slot.
//!
//! Every slot of a template compiles to one [`DimExpr`]. Three operations
//! drive everything the crate does with them:
//!
//! ```text
//!   has_conflict()  entry + known dims ──> proven mismatch yes/no
//!   evaluate()      known dims         ──> exact size, or why not
//!   infer()         entry + known dims ──> proposed new bindings
//! ```
//!
//! The asymmetry is deliberate. `has_conflict` and `infer` are optimistic:
//! whenever the tables lack the information to decide, they answer "no
//! conflict" / "nothing to propose" rather than fail. Only `evaluate` is
//! strict and reports *why* it could not produce a number.

use std::collections::HashMap;
use std::fmt;

use crate::error::UnderspecifiedError;
use crate::shape::ShapeEntry;

/// Size a [`DimExpr::Wildcard`] evaluates to.
///
/// `-1` lines up with the reshape convention of common tensor hosts, where
/// it marks an axis as "present but unconstrained".
pub const WILDCARD: i64 = -1;

/// Named-dimension table consulted and extended during matching.
pub type KnownDims = HashMap<String, i64>;

// --- Operators ---

/// Binary operator of a [`DimExpr::Op`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimOp {
    Add,
    Sub,
    Mul,
    /// Floor division, rounding toward negative infinity.
    Div,
}

impl DimOp {
    pub fn symbol(self) -> &'static str {
        match self {
            DimOp::Add => "+",
            DimOp::Sub => "-",
            DimOp::Mul => "*",
            DimOp::Div => "/",
        }
    }

    pub(crate) fn apply(self, left: i64, right: i64) -> Result<i64, UnderspecifiedError> {
        match self {
            DimOp::Add => left.checked_add(right).ok_or(UnderspecifiedError::Overflow),
            DimOp::Sub => left.checked_sub(right).ok_or(UnderspecifiedError::Overflow),
            DimOp::Mul => left.checked_mul(right).ok_or(UnderspecifiedError::Overflow),
            DimOp::Div => floor_div(left, right),
        }
    }

    /// Solve for the left operand: the value `l` with `l op right == entry`.
    ///
    /// For `Mul` and `Div` the solution is floored, so it is a candidate
    /// rather than a guarantee; the post-inference re-check catches the
    /// cases where no exact solution existed.
    pub(crate) fn invert_left(self, entry: i64, right: i64) -> Result<i64, UnderspecifiedError> {
        match self {
            DimOp::Add => entry.checked_sub(right).ok_or(UnderspecifiedError::Overflow),
            DimOp::Sub => entry.checked_add(right).ok_or(UnderspecifiedError::Overflow),
            DimOp::Mul => floor_div(entry, right),
            DimOp::Div => entry.checked_mul(right).ok_or(UnderspecifiedError::Overflow),
        }
    }

    /// Solve for the right operand given the left.
    ///
    /// Every operator is solved in the same `entry op left` form. For `Sub`
    /// and `Div` that is not the algebraic inverse, so the candidate can be
    /// wrong; the post-inference re-check rejects those shapes rather than
    /// this function refusing to propose.
    pub(crate) fn invert_right(self, entry: i64, left: i64) -> Result<i64, UnderspecifiedError> {
        match self {
            DimOp::Add => entry.checked_sub(left).ok_or(UnderspecifiedError::Overflow),
            DimOp::Sub => entry.checked_sub(left).ok_or(UnderspecifiedError::Overflow),
            DimOp::Mul => floor_div(entry, left),
            DimOp::Div => floor_div(entry, left),
        }
    }
}

impl fmt::Display for DimOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Floor division. Rust's `/` truncates toward zero; dimension arithmetic
/// floors toward negative infinity so that inverted bindings stay stable
/// around negative intermediates.
fn floor_div(a: i64, b: i64) -> Result<i64, UnderspecifiedError> {
    if b == 0 {
        return Err(UnderspecifiedError::DivisionByZero);
    }
    if a == i64::MIN && b == -1 {
        return Err(UnderspecifiedError::Overflow);
    }
    let quotient = a / b;
    let remainder = a % b;
    if remainder != 0 && (remainder < 0) != (b < 0) {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}

// --- Expressions ---

/// One slot of a shape template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimExpr {
    /// Fixed size, e.g. `3`.
    Fixed(i64),
    /// Named dimension resolved through the known-dims table, e.g. `B`.
    Named(String),
    /// Named dimension that also tolerates an absent entry, e.g. `B?`.
    DynamicNamed(String),
    /// Matches only an absent (dynamic) entry: `?`.
    Dynamic,
    /// Matches any single entry, present or absent: `*`.
    Wildcard,
    /// Absorbs zero or more positions: `...`. At most one per template and
    /// never an arithmetic operand; the grammar enforces both.
    Ellipsis,
    /// Arithmetic over two sub-expressions, e.g. `B*2` or `A+C`.
    Op {
        op: DimOp,
        left: Box<DimExpr>,
        right: Box<DimExpr>,
    },
}

impl DimExpr {
    pub fn named(name: impl Into<String>) -> Self {
        DimExpr::Named(name.into())
    }

    pub fn dynamic_named(name: impl Into<String>) -> Self {
        DimExpr::DynamicNamed(name.into())
    }

    pub fn op(op: DimOp, left: DimExpr, right: DimExpr) -> Self {
        DimExpr::Op {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Is `entry` *provably* incompatible with this expression under `known`?
    ///
    /// Never errors: anything unresolved counts as "no conflict proven".
    pub fn has_conflict(&self, entry: ShapeEntry, known: &KnownDims) -> bool {
        match self {
            DimExpr::Wildcard => false,
            // Ellipsis positions are absorbed before pairing, so this arm is
            // only reachable through hand-built templates. Kept total.
            DimExpr::Ellipsis => false,
            DimExpr::Fixed(size) => match entry {
                Some(actual) => actual != *size,
                None => true,
            },
            DimExpr::Dynamic => entry.is_some(),
            DimExpr::Named(name) => match entry {
                Some(actual) => known.get(name).is_some_and(|bound| *bound != actual),
                None => true,
            },
            DimExpr::DynamicNamed(name) => match entry {
                Some(actual) => known.get(name).is_some_and(|bound| *bound != actual),
                None => false,
            },
            DimExpr::Op { .. } => match entry {
                Some(actual) => match self.evaluate(known) {
                    Ok(Some(value)) => value != actual,
                    Ok(None) | Err(_) => false,
                },
                None => false,
            },
        }
    }

    /// Resolve to an exact entry, or explain why that is impossible.
    ///
    /// `Ok(None)` means "resolved to a dynamic entry": a bare `?`, or a `B?`
    /// whose name is unbound.
    pub fn evaluate(&self, known: &KnownDims) -> Result<ShapeEntry, UnderspecifiedError> {
        match self {
            DimExpr::Fixed(size) => Ok(Some(*size)),
            DimExpr::Named(name) => match known.get(name) {
                Some(bound) => Ok(Some(*bound)),
                None => Err(UnderspecifiedError::Unbound(name.clone())),
            },
            DimExpr::DynamicNamed(name) => Ok(known.get(name).copied()),
            DimExpr::Dynamic => Ok(None),
            DimExpr::Wildcard => Ok(Some(WILDCARD)),
            DimExpr::Ellipsis => Err(UnderspecifiedError::Ellipsis),
            DimExpr::Op { op, left, right } => {
                let left = left.evaluate(known)?.ok_or(UnderspecifiedError::AbsentOperand)?;
                let right = right.evaluate(known)?.ok_or(UnderspecifiedError::AbsentOperand)?;
                Ok(Some(op.apply(left, right)?))
            }
        }
    }

    /// Propose bindings for names this expression could pin to `entry`.
    ///
    /// Names already in `known` are left alone; re-binding is the re-check's
    /// business, not inference's. For an `Op` node the known side is
    /// evaluated and the operator inverted to push a target value into the
    /// other side, trying left-then-right and keeping the first side whose
    /// operand resolves.
    pub fn infer(&self, entry: ShapeEntry, known: &KnownDims) -> KnownDims {
        match self {
            DimExpr::Named(name) | DimExpr::DynamicNamed(name) => match entry {
                Some(size) if !known.contains_key(name) => {
                    KnownDims::from([(name.clone(), size)])
                }
                _ => KnownDims::new(),
            },
            DimExpr::Op { op, left, right } => {
                let Some(size) = entry else {
                    return KnownDims::new();
                };
                if let Ok(Some(left_val)) = left.evaluate(known) {
                    if let Ok(target) = op.invert_right(size, left_val) {
                        return right.infer(Some(target), known);
                    }
                }
                if let Ok(Some(right_val)) = right.evaluate(known) {
                    if let Ok(target) = op.invert_left(size, right_val) {
                        return left.infer(Some(target), known);
                    }
                }
                KnownDims::new()
            }
            _ => KnownDims::new(),
        }
    }
}

impl fmt::Display for DimExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimExpr::Fixed(size) => write!(f, "{size}"),
            DimExpr::Named(name) => f.write_str(name),
            DimExpr::DynamicNamed(name) => write!(f, "{name}?"),
            DimExpr::Dynamic => f.write_str("?"),
            DimExpr::Wildcard => f.write_str("*"),
            DimExpr::Ellipsis => f.write_str("..."),
            DimExpr::Op { op, left, right } => write!(f, "({left} {op} {right})"),
        }
    }
}
