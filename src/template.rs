//! Parsed shape templates and the matching/inference engine.
//!
//! A [`ShapeTemplate`] is an ordered list of [`DimExpr`]s with at most one
//! ellipsis. Everything the guard layer does reduces to four operations
//! here:
//!
//! ```text
//!             ┌─ rank_matches ── arity check, ellipsis-aware
//!             │
//! template ───┼─ matches ─────── rank + no position provably conflicts
//!             │
//!             ├─ evaluate ────── strict: every entry or a reason why not
//!             │   └─ partial_evaluate: best effort, for diagnostics
//!             │
//!             └─ infer ───────── fixpoint: propose bindings, re-run with
//!                                them known, stop on an empty pass
//! ```
//!
//! Inference saturates: one pass over the paired positions collects
//! proposals from every entry, the proposals are folded into the working
//! table, and the loop repeats until a pass proposes nothing. A binding
//! discovered from one position can unlock arithmetic in another, so a
//! single pass is not enough; termination is guaranteed because passes only
//! ever propose names that are not yet bound.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::dim_expr::{DimExpr, KnownDims};
use crate::error::{ParseError, UnderspecifiedError};
use crate::shape::{Shape, ShapeEntry};

bitflags::bitflags! {
    /// Coarse template traits, computed once at parse time.
    ///
    /// Lets callers skip work that cannot apply: inference is a no-op for a
    /// template without [`NAMED`](TemplateFlags::NAMED) entries, strict
    /// evaluation cannot succeed with
    /// [`ELLIPSIS`](TemplateFlags::ELLIPSIS) set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TemplateFlags: u8 {
        const ELLIPSIS   = 1 << 0;
        const WILDCARD   = 1 << 1;
        const NAMED      = 1 << 2;
        const DYNAMIC    = 1 << 3;
        const ARITHMETIC = 1 << 4;
    }
}

fn entry_flags(entry: &DimExpr) -> TemplateFlags {
    match entry {
        DimExpr::Fixed(_) => TemplateFlags::empty(),
        DimExpr::Named(_) => TemplateFlags::NAMED,
        DimExpr::DynamicNamed(_) => TemplateFlags::NAMED | TemplateFlags::DYNAMIC,
        DimExpr::Dynamic => TemplateFlags::DYNAMIC,
        DimExpr::Wildcard => TemplateFlags::WILDCARD,
        DimExpr::Ellipsis => TemplateFlags::ELLIPSIS,
        DimExpr::Op { left, right, .. } => {
            TemplateFlags::ARITHMETIC | entry_flags(left) | entry_flags(right)
        }
    }
}

// --- Template ----------------------------------------------------------------

/// A parsed shape template.
///
/// Built by [`crate::parser::parse`] (or `str::parse`), which guarantees at
/// most one ellipsis and keeps wildcards out of arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeTemplate {
    entries: Vec<DimExpr>,
    /// Index of the ellipsis in `entries`, if present.
    ellipsis_at: Option<usize>,
    flags: TemplateFlags,
}

impl ShapeTemplate {
    pub(crate) fn from_entries(entries: Vec<DimExpr>) -> Self {
        let ellipsis_at = entries.iter().position(|entry| matches!(entry, DimExpr::Ellipsis));
        let flags = entries
            .iter()
            .fold(TemplateFlags::empty(), |acc, entry| acc | entry_flags(entry));
        ShapeTemplate {
            entries,
            ellipsis_at,
            flags,
        }
    }

    /// Number of template slots, the ellipsis included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Templates are never empty; parsing rejects empty input. Kept for
    /// symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[DimExpr] {
        &self.entries
    }

    pub fn has_ellipsis(&self) -> bool {
        self.ellipsis_at.is_some()
    }

    pub fn flags(&self) -> TemplateFlags {
        self.flags
    }

    /// Entries before the ellipsis; the whole template if there is none.
    pub fn left_entries(&self) -> &[DimExpr] {
        match self.ellipsis_at {
            Some(idx) => &self.entries[..idx],
            None => &self.entries,
        }
    }

    /// Entries after the ellipsis; empty if there is none.
    pub fn right_entries(&self) -> &[DimExpr] {
        match self.ellipsis_at {
            Some(idx) => &self.entries[idx + 1..],
            None => &[],
        }
    }

    /// Can `shape` even have the right number of dimensions?
    ///
    /// An ellipsis absorbs zero or more positions, so it turns the exact
    /// comparison into a lower bound.
    pub fn rank_matches(&self, shape: &Shape) -> bool {
        if self.has_ellipsis() {
            shape.rank() >= self.entries.len() - 1
        } else {
            shape.rank() == self.entries.len()
        }
    }

    /// Pairs shape positions with template entries.
    ///
    /// Leading positions pair with [`left_entries`](Self::left_entries) from
    /// the front, trailing positions with
    /// [`right_entries`](Self::right_entries) from the back, and whatever
    /// the ellipsis absorbs in between yields no pair at all. Each side zips
    /// independently and stops at the shorter of the two; rank policing is
    /// `rank_matches`' job, not the pairing's.
    fn paired<'t>(&'t self, shape: &'t Shape) -> impl Iterator<Item = (ShapeEntry, &'t DimExpr)> {
        let dims = shape.dims();
        let right_entries = self.right_entries();
        let suffix = &dims[dims.len().saturating_sub(right_entries.len())..];
        let left = dims.iter().copied().zip(self.left_entries());
        let right = suffix.iter().copied().zip(right_entries);
        left.chain(right)
    }

    /// Does `shape` fit this template under `known`, optimistically?
    ///
    /// True unless the rank is off or some paired position *provably*
    /// disagrees. Unbound names prove nothing and so never fail a match.
    pub fn matches(&self, shape: &Shape, known: &KnownDims) -> bool {
        self.rank_matches(shape)
            && !self
                .paired(shape)
                .any(|(entry, dim)| dim.has_conflict(entry, known))
    }

    /// Strictly evaluates every slot to a concrete entry.
    ///
    /// Dynamic slots resolve to absent entries and wildcards to
    /// [`WILDCARD`](crate::WILDCARD); an ellipsis has no fixed expansion and
    /// fails the whole evaluation.
    pub fn evaluate(&self, known: &KnownDims) -> Result<Shape, UnderspecifiedError> {
        if self.flags.contains(TemplateFlags::ELLIPSIS) {
            return Err(UnderspecifiedError::Ellipsis);
        }
        let dims = self
            .entries
            .iter()
            .map(|entry| entry.evaluate(known))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Shape::new(dims))
    }

    /// Best-effort evaluation for diagnostics: slots that cannot resolve
    /// keep their symbolic form instead of failing the caller.
    pub fn partial_evaluate(&self, known: &KnownDims) -> PartialShape {
        PartialShape(
            self.entries
                .iter()
                .map(|entry| match entry.evaluate(known) {
                    Ok(resolved) => PartialDim::Resolved(resolved),
                    Err(_) => PartialDim::Unresolved(entry.clone()),
                })
                .collect(),
        )
    }

    /// Infers sizes for unbound names from `shape`, to a fixpoint.
    ///
    /// Returns only the *newly* discovered bindings; `known` is never
    /// written to. Proposals never contradict `known`, but they can be plain
    /// wrong for a mismatched shape, which is why guarding re-checks
    /// [`matches`](Self::matches) with the merged table afterwards.
    pub fn infer(&self, shape: &Shape, known: &KnownDims) -> KnownDims {
        self.infer_trace(shape, known).0
    }

    /// [`infer`](Self::infer), with a pass-by-pass record of the fixpoint.
    pub fn infer_trace(&self, shape: &Shape, known: &KnownDims) -> (KnownDims, InferTrace) {
        let started = Instant::now();
        let mut trace = InferTrace::default();
        let mut discovered = KnownDims::new();

        // No named entries means nothing can ever be proposed.
        if !self.flags.contains(TemplateFlags::NAMED) {
            trace.total = started.elapsed();
            return (discovered, trace);
        }

        let mut working = known.clone();
        loop {
            let pass_started = Instant::now();
            let mut proposed = KnownDims::new();
            for (entry, dim) in self.paired(shape) {
                proposed.extend(dim.infer(entry, &working));
            }

            let mut bindings: Vec<(String, i64)> =
                proposed.iter().map(|(name, size)| (name.clone(), *size)).collect();
            bindings.sort();
            trace.passes.push(InferPass {
                duration: pass_started.elapsed(),
                proposed: bindings,
            });

            if proposed.is_empty() {
                break;
            }
            log::trace!(
                "inference pass {} proposed {} binding(s)",
                trace.passes.len(),
                proposed.len()
            );
            for (name, size) in proposed {
                working.insert(name.clone(), size);
                discovered.insert(name, size);
            }
        }
        trace.total = started.elapsed();
        log::debug!(
            "inference fixpoint after {} pass(es), {} new binding(s)",
            trace.passes.len(),
            discovered.len()
        );
        (discovered, trace)
    }
}

impl FromStr for ShapeTemplate {
    type Err = ParseError;

    fn from_str(template: &str) -> Result<Self, Self::Err> {
        crate::parser::parse(template)
    }
}

impl fmt::Display for ShapeTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, entry) in self.entries.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

// --- Partial shapes ----------------------------------------------------------

/// One slot of a [`PartialShape`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartialDim {
    /// Resolved to a concrete entry (`None` being a dynamic one).
    Resolved(ShapeEntry),
    /// Could not resolve; the expression is kept for display.
    Unresolved(DimExpr),
}

/// Best-effort evaluation of a template, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialShape(Vec<PartialDim>);

impl PartialShape {
    pub fn entries(&self) -> &[PartialDim] {
        &self.0
    }

    /// True when every slot resolved.
    pub fn is_complete(&self) -> bool {
        self.0
            .iter()
            .all(|slot| matches!(slot, PartialDim::Resolved(_)))
    }
}

impl fmt::Display for PartialShape {
    /// Renders like `[1, (B * 2), ?]`: resolved slots as numbers, dynamic
    /// ones as `?`, unresolved ones in their symbolic form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, slot) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            match slot {
                PartialDim::Resolved(Some(size)) => write!(f, "{size}")?,
                PartialDim::Resolved(None) => f.write_str("?")?,
                PartialDim::Unresolved(expr) => write!(f, "{expr}")?,
            }
        }
        f.write_str("]")
    }
}

// --- Inference metrics -------------------------------------------------------

/// Timing (and proposal record) for a single inference pass.
#[derive(Debug, Default, Clone)]
pub struct InferPass {
    /// Elapsed time for the pass.
    pub duration: Duration,
    /// Bindings the pass proposed, sorted by name.
    pub proposed: Vec<(String, i64)>,
}

/// Pass-by-pass record of one inference run.
///
/// The final, empty pass that stopped the loop is included, so
/// `passes.len()` is always at least one for a template with named entries.
#[derive(Debug, Default, Clone)]
pub struct InferTrace {
    /// Total elapsed time for the fixpoint.
    pub total: Duration,
    /// Every pass in order.
    pub passes: Vec<InferPass>,
}

impl InferTrace {
    /// Total number of bindings proposed across all passes.
    pub fn proposed(&self) -> usize {
        self.passes.iter().map(|pass| pass.proposed.len()).sum()
    }
}
