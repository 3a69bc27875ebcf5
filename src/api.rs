//! Stateless guarding API.
//!
//! Free functions over an explicit [`KnownDims`] table. The stateful
//! [`ShapeGuard`](crate::ShapeGuard) wrapper in `guard.rs` is a thin layer
//! over these; anything it can do, these can do with the table passed in by
//! hand.
//!
//! A guard call runs the pipeline:
//!
//! ```text
//! template text ── parse ──> ShapeTemplate
//!                                │
//!                                ├─ rank check        (hard failure)
//!                                ├─ infer to fixpoint (new bindings)
//!                                └─ re-check with the merged table
//!                                       │
//!                    Ok(new public bindings) / Err(mismatch report)
//! ```
//!
//! [`diagnose`] runs the same pipeline but keeps every intermediate result
//! instead of collapsing them into a verdict.

use crate::dim_expr::KnownDims;
use crate::error::ShapeError;
use crate::shape::{HasShape, Shape};
use crate::template::{InferTrace, PartialShape, ShapeTemplate, TemplateFlags};

/// Names starting with this prefix are inferred for the current call but
/// never handed back for persistence.
///
/// Useful for one-off constraints: `"_B, _B"` asserts two equal axes
/// without committing a table entry to whatever size they happened to have.
pub const PRIVATE_PREFIX: char = '_';

/// Checks `x` against `template` without failing on mismatch.
///
/// Optimistic: unbound names match anything. `Err` only for a malformed
/// template.
///
/// # Example
/// ```
/// use dimguard::{dims, matches};
///
/// let known = dims! { "B" => 2 };
/// assert!(matches(&[1usize, 2], "A, B", &known)?);
/// assert!(!matches(&[1usize, 3], "A, B", &known)?);
/// # Ok::<(), dimguard::ShapeError>(())
/// ```
pub fn matches(x: &impl HasShape, template: &str, known: &KnownDims) -> Result<bool, ShapeError> {
    let spec: ShapeTemplate = template.parse()?;
    Ok(spec.matches(&x.shape(), known))
}

/// Strictly evaluates `template` under `known`.
///
/// Every slot must resolve: unbound names, ellipses and arithmetic over
/// absent entries all fail. Dynamic slots resolve to absent entries,
/// wildcards to [`WILDCARD`](crate::WILDCARD).
///
/// # Example
/// ```
/// use dimguard::{dims, evaluate, Shape};
///
/// let shape = evaluate("B*2, 5", &dims! { "B" => 3 })?;
/// assert_eq!(shape, Shape::new(vec![Some(6), Some(5)]));
/// # Ok::<(), dimguard::ShapeError>(())
/// ```
pub fn evaluate(template: &str, known: &KnownDims) -> Result<Shape, ShapeError> {
    let spec: ShapeTemplate = template.parse()?;
    Ok(spec.evaluate(known)?)
}

/// Guards `x` against `template`: rank check, inference, re-check.
///
/// On success returns the *newly* inferred bindings, minus any name starting
/// with [`PRIVATE_PREFIX`]; merge them into your persistent table, or use
/// [`ShapeGuard`](crate::ShapeGuard) which does that for you. On failure the
/// error carries an expected-vs-actual report and nothing should be
/// persisted.
///
/// # Example
/// ```
/// use dimguard::{dims, guard};
///
/// let known = dims! { "A" => 1 };
/// let found = guard(&[1usize, 2, 4], "A, B, B*2", &known)?;
/// assert_eq!(found, dims! { "B" => 2 });
/// # Ok::<(), dimguard::ShapeError>(())
/// ```
pub fn guard(x: &impl HasShape, template: &str, known: &KnownDims) -> Result<KnownDims, ShapeError> {
    let spec: ShapeTemplate = template.parse()?;
    let shape = x.shape();

    if !spec.rank_matches(&shape) {
        log::debug!("rank mismatch: {shape} against `{template}`");
        return Err(ShapeError::RankMismatch {
            expected: spec.len(),
            actual: shape.rank(),
            template: template.to_string(),
            partial: spec.partial_evaluate(known),
            shape,
        });
    }

    let inferred = spec.infer(&shape, known);
    let mut merged = known.clone();
    merged.extend(inferred.iter().map(|(name, size)| (name.clone(), *size)));

    if !spec.matches(&shape, &merged) {
        log::debug!("shape mismatch: {shape} against `{template}`");
        return Err(ShapeError::Mismatch {
            template: template.to_string(),
            partial: spec.partial_evaluate(known),
            shape,
        });
    }

    Ok(inferred
        .into_iter()
        .filter(|(name, _)| !name.starts_with(PRIVATE_PREFIX))
        .collect())
}

/// Everything a guard call computes, kept for inspection.
///
/// Produced by [`diagnose`]; consumed by the CLI report and handy when a
/// template misbehaves and the boolean verdict is not enough.
#[derive(Debug, Clone)]
pub struct GuardReport {
    /// The parsed template.
    pub template: ShapeTemplate,
    /// Parse-time template traits.
    pub flags: TemplateFlags,
    /// The extracted shape.
    pub shape: Shape,
    /// Did the rank check pass?
    pub rank_ok: bool,
    /// Pass-by-pass inference record.
    pub trace: InferTrace,
    /// Newly inferred bindings, private names included, sorted by name.
    pub inferred: Vec<(String, i64)>,
    /// The final verdict: rank ok and no proven conflict after inference.
    pub matched: bool,
    /// Best-effort expected shape under the pre-call table.
    pub partial: PartialShape,
    /// Fully evaluated shape under the merged table, when possible.
    pub evaluated: Option<Shape>,
}

/// Runs the guard pipeline for inspection instead of a verdict.
///
/// Inference runs even when the rank check fails, so the report always
/// shows what the template *would* have bound. Only a malformed template is
/// an error.
pub fn diagnose(x: &impl HasShape, template: &str, known: &KnownDims) -> Result<GuardReport, ShapeError> {
    let spec: ShapeTemplate = template.parse()?;
    let shape = x.shape();

    let rank_ok = spec.rank_matches(&shape);
    let (inferred_map, trace) = spec.infer_trace(&shape, known);
    let mut merged = known.clone();
    merged.extend(inferred_map.iter().map(|(name, size)| (name.clone(), *size)));
    let matched = spec.matches(&shape, &merged);
    let partial = spec.partial_evaluate(known);
    let evaluated = spec.evaluate(&merged).ok();

    let mut inferred: Vec<(String, i64)> = inferred_map.into_iter().collect();
    inferred.sort();

    Ok(GuardReport {
        flags: spec.flags(),
        template: spec,
        shape,
        rank_ok,
        trace,
        inferred,
        matched,
        partial,
        evaluated,
    })
}
