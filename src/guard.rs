//! The stateful dimension table.

use crate::api;
use crate::dim_expr::KnownDims;
use crate::error::ShapeError;
use crate::shape::{HasShape, Shape};

/// A persistent named-dimension table with guarding shortcuts.
///
/// Each successful [`guard`](Self::guard) call folds the bindings it
/// discovered back into the table, so sizes learned from one tensor
/// constrain the next. A failed call leaves the table untouched.
///
/// Not synchronized: share one across threads only behind external locking,
/// or give each worker its own.
///
/// # Example
/// ```
/// use dimguard::ShapeGuard;
///
/// let mut sg = ShapeGuard::new();
/// sg.guard(&[64usize, 32, 32, 3], "B, H, W, C")?;
/// sg.guard(&[64usize, 16, 16, 12], "B, H/2, W/2, C*4")?;
/// assert_eq!(sg.get("H"), Some(32));
/// # Ok::<(), dimguard::ShapeError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ShapeGuard {
    dims: KnownDims,
}

impl ShapeGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from pre-seeded sizes.
    ///
    /// ```
    /// use dimguard::ShapeGuard;
    ///
    /// let sg = ShapeGuard::with_dims([("B", 64), ("C", 3)]);
    /// assert_eq!(sg.get("B"), Some(64));
    /// ```
    pub fn with_dims<S: Into<String>>(dims: impl IntoIterator<Item = (S, i64)>) -> Self {
        ShapeGuard {
            dims: dims.into_iter().map(|(name, size)| (name.into(), size)).collect(),
        }
    }

    /// Guards `x` against `template`, remembering new public bindings.
    pub fn guard(&mut self, x: &impl HasShape, template: &str) -> Result<(), ShapeError> {
        let found = api::guard(x, template, &self.dims)?;
        self.dims.extend(found);
        Ok(())
    }

    /// Checks without failing or remembering anything.
    pub fn matches(&self, x: &impl HasShape, template: &str) -> Result<bool, ShapeError> {
        api::matches(x, template, &self.dims)
    }

    /// Strictly evaluates `template` against the stored table.
    pub fn evaluate(&self, template: &str) -> Result<Shape, ShapeError> {
        api::evaluate(template, &self.dims)
    }

    /// [`evaluate`](Self::evaluate) with one-call overrides shadowing the
    /// stored table. The table itself is not modified.
    pub fn evaluate_with<S: Into<String>>(
        &self,
        template: &str,
        overrides: impl IntoIterator<Item = (S, i64)>,
    ) -> Result<Shape, ShapeError> {
        let mut local = self.dims.clone();
        local.extend(overrides.into_iter().map(|(name, size)| (name.into(), size)));
        api::evaluate(template, &local)
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.dims.get(name).copied()
    }

    pub fn set(&mut self, name: impl Into<String>, size: i64) {
        self.dims.insert(name.into(), size);
    }

    pub fn remove(&mut self, name: &str) -> Option<i64> {
        self.dims.remove(name)
    }

    pub fn dims(&self) -> &KnownDims {
        &self.dims
    }

    /// Number of stored dimensions.
    pub fn len(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dims;

    #[test]
    fn accumulates_bindings_across_guards() {
        let mut sg = ShapeGuard::new();
        sg.guard(&[1usize, 2, 3], "A, B, C").unwrap();
        assert_eq!(sg.dims(), &dims! { "A" => 1, "B" => 2, "C" => 3 });
        sg.guard(&[3usize, 2, 1], "C, B, A").unwrap();
        sg.guard(&[1usize, 2, 7], "A, B, D").unwrap();
        assert_eq!(sg.get("D"), Some(7));
    }

    #[test]
    fn failed_guards_leave_the_table_alone() {
        let mut sg = ShapeGuard::with_dims([("A", 1)]);
        assert!(sg.guard(&[2usize, 5], "A, B").is_err());
        assert_eq!(sg.dims(), &dims! { "A" => 1 });
        assert_eq!(sg.get("B"), None);
    }

    #[test]
    fn downsampling_chain() {
        let mut sg = ShapeGuard::new();
        sg.guard(&[8usize, 32, 32, 3], "B, H, W, C").unwrap();
        sg.guard(&[8usize, 16, 16, 12], "B, H/2, W/2, C*4").unwrap();
        sg.guard(&[8usize, 8, 8, 48], "B, H/4, W/4, C*16").unwrap();
        assert_eq!(sg.get("H"), Some(32));
        assert!(sg.guard(&[8usize, 9, 8, 48], "B, H/4, W/4, C*16").is_err());
    }

    #[test]
    fn set_get_remove() {
        let mut sg = ShapeGuard::new();
        sg.set("B", 64);
        assert_eq!(sg.get("B"), Some(64));
        sg.set("B", 32);
        assert_eq!(sg.get("B"), Some(32));
        assert_eq!(sg.remove("B"), Some(32));
        assert_eq!(sg.remove("B"), None);
        assert_eq!(sg.get("B"), None);
    }

    #[test]
    fn manual_sizes_constrain_guards() {
        let mut sg = ShapeGuard::with_dims([("N", 24), ("Z", 16)]);
        sg.guard(&[24usize, 16], "N, Z").unwrap();
        assert!(sg.guard(&[16usize, 16], "N, Z").is_err());
        sg.set("N", 16);
        sg.guard(&[16usize, 16], "N, Z").unwrap();
    }

    #[test]
    fn evaluate_uses_the_stored_table() {
        let mut sg = ShapeGuard::new();
        sg.guard(&[1usize, 2, 3], "A, B, C").unwrap();
        assert_eq!(
            sg.evaluate("A, B*C"),
            Ok(Shape::new(vec![Some(1), Some(6)]))
        );
        assert!(sg.evaluate("A, Missing").is_err());
    }

    #[test]
    fn evaluate_with_shadows_without_mutating() {
        let sg = ShapeGuard::with_dims([("A", 1), ("B", 2)]);
        assert_eq!(
            sg.evaluate_with("A, B", [("B", 5)]),
            Ok(Shape::new(vec![Some(1), Some(5)]))
        );
        assert_eq!(sg.get("B"), Some(2));
    }

    #[test]
    fn matches_is_read_only() {
        let sg = ShapeGuard::new();
        assert_eq!(sg.matches(&[1usize, 2], "A, B"), Ok(true));
        assert!(sg.dims().is_empty());
    }

    #[test]
    fn private_names_do_not_persist() {
        let mut sg = ShapeGuard::new();
        sg.guard(&[4usize, 4, 2], "_B, _B, C").unwrap();
        assert_eq!(sg.dims(), &dims! { "C" => 2 });
        // A later call is free to see a different private size.
        sg.guard(&[9usize, 9, 2], "_B, _B, C").unwrap();
    }
}
