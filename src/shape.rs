//! Concrete shapes and the extraction seam toward host tensor types.

use std::fmt;

/// One position of a concrete shape: a size, or `None` when the host
/// reports no fixed size for that axis (a dynamic dimension).
pub type ShapeEntry = Option<i64>;

/// A concrete shape, as extracted from some host object.
///
/// Entries are signed so that template evaluation can hand back sentinel
/// values (a wildcard renders as `-1`, matching the reshape convention of
/// most tensor hosts) without a separate result type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Shape {
    dims: Vec<ShapeEntry>,
}

impl Shape {
    pub fn new(dims: Vec<ShapeEntry>) -> Self {
        Shape { dims }
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    pub fn dims(&self) -> &[ShapeEntry] {
        &self.dims
    }
}

impl fmt::Display for Shape {
    /// Renders like `[2, ?, 8]`, with `?` for dynamic entries.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, entry) in self.dims.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            match entry {
                Some(size) => write!(f, "{size}")?,
                None => f.write_str("?")?,
            }
        }
        f.write_str("]")
    }
}

/// Anything that can report its shape.
///
/// This is the seam host tensor crates implement for their tensor types.
/// Slices and vectors of plain sizes are covered out of the box, so tests
/// and scripts can guard literal shapes directly. An unsupported input is a
/// compile error rather than a runtime type error.
pub trait HasShape {
    fn shape(&self) -> Shape;
}

impl HasShape for Shape {
    fn shape(&self) -> Shape {
        self.clone()
    }
}

impl<T: HasShape + ?Sized> HasShape for &T {
    fn shape(&self) -> Shape {
        (**self).shape()
    }
}

macro_rules! impl_has_shape {
    ($($elem:ty => $to_entry:expr;)+) => {
        $(
            impl HasShape for [$elem] {
                fn shape(&self) -> Shape {
                    Shape::new(self.iter().map($to_entry).collect())
                }
            }

            impl HasShape for Vec<$elem> {
                fn shape(&self) -> Shape {
                    self.as_slice().shape()
                }
            }

            impl<const N: usize> HasShape for [$elem; N] {
                fn shape(&self) -> Shape {
                    self.as_slice().shape()
                }
            }
        )+
    };
}

impl_has_shape! {
    usize => |d| Some(*d as i64);
    i64 => |d| Some(*d);
    ShapeEntry => |d| *d;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_plain_sizes() {
        assert_eq!([2usize, 3, 4].shape().dims(), &[Some(2), Some(3), Some(4)]);
        assert_eq!(vec![7i64].shape().rank(), 1);
        assert_eq!(Vec::<usize>::new().shape(), Shape::default());
    }

    #[test]
    fn extracts_dynamic_entries() {
        let shape = [None, Some(2), Some(3)].shape();
        assert_eq!(shape.rank(), 3);
        assert_eq!(shape.dims()[0], None);
    }

    #[test]
    fn reference_passthrough() {
        let shape = Shape::new(vec![Some(1), None]);
        assert_eq!((&shape).shape(), shape);
        assert_eq!((&[1usize, 2]).shape(), [1usize, 2].shape());
    }

    #[test]
    fn display_marks_dynamic_entries() {
        assert_eq!(Shape::new(vec![Some(2), None, Some(8)]).to_string(), "[2, ?, 8]");
        assert_eq!(Shape::default().to_string(), "[]");
    }
}
