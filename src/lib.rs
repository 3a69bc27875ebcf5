//! Shape templates for tensor code.
//!
//! Templates like `"A, B*2, A+C"` describe what a shape should look like;
//! guarding a concrete shape against one checks every position, fills in
//! named sizes it can deduce, and remembers them for later calls.
//!
//! ```
//! use dimguard::ShapeGuard;
//!
//! let mut sg = ShapeGuard::new();
//! sg.guard(&[64usize, 128, 12], "B, S, H")?;
//! sg.guard(&[64usize, 128, 128], "B, S, S")?;
//! assert!(sg.guard(&[64usize, 100], "B, S").is_err());
//! assert_eq!(sg.get("S"), Some(128));
//! # Ok::<(), dimguard::ShapeError>(())
//! ```

extern crate self as dimguard;

#[macro_use]
mod macros;
mod api;
mod dim_expr;
mod error;
mod guard;
mod parser;
mod shape;
mod template;

pub use api::{GuardReport, PRIVATE_PREFIX, diagnose, evaluate, guard, matches};
pub use dim_expr::{DimExpr, DimOp, KnownDims, WILDCARD};
pub use error::{ParseError, ShapeError, UnderspecifiedError};
pub use guard::ShapeGuard;
pub use parser::parse;
pub use shape::{HasShape, Shape, ShapeEntry};
pub use template::{
    InferPass, InferTrace, PartialDim, PartialShape, ShapeTemplate, TemplateFlags,
};
