//! Template parsing.
//!
//! This module is the only way a [`ShapeTemplate`] comes into existence, so
//! everything downstream can rely on the grammar's guarantees (at most one
//! ellipsis, no ellipsis or wildcard inside arithmetic).
//!
//! Parsing a template string is a two-stage pipeline:
//!
//! ```text
//! "A, B*2, ..."
//!      │
//!      v
//!   lex (lexer.rs)          regex-driven scan into spanned tokens,
//!      │                    whitespace-insensitive, rejects stray bytes
//!      v
//!   Parser (grammar.rs)     recursive descent: comma list of dims,
//!      │                    `+ -` over `* /` over atoms, parens allowed
//!      v
//!   Vec<DimExpr> ── ShapeTemplate::from_entries
//! ```
//!
//! Errors carry byte offsets into the original string; there is no recovery
//! or resynchronization, the first problem wins.

#[path = "parser/grammar.rs"]
mod grammar;
#[path = "parser/lexer.rs"]
mod lexer;

#[cfg(test)]
#[path = "parser/tests.rs"]
mod tests;

use crate::error::ParseError;
use crate::template::ShapeTemplate;

/// Parses template text into a [`ShapeTemplate`].
///
/// Same thing as `template.parse::<ShapeTemplate>()`; this free function is
/// for call sites that already have the type spelled out.
///
/// ```
/// let template = dimguard::parse("A, B*2, A+C")?;
/// assert_eq!(template.len(), 3);
/// # Ok::<(), dimguard::ParseError>(())
/// ```
pub fn parse(template: &str) -> Result<ShapeTemplate, ParseError> {
    let tokens = lexer::lex(template)?;
    let entries = grammar::Parser::new(&tokens).template()?;
    Ok(ShapeTemplate::from_entries(entries))
}
