//! Recursive-descent grammar over the token stream.
//!
//! ```text
//! template ::= dim ("," dim)*
//! dim      ::= "..." | "*" | expr
//! expr     ::= term (("+" | "-") term)*
//! term     ::= atom (("*" | "/") atom)*
//! atom     ::= NUMBER | IDENT "?"? | "?" | "(" expr ")"
//! ```
//!
//! `*` is a wildcard only at the start of a dim; after an atom it binds as
//! multiplication. Operators associate left, `* /` over `+ -`, and neither
//! the wildcard nor the ellipsis can appear inside arithmetic.

use super::lexer::{Lexeme, Tok};
use crate::dim_expr::{DimExpr, DimOp};
use crate::error::ParseError;

pub(crate) struct Parser<'t> {
    tokens: &'t [Lexeme],
    pos: usize,
    /// Byte offset of the first ellipsis, once seen.
    ellipsis_at: Option<usize>,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Lexeme]) -> Self {
        Parser {
            tokens,
            pos: 0,
            ellipsis_at: None,
        }
    }

    /// Parses the whole token stream as a template.
    pub fn template(&mut self) -> Result<Vec<DimExpr>, ParseError> {
        if self.tokens.is_empty() {
            return Err(ParseError::Empty);
        }
        let mut entries = vec![self.dim()?];
        while self.eat(&Tok::Comma) {
            entries.push(self.dim()?);
        }
        match self.peek() {
            Some(lexeme) => Err(ParseError::UnexpectedToken {
                found: lexeme.tok.describe(),
                expected: "`,` or end of template",
                at: lexeme.span.start,
            }),
            None => Ok(entries),
        }
    }

    fn dim(&mut self) -> Result<DimExpr, ParseError> {
        match self.peek().map(|lexeme| &lexeme.tok) {
            Some(Tok::Ellipsis) => {
                let at = self.bump().span.start;
                match self.ellipsis_at {
                    Some(_) => Err(ParseError::DuplicateEllipsis { at }),
                    None => {
                        self.ellipsis_at = Some(at);
                        Ok(DimExpr::Ellipsis)
                    }
                }
            }
            Some(Tok::Star) => {
                self.bump();
                Ok(DimExpr::Wildcard)
            }
            _ => self.expr(),
        }
    }

    fn expr(&mut self) -> Result<DimExpr, ParseError> {
        let mut node = self.term()?;
        loop {
            let op = match self.peek().map(|lexeme| &lexeme.tok) {
                Some(Tok::Plus) => DimOp::Add,
                Some(Tok::Minus) => DimOp::Sub,
                _ => break,
            };
            self.bump();
            let rhs = self.term()?;
            node = DimExpr::op(op, node, rhs);
        }
        Ok(node)
    }

    fn term(&mut self) -> Result<DimExpr, ParseError> {
        let mut node = self.atom()?;
        loop {
            let op = match self.peek().map(|lexeme| &lexeme.tok) {
                Some(Tok::Star) => DimOp::Mul,
                Some(Tok::Slash) => DimOp::Div,
                _ => break,
            };
            self.bump();
            let rhs = self.atom()?;
            node = DimExpr::op(op, node, rhs);
        }
        Ok(node)
    }

    fn atom(&mut self) -> Result<DimExpr, ParseError> {
        let Some(lexeme) = self.peek().cloned() else {
            return Err(ParseError::UnexpectedEnd {
                expected: "a dimension value",
            });
        };
        self.bump();
        match lexeme.tok {
            Tok::Number(value) => Ok(DimExpr::Fixed(value)),
            Tok::Ident(name) => {
                if self.eat(&Tok::Question) {
                    Ok(DimExpr::DynamicNamed(name))
                } else {
                    Ok(DimExpr::Named(name))
                }
            }
            Tok::Question => Ok(DimExpr::Dynamic),
            Tok::OpenParen => {
                let inner = self.expr()?;
                match self.peek() {
                    Some(close) if close.tok == Tok::CloseParen => {
                        self.bump();
                        Ok(inner)
                    }
                    Some(other) => Err(ParseError::UnexpectedToken {
                        found: other.tok.describe(),
                        expected: "`)`",
                        at: other.span.start,
                    }),
                    None => Err(ParseError::UnexpectedEnd { expected: "`)`" }),
                }
            }
            other => Err(ParseError::UnexpectedToken {
                found: other.describe(),
                expected: "a dimension value",
                at: lexeme.span.start,
            }),
        }
    }

    // --- Cursor plumbing ---

    fn peek(&self) -> Option<&Lexeme> {
        self.tokens.get(self.pos)
    }

    /// Advances and returns the passed-over lexeme. Callers peek first.
    fn bump(&mut self) -> &Lexeme {
        let lexeme = &self.tokens[self.pos];
        self.pos += 1;
        lexeme
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek().is_some_and(|lexeme| lexeme.tok == *tok) {
            self.bump();
            return true;
        }
        false
    }
}
