//! Regex-driven template tokenizer.

use crate::error::ParseError;

/// Byte range of a token in the template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Tok {
    Number(i64),
    Ident(String),
    Ellipsis,
    Question,
    Star,
    Slash,
    Plus,
    Minus,
    Comma,
    OpenParen,
    CloseParen,
}

impl Tok {
    /// How the token reads in an error message.
    pub fn describe(&self) -> String {
        match self {
            Tok::Number(value) => value.to_string(),
            Tok::Ident(name) => name.clone(),
            Tok::Ellipsis => "...".to_string(),
            Tok::Question => "?".to_string(),
            Tok::Star => "*".to_string(),
            Tok::Slash => "/".to_string(),
            Tok::Plus => "+".to_string(),
            Tok::Minus => "-".to_string(),
            Tok::Comma => ",".to_string(),
            Tok::OpenParen => "(".to_string(),
            Tok::CloseParen => ")".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Lexeme {
    pub tok: Tok,
    pub span: Span,
}

/// Scans `input` into tokens, skipping whitespace between them.
///
/// Anything the token regex cannot claim surfaces as
/// [`ParseError::UnexpectedChar`] at its byte offset, including lone or
/// doubled dots that fall short of a full `...`.
pub(crate) fn lex(input: &str) -> Result<Vec<Lexeme>, ParseError> {
    let token = crate::regex!(
        r"(?P<number>[0-9]+)|(?P<ident>[A-Za-z_][A-Za-z0-9_]*)|(?P<ellipsis>\.\.\.)|(?P<punct>[?*/+,()-])"
    );

    let mut lexemes = Vec::new();
    let mut scanned_to = 0usize;
    for caps in token.captures_iter(input) {
        // Group 0 always participates in a match.
        let Some(matched) = caps.get(0) else { continue };
        reject_gap(input, scanned_to, matched.start())?;
        scanned_to = matched.end();

        let span = Span {
            start: matched.start(),
            end: matched.end(),
        };
        let tok = if caps.name("number").is_some() {
            let text = matched.as_str();
            let value = text.parse::<i64>().map_err(|_| ParseError::BadNumber {
                text: text.to_string(),
                at: span.start,
            })?;
            Tok::Number(value)
        } else if caps.name("ident").is_some() {
            Tok::Ident(matched.as_str().to_string())
        } else if caps.name("ellipsis").is_some() {
            Tok::Ellipsis
        } else {
            match matched.as_str() {
                "?" => Tok::Question,
                "*" => Tok::Star,
                "/" => Tok::Slash,
                "+" => Tok::Plus,
                "-" => Tok::Minus,
                "," => Tok::Comma,
                "(" => Tok::OpenParen,
                ")" => Tok::CloseParen,
                other => {
                    // The punct class is closed; keep the lexer total anyway.
                    return Err(ParseError::UnexpectedChar {
                        ch: other.chars().next().unwrap_or('?'),
                        at: span.start,
                    });
                }
            }
        };
        lexemes.push(Lexeme { tok, span });
    }
    reject_gap(input, scanned_to, input.len())?;
    Ok(lexemes)
}

fn reject_gap(input: &str, from: usize, to: usize) -> Result<(), ParseError> {
    let gap = &input[from..to];
    match gap.char_indices().find(|(_, ch)| !ch.is_whitespace()) {
        Some((offset, ch)) => Err(ParseError::UnexpectedChar { ch, at: from + offset }),
        None => Ok(()),
    }
}
