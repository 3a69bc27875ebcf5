use crate::dim_expr::{DimExpr, DimOp};
use crate::error::ParseError;
use crate::parser::parse;

fn entries(template: &str) -> Vec<DimExpr> {
    match parse(template) {
        Ok(parsed) => parsed.entries().to_vec(),
        Err(err) => panic!("`{template}` should parse: {err}"),
    }
}

fn op(op: DimOp, left: DimExpr, right: DimExpr) -> DimExpr {
    DimExpr::op(op, left, right)
}

#[test]
fn parses_atoms() {
    // Array of (input, expected single entry)
    let cases: Vec<(&str, DimExpr)> = vec![
        ("3", DimExpr::Fixed(3)),
        ("0", DimExpr::Fixed(0)),
        ("batch", DimExpr::named("batch")),
        ("B", DimExpr::named("B")),
        ("_private", DimExpr::named("_private")),
        ("He2Llo_", DimExpr::named("He2Llo_")),
        ("B?", DimExpr::dynamic_named("B")),
        ("B ?", DimExpr::dynamic_named("B")),
        ("?", DimExpr::Dynamic),
        ("*", DimExpr::Wildcard),
        ("...", DimExpr::Ellipsis),
        ("(B)", DimExpr::named("B")),
    ];
    for (input, expected) in cases {
        assert_eq!(entries(input), vec![expected], "input: `{input}`");
    }
}

#[test]
fn parses_comma_lists_ignoring_whitespace() {
    let expected = vec![DimExpr::named("A"), DimExpr::named("B"), DimExpr::Fixed(3)];
    for input in ["A,B,3", "A, B, 3", "  A ,\tB ,3  ", "A,B,3 "] {
        assert_eq!(entries(input), expected, "input: `{input}`");
    }
}

#[test]
fn parses_arithmetic_with_precedence() {
    let cases: Vec<(&str, DimExpr)> = vec![
        (
            "B*2",
            op(DimOp::Mul, DimExpr::named("B"), DimExpr::Fixed(2)),
        ),
        (
            "2*B",
            op(DimOp::Mul, DimExpr::Fixed(2), DimExpr::named("B")),
        ),
        (
            "A+C",
            op(DimOp::Add, DimExpr::named("A"), DimExpr::named("C")),
        ),
        (
            "B/2",
            op(DimOp::Div, DimExpr::named("B"), DimExpr::Fixed(2)),
        ),
        (
            "B-1",
            op(DimOp::Sub, DimExpr::named("B"), DimExpr::Fixed(1)),
        ),
        // * binds tighter than +: A + (C * 2).
        (
            "A+C*2",
            op(
                DimOp::Add,
                DimExpr::named("A"),
                op(DimOp::Mul, DimExpr::named("C"), DimExpr::Fixed(2)),
            ),
        ),
        // Left associative: (A + (C * 2)) + 1.
        (
            "A+C*2+1",
            op(
                DimOp::Add,
                op(
                    DimOp::Add,
                    DimExpr::named("A"),
                    op(DimOp::Mul, DimExpr::named("C"), DimExpr::Fixed(2)),
                ),
                DimExpr::Fixed(1),
            ),
        ),
        // Same-precedence chain stays left associative: (A - B) - C.
        (
            "A-B-C",
            op(
                DimOp::Sub,
                op(DimOp::Sub, DimExpr::named("A"), DimExpr::named("B")),
                DimExpr::named("C"),
            ),
        ),
        // Parentheses override: (A + C) * 2.
        (
            "(A+C)*2",
            op(
                DimOp::Mul,
                op(DimOp::Add, DimExpr::named("A"), DimExpr::named("C")),
                DimExpr::Fixed(2),
            ),
        ),
        // Dynamic names participate in arithmetic.
        (
            "B?*2",
            op(DimOp::Mul, DimExpr::dynamic_named("B"), DimExpr::Fixed(2)),
        ),
    ];
    for (input, expected) in cases {
        assert_eq!(entries(input), vec![expected], "input: `{input}`");
    }
}

#[test]
fn star_is_multiplication_after_an_atom_only() {
    assert_eq!(entries("*"), vec![DimExpr::Wildcard]);
    assert_eq!(
        entries("2*3"),
        vec![op(DimOp::Mul, DimExpr::Fixed(2), DimExpr::Fixed(3))]
    );
    assert_eq!(
        entries("*, B*2"),
        vec![
            DimExpr::Wildcard,
            op(DimOp::Mul, DimExpr::named("B"), DimExpr::Fixed(2)),
        ]
    );
}

#[test]
fn parses_full_templates() {
    assert_eq!(
        entries("A, B*2, ..., C?"),
        vec![
            DimExpr::named("A"),
            op(DimOp::Mul, DimExpr::named("B"), DimExpr::Fixed(2)),
            DimExpr::Ellipsis,
            DimExpr::dynamic_named("C"),
        ]
    );
}

#[test]
fn rejects_malformed_templates() {
    // Array of (input, expected error)
    let cases: Vec<(&str, ParseError)> = vec![
        ("", ParseError::Empty),
        ("   ", ParseError::Empty),
        (
            "A, @",
            ParseError::UnexpectedChar { ch: '@', at: 3 },
        ),
        (
            "A..B",
            ParseError::UnexpectedChar { ch: '.', at: 1 },
        ),
        (
            "1.5",
            ParseError::UnexpectedChar { ch: '.', at: 1 },
        ),
        (
            "A, , B",
            ParseError::UnexpectedToken {
                found: ",".into(),
                expected: "a dimension value",
                at: 3,
            },
        ),
        (
            "A,",
            ParseError::UnexpectedEnd {
                expected: "a dimension value",
            },
        ),
        (
            "A+",
            ParseError::UnexpectedEnd {
                expected: "a dimension value",
            },
        ),
        (
            "A B",
            ParseError::UnexpectedToken {
                found: "B".into(),
                expected: "`,` or end of template",
                at: 2,
            },
        ),
        (
            "A, ..., B, ...",
            ParseError::DuplicateEllipsis { at: 11 },
        ),
        (
            "(A, B)",
            ParseError::UnexpectedToken {
                found: ",".into(),
                expected: "`)`",
                at: 2,
            },
        ),
        (
            "(A",
            ParseError::UnexpectedEnd { expected: "`)`" },
        ),
        // Wildcards and ellipses cannot be operands.
        (
            "2*...",
            ParseError::UnexpectedToken {
                found: "...".into(),
                expected: "a dimension value",
                at: 2,
            },
        ),
        (
            "...*2",
            ParseError::UnexpectedToken {
                found: "*".into(),
                expected: "`,` or end of template",
                at: 3,
            },
        ),
        (
            "(*)",
            ParseError::UnexpectedToken {
                found: "*".into(),
                expected: "a dimension value",
                at: 1,
            },
        ),
        (
            "99999999999999999999",
            ParseError::BadNumber {
                text: "99999999999999999999".into(),
                at: 0,
            },
        ),
    ];
    for (input, expected) in cases {
        match parse(input) {
            Ok(parsed) => panic!("`{input}` should not parse, got `{parsed}`"),
            Err(err) => assert_eq!(err, expected, "input: `{input}`"),
        }
    }
}

#[test]
fn question_mark_binds_to_the_preceding_name() {
    // "C ?" is the dynamic name C?, not C followed by a stray dynamic dim.
    assert_eq!(entries("C ?"), vec![DimExpr::dynamic_named("C")]);
    assert_eq!(
        entries("C, ?"),
        vec![DimExpr::named("C"), DimExpr::Dynamic]
    );
}
