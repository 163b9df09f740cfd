//! Property-based fuzzing tests for the Risp lexer, parser and evaluator
//!
//! These tests use proptest to generate random inputs and verify that:
//! 1. The lexer and parser never panic on arbitrary input
//! 2. Parsed lists render back with the same nesting
//! 3. Integer arithmetic agrees with native integer arithmetic

use proptest::prelude::*;
use risp::{Interpreter, Scanner, Value};

// =============================================================================
// STRATEGY GENERATORS
// =============================================================================

/// Generate random strings that might break the lexer
fn arbitrary_source_string() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"[\x00-\x7F]{0,500}").unwrap()
}

/// Generate valid-ish S-expressions
fn sexp_like_string() -> impl Strategy<Value = String> {
    prop::collection::vec(sexp_token(), 0..50).prop_map(|tokens| tokens.join(" "))
}

/// Generate tokens that look like S-expression elements
fn sexp_token() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("(".to_string()),
        Just(")".to_string()),
        // Forms
        Just("def".to_string()),
        Just("defun".to_string()),
        Just("if".to_string()),
        Just("case".to_string()),
        Just("_".to_string()),
        // Operators
        Just("+".to_string()),
        Just("-".to_string()),
        Just("*".to_string()),
        Just("/".to_string()),
        Just(">=".to_string()),
        Just("!=".to_string()),
        // Numbers
        (-1000i64..1000i64).prop_map(|n| n.to_string()),
        (0.0f64..100.0f64).prop_map(|f| format!("{:.2}", f)),
        // Strings
        r#""[a-zA-Z0-9 ]{0,20}""#,
        // Identifiers and keywords
        "[a-z][a-z0-9:-]{0,10}",
        ":[a-z]{1,8}",
    ]
}

/// Generate integer expressions paired with their native value
fn int_expr() -> impl Strategy<Value = (String, i128)> {
    let leaf = (-100i64..100i64).prop_map(|n| (n.to_string(), i128::from(n)));
    leaf.prop_recursive(3, 16, 2, |inner| {
        (inner.clone(), inner, prop_oneof![Just('+'), Just('-'), Just('*')]).prop_map(
            |((a, x), (b, y), op)| {
                let value = match op {
                    '+' => x + y,
                    '-' => x - y,
                    _ => x * y,
                };
                (format!("({} {} {})", op, a, b), value)
            },
        )
    })
}

/// Generate well-formed nested lists of identifiers
fn nested_list() -> impl Strategy<Value = String> {
    let leaf = "[a-z]{1,6}";
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(|items| format!("({})", items.join(" ")))
    })
}

// =============================================================================
// LEXER AND PARSER
// =============================================================================

proptest! {
    /// The lexer should never panic on arbitrary input
    #[test]
    fn lexer_never_panics(source in arbitrary_source_string()) {
        let _ = Scanner::new(&source, "fuzz").scan_tokens();
    }

    /// The parser should never panic on whatever the lexer accepts
    #[test]
    fn parser_never_panics_on_valid_tokens(source in sexp_like_string()) {
        if let Ok(tokens) = risp::lex(&source, "fuzz") {
            let _ = risp::parse(tokens);
        }
    }

    /// Unbalanced parentheses are reported, never a panic
    #[test]
    fn parser_handles_unbalanced_parens(opens in 0usize..50, closes in 0usize..50) {
        let source = format!("{}1{}", "(".repeat(opens), ")".repeat(closes));
        let tokens = risp::lex(&source, "fuzz").unwrap();
        let result = risp::parse(tokens);
        prop_assert_eq!(result.is_ok(), opens == closes);
    }

    /// Rendering a parsed list reproduces its nesting
    #[test]
    fn parsed_lists_render_back(source in nested_list()) {
        let tokens = risp::lex(&source, "fuzz").unwrap();
        let nodes = risp::parse(tokens).unwrap();
        let rendered: Vec<String> = nodes.iter().map(|node| node.to_string()).collect();
        prop_assert_eq!(rendered.join(" "), source);
    }
}

// =============================================================================
// EVALUATOR
// =============================================================================

proptest! {
    /// Integer arithmetic agrees with native arithmetic
    #[test]
    fn integer_arithmetic_matches_native((source, expected) in int_expr()) {
        let mut interpreter = Interpreter::new();
        let value = interpreter.eval_source("fuzz", &source).unwrap();
        prop_assert_eq!(value.to_string(), expected.to_string());
    }

    /// Division stays exact: multiplying back recovers the dividend
    #[test]
    fn division_is_exact(a in -10_000i64..10_000, b in 1i64..1000) {
        let mut interpreter = Interpreter::new();
        let source = format!("(* (/ {} {}) {})", a, b, b);
        let value = interpreter.eval_source("fuzz", &source).unwrap();
        prop_assert_eq!(value, Value::integer(a));
    }

    /// Comparisons agree with native ordering
    #[test]
    fn comparison_matches_native(a in -1000i64..1000, b in -1000i64..1000) {
        let mut interpreter = Interpreter::new();
        let value = interpreter.eval_source("fuzz", &format!("(< {} {})", a, b)).unwrap();
        prop_assert_eq!(value, Value::Boolean(a < b));
    }
}

// =============================================================================
// SPECIFIC REGRESSION TESTS
// =============================================================================

#[test]
fn regression_empty_input() {
    let tokens = risp::lex("", "fuzz").unwrap();
    assert!(risp::parse(tokens).unwrap().is_empty());
}

#[test]
fn regression_only_whitespace() {
    let tokens = risp::lex("   \n\t\r\n   ", "fuzz").unwrap();
    assert!(tokens.is_empty());
}

#[test]
fn regression_null_bytes() {
    let tokens = risp::lex("(\0 + 1 2)", "fuzz").unwrap();
    assert_eq!(tokens.len(), 5);
}

#[test]
fn regression_very_long_number() {
    let source = format!("(+ 1 {})", "9".repeat(1000));
    let value = Interpreter::new().eval_source("fuzz", &source).unwrap();
    assert_eq!(value.to_string(), format!("1{}", "0".repeat(1000)));
}

#[test]
fn regression_very_long_string() {
    let source = format!(r#""{}""#, "a".repeat(100_000));
    let tokens = risp::lex(&source, "fuzz").unwrap();
    assert_eq!(tokens[0].lexeme.len(), 100_000);
}

#[test]
fn regression_recursive_definition() {
    // Defining a function that would recurse forever must not call it
    let source = "(defun f (x) (f x))";
    let value = Interpreter::new().eval_source("fuzz", source).unwrap();
    assert_eq!(value.type_name(), "function");
}
