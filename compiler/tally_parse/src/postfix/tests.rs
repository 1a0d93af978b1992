use pretty_assertions::assert_eq;
use tally_eval::Symbol;
use tally_ir::{CalcError, Notation, ParseError};

use crate::test_support::Fixture;

fn postfix(text: &str) -> String {
    Fixture::new().postfix(Notation::Postfix, text)
}

fn eval(text: &str) -> Vec<i64> {
    Fixture::new().eval(Notation::Postfix, text).unwrap()
}

fn error(text: &str) -> CalcError {
    Fixture::new().compile(Notation::Postfix, text).unwrap_err()
}

#[test]
fn test_values_and_operators() {
    assert_eq!(postfix("1 2 3 * +"), "1 2 3 * +");
    assert_eq!(eval("1 2 3 * +"), vec![7]);
}

#[test]
fn test_binary_variant_preferred() {
    assert_eq!(eval("5 3 -"), vec![2]);
    assert_eq!(eval("5 neg"), vec![-5]);
}

#[test]
fn test_symbols_are_called() {
    assert_eq!(postfix("2 dup +"), "2 dup +");
    assert_eq!(eval("2 dup +"), vec![4]);
    assert_eq!(eval("x"), vec![5]);
}

#[test]
fn test_explicit_counts() {
    assert_eq!(postfix("1 2 3 dup@2"), "1 2 3 dup@2");
    assert_eq!(eval("1 2 3 dup@2"), vec![1, 2, 3, 2, 3]);
    assert_eq!(eval("1 2 3 sum@3,1"), vec![6]);
}

#[test]
fn test_malformed_counts() {
    assert_eq!(
        error("dup@99999999999999999999999"),
        CalcError::Parse(ParseError::MalformedCallCounts(
            "dup@99999999999999999999999".to_string()
        ))
    );
}

#[test]
fn test_constants_are_read() {
    let fixture = Fixture::new();
    fixture.env.set_global_symbol("LIMIT", Symbol::Value(100));
    assert_eq!(fixture.postfix(Notation::Postfix, "LIMIT"), "@LIMIT");
    assert_eq!(fixture.eval(Notation::Postfix, "LIMIT 1 +").unwrap(), vec![101]);
}

#[test]
fn test_symbol_get_modifier() {
    assert_eq!(postfix("@x 1 +"), "@x 1 +");
    assert_eq!(eval("@x 1 +"), vec![6]);
}

#[test]
fn test_symbol_get_rejects_non_symbols() {
    assert!(matches!(
        error("@1"),
        CalcError::Parse(ParseError::UnexpectedToken { .. })
    ));
    assert!(matches!(
        error("@[1]"),
        CalcError::Parse(ParseError::UnexpectedToken { .. })
    ));
    assert_eq!(error("1 @"), CalcError::Parse(ParseError::UnfinishedExpression));
}

#[test]
fn test_bracket_folds_at_compile_time() {
    assert_eq!(postfix("[1 2 +] 4"), "3 4");
    assert_eq!(postfix("[1 2 3]"), "1 2 3");
    assert_eq!(postfix("[]"), "");
    assert_eq!(postfix("[[1 2 +] dup]"), "3 3");
}

#[test]
fn test_nested_fold_feeds_outer_fold() {
    assert_eq!(postfix("[1 [2 3 +] *]"), "5");
    assert_eq!(eval("[1 [2 3 +] *] 2 +"), vec![7]);
}

#[test]
fn test_fold_sees_globals_at_compile_time() {
    let fixture = Fixture::new();
    let program = fixture.compile(Notation::Postfix, "[x 2 *]").unwrap();
    fixture.env.set_global_symbol("x", Symbol::Value(100));
    assert_eq!(program.to_string(), "10");
    assert_eq!(fixture.env.execute_isolated(&program).unwrap(), vec![10]);
}

#[test]
fn test_fold_does_not_touch_global_stack() {
    let mut fixture = Fixture::new();
    let seven = fixture.compile(Notation::Postfix, "7").unwrap();
    fixture.env.execute(&seven).unwrap();
    fixture.compile(Notation::Postfix, "[1 2]").unwrap();
    assert_eq!(fixture.env.top_frame().stack().as_slice(), &[7]);
}

#[test]
fn test_fold_errors_surface_at_compile_time() {
    assert_eq!(error("[1 0 /]"), CalcError::Type("division by zero".to_string()));
}

#[test]
fn test_unclosed_fold() {
    assert_eq!(
        error("[1 2"),
        CalcError::Parse(ParseError::UnclosedBracket {
            open: "[".to_string()
        })
    );
}

#[test]
fn test_unsupported_brackets() {
    assert_eq!(
        error("(1 2)"),
        CalcError::Parse(ParseError::UnsupportedBracket("(".to_string()))
    );
    assert_eq!(
        error("[1 2)"),
        CalcError::Parse(ParseError::UnmatchedBrackets {
            open: "[".to_string(),
            close: ")".to_string(),
        })
    );
}

#[test]
fn test_stray_closing_bracket() {
    assert!(matches!(
        error("1 ]"),
        CalcError::Parse(ParseError::UnexpectedToken { .. })
    ));
}

#[test]
fn test_unknown_operator() {
    let fixture = Fixture::without_default();
    let err = fixture.compile(Notation::Postfix, "1 2 /").unwrap_err();
    assert!(matches!(err, CalcError::Tokenize(_)), "{err:?}");
}

#[test]
fn test_strings_go_through_value_parser() {
    assert!(matches!(error("'abc'"), CalcError::Type(_)));
}
