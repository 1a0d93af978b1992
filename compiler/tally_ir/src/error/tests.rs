use super::*;

#[test]
fn test_tokenize_error_wraps() {
    let err: CalcError = TokenizeError::UnknownToken {
        remaining: "?x".to_string(),
    }
    .into();
    assert_eq!(err.to_string(), "tokenize error: unknown token at '?x'");
    assert_eq!(err.category(), "tokenize");
}

#[test]
fn test_unmatched_brackets_names_both_sides() {
    let err: CalcError = ParseError::UnmatchedBrackets {
        open: "(".to_string(),
        close: "]".to_string(),
    }
    .into();
    assert_eq!(err.to_string(), "parse error: unmatched brackets: '(' and ']'");
}

#[test]
fn test_unconsumed_tokens_lists_them() {
    let err = ParseError::UnconsumedTokens(vec!["2".to_string(), "+".to_string()]);
    assert_eq!(err.to_string(), "unconsumed tokens: 2 +");
}

#[test]
fn test_execution_message() {
    assert_eq!(CalcError::Execution(None).to_string(), "execution failed");
    assert_eq!(
        CalcError::Execution(Some("boom".to_string())).to_string(),
        "execution failed: boom"
    );
}

#[test]
fn test_constructors() {
    assert_eq!(unknown_symbol("x"), CalcError::UnknownSymbol("x".to_string()));
    assert_eq!(
        arity_mismatch("argument(s)", "swap", 2, 1),
        CalcError::StackValidation("'swap' expects 2 argument(s), got 1".to_string())
    );
    assert_eq!(stack_underflow("empty").category(), "underflow");
    assert_eq!(ambiguous_dispatch("a, b").category(), "ambiguous");
    assert_eq!(dispatch_failed("x").category(), "dispatch");
    assert_eq!(invalid_value("nope").to_string(), "type error: nope");
    assert_eq!(stack_validation("bad").to_string(), "stack validation failed: bad");
}
