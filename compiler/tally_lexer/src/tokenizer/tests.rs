use super::*;
use pretty_assertions::assert_eq;
use tally_ir::CalcError;
use proptest::prelude::*;

fn tokens(tokenizer: &Tokenizer, input: &str) -> Vec<Token> {
    tokenizer
        .tokenize(input)
        .collect::<CalcResult<Vec<_>>>()
        .unwrap()
}

fn plain(input: &str) -> Vec<Token> {
    tokens(&Tokenizer::new(), input)
}

fn fails(tokenizer: &Tokenizer, input: &str) -> bool {
    tokenizer.tokenize(input).any(|t| t.is_err())
}

fn tok(kind: TokenKind, text: &str) -> Token {
    Token::new(kind, text)
}

fn dec(text: &str) -> Token {
    tok(TokenKind::DecNumber, text)
}

fn symbol(text: &str) -> Token {
    tok(TokenKind::Symbol, text)
}

fn op(text: &str) -> Token {
    tok(TokenKind::Operator, text)
}

fn modifier(text: &str) -> Token {
    tok(TokenKind::Modifier, text)
}

fn string(text: &str) -> Token {
    tok(TokenKind::String, text)
}

fn with_operators(ops: &[&str]) -> Tokenizer {
    let mut tokenizer = Tokenizer::new();
    for op in ops {
        tokenizer.add_operator(*op);
    }
    tokenizer
}

#[test]
fn test_binary() {
    let bin = |t| tok(TokenKind::BinNumber, t);
    assert_eq!(plain("0b1"), vec![bin("1")]);
    assert_eq!(plain("0b1.0"), vec![bin("1.0")]);
    assert_eq!(plain("0b0_11_00"), vec![bin("0_11_00")]);
    assert_eq!(plain("0b101.00_11"), vec![bin("101.00_11")]);
    assert_eq!(plain("0b10_"), vec![bin("10"), symbol("_")]);
    assert_eq!(plain("0b10.01_"), vec![bin("10.01"), symbol("_")]);
    assert_eq!(plain("0b_11"), vec![dec("0"), symbol("b_11")]);
    assert_eq!(plain("0_b11"), vec![dec("0"), symbol("_b11")]);
}

#[test]
fn test_octal() {
    let oct = |t| tok(TokenKind::OctNumber, t);
    assert_eq!(plain("00"), vec![oct("0")]);
    assert_eq!(plain("0123"), vec![oct("123")]);
    assert_eq!(plain("01__23"), vec![oct("1__23")]);
    assert_eq!(plain("01_3.2_3"), vec![oct("1_3.2_3")]);
    assert_eq!(plain("012_"), vec![oct("12"), symbol("_")]);
    assert_eq!(plain("012.32_"), vec![oct("12.32"), symbol("_")]);
    assert_eq!(plain("0_123"), vec![oct("_123")]);
}

#[test]
fn test_decimal() {
    assert_eq!(plain("0"), vec![dec("0")]);
    assert_eq!(plain("1.0"), vec![dec("1.0")]);
    assert_eq!(plain("1_23_45"), vec![dec("1_23_45")]);
    assert_eq!(plain("123.2__3"), vec![dec("123.2__3")]);
    assert_eq!(plain("12_"), vec![dec("12"), symbol("_")]);
    assert_eq!(plain("12.32_"), vec![dec("12.32"), symbol("_")]);

    let tokenizer = Tokenizer::new();
    assert!(fails(&tokenizer, "_12.32"));
    assert!(fails(&tokenizer, "12_.32"));
    assert!(fails(&tokenizer, "12._32"));
}

#[test]
fn test_hexadecimal() {
    let hex = |t| tok(TokenKind::HexNumber, t);
    assert_eq!(plain("0x0.0"), vec![hex("0.0")]);
    assert_eq!(plain("0xDEAD"), vec![hex("DEAD")]);
    assert_eq!(plain("0xf00d"), vec![hex("f00d")]);
    assert_eq!(plain("0x123.2C_C5"), vec![hex("123.2C_C5")]);
    assert_eq!(plain("0x12_"), vec![hex("12"), symbol("_")]);
    assert_eq!(plain("0x_12"), vec![dec("0"), symbol("x_12")]);
    assert_eq!(plain("0_x12"), vec![dec("0"), symbol("_x12")]);
}

#[test]
fn test_quoted() {
    let quoted = |t| tok(TokenKind::QuotedNumber, t);
    assert_eq!(plain("0#0"), vec![quoted("0#0")]);
    assert_eq!(plain("12#'3''4'"), vec![quoted("12#'3''4'")]);
    assert_eq!(plain("12#'3\"4'"), vec![quoted("12#'3\"4'")]);
    assert_eq!(plain("432#12dZsd3"), vec![quoted("432#12dZsd3")]);
    assert_eq!(plain("14#1_A.2_B"), vec![quoted("14#1_A.2_B")]);
    assert_eq!(plain("14#12_"), vec![quoted("14#12"), symbol("_")]);

    let tokenizer = Tokenizer::new();
    assert!(fails(&tokenizer, "_14#12"));
    assert!(fails(&tokenizer, "14_#12"));
}

#[test]
fn test_strings() {
    assert_eq!(plain("''"), vec![string("")]);
    assert_eq!(plain("\"abc\""), vec![string("abc")]);
    assert_eq!(plain("'a''b'"), vec![string("a"), string("b")]);
    assert_eq!(plain("'a'\"b\""), vec![string("a"), string("b")]);
    assert_eq!(plain("'aaaa'bbbb"), vec![string("aaaa"), symbol("bbbb")]);
    assert_eq!(plain("bbbb'aaaa'"), vec![symbol("bbbb"), string("aaaa")]);
}

#[test]
fn test_unterminated_string() {
    let err = Tokenizer::new().tokenize("1 'abc").nth(1).unwrap().unwrap_err();
    assert_eq!(
        err,
        CalcError::from(TokenizeError::UnterminatedString {
            partial: "abc".to_string()
        })
    );
}

#[test]
fn test_symbols_and_constants() {
    assert_eq!(plain("hi_world"), vec![symbol("hi_world")]);
    assert_eq!(plain("$boom_2"), vec![symbol("$boom_2")]);
    assert_eq!(plain("$HELLO"), vec![symbol("$HELLO")]);
    assert_eq!(plain("_C"), vec![symbol("_C")]);
    assert_eq!(plain("HelloWorld"), vec![symbol("HelloWorld")]);
    assert_eq!(plain("HELLO"), vec![tok(TokenKind::Constant, "HELLO")]);
    assert_eq!(plain("PI_2"), vec![tok(TokenKind::Constant, "PI_2")]);
}

#[test]
fn test_symbols_with_args() {
    let args = |t| tok(TokenKind::SymbolWithArgs, t);
    assert_eq!(plain("hello@2"), vec![args("hello@2")]);
    assert_eq!(plain("hello@,2"), vec![args("hello@,2")]);
    assert_eq!(plain("hello@2,"), vec![args("hello@2,")]);
    assert_eq!(plain("hello@,"), vec![args("hello@,")]);
    assert_eq!(plain("hello@12,345"), vec![args("hello@12,345")]);
    assert_eq!(plain("$1@3"), vec![args("$1@3")]);

    let tokenizer = with_operators(&["+"]);
    assert_eq!(
        tokens(&tokenizer, "$ans@3,4+6"),
        vec![args("$ans@3,4"), op("+"), dec("6")]
    );
}

#[test]
fn test_read_modifier_next_to_counts() {
    let mut tokenizer = Tokenizer::new();
    tokenizer.add_modifier("@");
    assert_eq!(
        tokens(&tokenizer, "@foo foo@2"),
        vec![
            modifier("@"),
            symbol("foo"),
            tok(TokenKind::SymbolWithArgs, "foo@2")
        ]
    );
    assert_eq!(tokens(&tokenizer, "@2"), vec![modifier("@"), dec("2")]);
}

#[test]
fn test_common_prefix_operators() {
    let tokenizer = with_operators(&["+", "++"]);
    assert_eq!(tokens(&tokenizer, "1++2"), vec![dec("1"), op("++"), dec("2")]);
    assert_eq!(tokens(&tokenizer, "1+2"), vec![dec("1"), op("+"), dec("2")]);
}

#[test]
fn test_postfix_symbols() {
    assert_eq!(plain("1i"), vec![dec("1"), symbol("i")]);
    assert_eq!(
        plain("0x1i"),
        vec![tok(TokenKind::HexNumber, "1"), symbol("i")]
    );
}

#[test]
fn test_mixed_operators() {
    let tokenizer = with_operators(&["+", "-"]);
    assert_eq!(
        tokens(&tokenizer, "'abc'-0x1+0b1-16#4324-$1+3.4"),
        vec![
            string("abc"),
            op("-"),
            tok(TokenKind::HexNumber, "1"),
            op("+"),
            tok(TokenKind::BinNumber, "1"),
            op("-"),
            tok(TokenKind::QuotedNumber, "16#4324"),
            op("-"),
            symbol("$1"),
            op("+"),
            dec("3.4"),
        ]
    );
}

#[test]
fn test_alpha_operator_vs_symbol() {
    let tokenizer = with_operators(&["neg"]);
    assert_eq!(tokens(&tokenizer, "neg"), vec![op("neg")]);
    assert_eq!(tokens(&tokenizer, "neg negate"), vec![op("neg"), symbol("negate")]);
    assert_eq!(tokens(&tokenizer, "negate"), vec![symbol("negate")]);
}

#[test]
fn test_alpha_modifier_vs_symbol() {
    let mut tokenizer = Tokenizer::new();
    tokenizer.add_modifier("not");
    assert_eq!(tokens(&tokenizer, "not here"), vec![modifier("not"), symbol("here")]);
}

#[test]
fn test_partially_alpha_operators() {
    let tokenizer = with_operators(&["++x"]);
    assert_eq!(
        tokens(&tokenizer, "hello++xworld"),
        vec![symbol("hello"), op("++x"), symbol("world")]
    );

    let tokenizer = with_operators(&["x++"]);
    assert_eq!(tokens(&tokenizer, "5x++6"), vec![dec("5"), op("x++"), dec("6")]);
    assert_eq!(
        tokens(&tokenizer, "hello x++world"),
        vec![symbol("hello"), op("x++"), symbol("world")]
    );
}

#[test]
fn test_same_prefix_operators() {
    let tokenizer = with_operators(&["++a", "++"]);
    assert_eq!(tokens(&tokenizer, "++abc"), vec![op("++a"), symbol("bc")]);
    assert_eq!(tokens(&tokenizer, "++ abc"), vec![op("++"), symbol("abc")]);
}

#[test]
fn test_modifier_over_operator() {
    let mut tokenizer = with_operators(&["++"]);
    tokenizer.add_modifier("++");
    tokenizer.add_operator("++");
    assert_eq!(tokens(&tokenizer, "++"), vec![modifier("++")]);

    let mut tokenizer = with_operators(&["+"]);
    tokenizer.add_modifier("++");
    assert_eq!(tokens(&tokenizer, "+ +"), vec![op("+"), op("+")]);
    assert_eq!(tokens(&tokenizer, "+++"), vec![modifier("++"), op("+")]);
}

#[test]
fn test_whitespace_and_brackets() {
    let tokenizer = with_operators(&["+"]);
    assert_eq!(
        tokens(&tokenizer, "\t1\t+\t2\t"),
        vec![dec("1"), op("+"), dec("2")]
    );
    assert_eq!(
        tokens(&tokenizer, " ( 1 , [0x2] ) "),
        vec![
            tok(TokenKind::LeftBracket, "("),
            dec("1"),
            tok(TokenKind::Separator, ","),
            tok(TokenKind::LeftBracket, "["),
            tok(TokenKind::HexNumber, "2"),
            tok(TokenKind::RightBracket, "]"),
            tok(TokenKind::RightBracket, ")"),
        ]
    );
}

#[test]
fn test_unknown_token_names_remaining_input() {
    let result: CalcResult<Vec<Token>> = Tokenizer::new().tokenize("1 ?? 2").collect();
    assert_eq!(
        result,
        Err(CalcError::from(TokenizeError::UnknownToken {
            remaining: "?? 2".to_string()
        }))
    );
}

#[test]
fn test_stream_stops_after_error() {
    let tokenizer = Tokenizer::new();
    let mut stream = tokenizer.tokenize("? 1");
    assert!(stream.next().unwrap().is_err());
    assert!(stream.next().is_none());
}

#[test]
fn test_peek_does_not_consume() {
    let tokenizer = Tokenizer::new();
    let mut stream = tokenizer.tokenize("a b");
    assert_eq!(stream.peek().unwrap(), Some(&symbol("a")));
    assert_eq!(stream.peek().unwrap(), Some(&symbol("a")));
    assert_eq!(stream.next_token().unwrap(), Some(symbol("a")));
    assert_eq!(stream.next_token().unwrap(), Some(symbol("b")));
    assert_eq!(stream.peek().unwrap(), None);
}

proptest! {
    #[test]
    fn prop_decimal_groups_keep_text(groups in prop::collection::vec(("[0-9]{1,4}", "_{0,2}"), 1..5)) {
        let mut text = String::new();
        for (i, (digits, underscores)) in groups.iter().enumerate() {
            if i > 0 {
                text.push_str(underscores);
            }
            text.push_str(digits);
        }
        prop_assume!(!text.starts_with('0') || text.len() == 1);
        prop_assert_eq!(plain(&text), vec![dec(&text)]);
    }
}
