use std::rc::Rc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tally_ir::{CalcError, Notation, ParseError};

use super::*;
use crate::node::ExprNode;
use crate::quote::Quoted;
use crate::test_support::Fixture;

/// Compiles `name(args)` as a call to another function.
struct Alias(&'static str);

impl SymbolTransition<i64> for Alias {
    fn create_node(
        &self,
        _env: &Environment<i64>,
        _symbol: &str,
        children: Vec<ExprNode<i64>>,
    ) -> CalcResult<ExprNode<i64>> {
        Ok(ExprNode::SymbolCall {
            name: self.0.to_string(),
            args: children,
        })
    }
}

/// Parses its operand in prefix and appends a literal `1`.
struct AppendOne;

impl ModifierTransition<i64> for AppendOne {
    fn target(&self, _current: Notation) -> Notation {
        Notation::Prefix
    }

    fn create_node(&self, _env: &Environment<i64>, child: ExprNode<i64>) -> CalcResult<ExprNode<i64>> {
        Ok(ExprNode::Bracket {
            open: "(".to_string(),
            children: vec![child, ExprNode::Value(1)],
        })
    }
}

#[test]
fn test_same_program_from_every_notation() {
    let fixture = Fixture::new();
    let prefix = fixture.compile(Notation::Prefix, "(+ 1 (* 2 3))").unwrap();
    let infix = fixture.compile(Notation::Infix, "1 + 2 * 3").unwrap();
    let postfix = fixture.compile(Notation::Postfix, "1 2 3 * +").unwrap();
    assert_eq!(prefix, infix);
    assert_eq!(infix, postfix);
}

#[test]
fn test_unconsumed_tokens() {
    let fixture = Fixture::new();
    assert_eq!(
        fixture.compile(Notation::Infix, "1 + 2)").unwrap_err(),
        CalcError::Parse(ParseError::UnconsumedTokens(vec![")".to_string()]))
    );
}

#[test]
fn test_tokenize_errors_propagate() {
    let fixture = Fixture::new();
    for notation in Notation::ALL {
        let err = fixture.compile(notation, "1 ? 2").unwrap_err();
        assert_eq!(err.category(), "tokenize", "{notation}");
    }
}

#[test]
fn test_containers() {
    let mut fixture = Fixture::new();
    fixture.compilers.add_container("{", "sum").unwrap();
    assert_eq!(fixture.postfix(Notation::Infix, "{1, 2, 3}"), "1 2 3 sum@3,1");
    assert_eq!(fixture.postfix(Notation::Prefix, "{1 2}"), "1 2 sum@2,1");
    assert_eq!(fixture.eval(Notation::Infix, "{1, 2, 3} * 2").unwrap(), vec![12]);
    assert!(fixture.compilers.add_container("{", "other").is_err());
}

#[test]
fn test_let_in_container_bracket() {
    let mut fixture = Fixture::new();
    fixture.compilers.add_container("[", "sum").unwrap();
    assert_eq!(fixture.eval(Notation::Infix, "let([a: 4], a)").unwrap(), vec![4]);
}

#[test]
fn test_custom_symbol_transition() {
    let mut fixture = Fixture::new();
    fixture
        .compilers
        .add_symbol_transition(Notation::Infix, "total", Rc::new(Alias("sum")))
        .unwrap();
    assert_eq!(fixture.postfix(Notation::Infix, "total(1, 2)"), "1 2 sum@2,1");
    assert_eq!(fixture.eval(Notation::Infix, "total(1, 2)").unwrap(), vec![3]);
    // only registered for infix
    assert_eq!(fixture.postfix(Notation::Prefix, "(total 1 2)"), "1 2 total@2,1");
    assert!(fixture
        .compilers
        .add_symbol_transition(Notation::Infix, "total", Rc::new(Alias("sum")))
        .is_err());
}

#[test]
fn test_custom_modifier_transition() {
    let mut fixture = Fixture::new();
    fixture
        .compilers
        .add_modifier_transition(Notation::Infix, "~", Rc::new(AppendOne))
        .unwrap();
    assert_eq!(fixture.postfix(Notation::Infix, "2 + ~(* 3 4)"), "2 3 4 * 1 +");
    assert_eq!(
        fixture.compile(Notation::Prefix, "~3").unwrap_err(),
        CalcError::Parse(ParseError::UnsupportedModifier("~".to_string()))
    );
}

/// Counts a quoted form: values count as themselves, symbols by length.
fn weigh(form: Quoted<i64>) -> CalcResult<i64> {
    match form {
        Quoted::Value(value) => Ok(value),
        Quoted::Symbol(text) => Ok(i64::try_from(text.len()).unwrap_or(i64::MAX)),
        Quoted::List(items) => items.into_iter().map(weigh).sum(),
    }
}

fn quoting_fixture() -> Fixture {
    let mut fixture = Fixture::new();
    fixture.compilers.add_quote("#", "quote", Rc::new(weigh)).unwrap();
    fixture
}

#[test]
fn test_quote_in_every_notation() {
    let fixture = quoting_fixture();
    assert_eq!(fixture.postfix(Notation::Infix, "#(1 2 foo)"), "6");
    assert_eq!(fixture.postfix(Notation::Infix, "quote((1, 2)) + 1"), "3 1 +");
    assert_eq!(fixture.postfix(Notation::Prefix, "(quote (1 (2 +)))"), "4");
    assert_eq!(fixture.postfix(Notation::Prefix, "(+ #abc 1)"), "3 1 +");
    assert_eq!(fixture.postfix(Notation::Postfix, "#(1 2) 1 +"), "3 1 +");
    assert_eq!(fixture.postfix(Notation::Postfix, "[#xy 2 *]"), "4");
}

#[test]
fn test_quote_operands_are_not_compiled() {
    let fixture = quoting_fixture();
    assert_eq!(fixture.postfix(Notation::Infix, "#undefined"), "9");
    assert_eq!(fixture.postfix(Notation::Postfix, "# +"), "1");
}

#[test]
fn test_quote_call_takes_one_form() {
    let fixture = quoting_fixture();
    let err = fixture.compile(Notation::Infix, "quote(1, 2)").unwrap_err();
    assert!(matches!(err, CalcError::Parse(ParseError::UnexpectedToken { .. })), "{err:?}");
    let err = fixture.compile(Notation::Postfix, "@#x").unwrap_err();
    assert!(matches!(err, CalcError::Parse(ParseError::UnexpectedToken { .. })), "{err:?}");
}

#[test]
fn test_quote_glyphs_are_exclusive() {
    let mut fixture = quoting_fixture();
    assert!(fixture.compilers.add_quote("#", "other", Rc::new(weigh)).is_err());
    assert!(fixture.compilers.add_quote("@", "other", Rc::new(weigh)).is_err());
    assert!(fixture
        .compilers
        .add_symbol_transition(Notation::Infix, "quote", Rc::new(Alias("sum")))
        .is_err());
}

#[test]
fn test_postfix_has_no_parser_state() {
    let mut fixture = Fixture::new();
    let err = fixture
        .compilers
        .add_symbol_transition(Notation::Postfix, "total", Rc::new(Alias("sum")))
        .unwrap_err();
    assert!(matches!(err, CalcError::Parse(ParseError::MalformedForm { form: "postfix", .. })));
}

#[test]
fn test_operators_exposed() {
    let fixture = Fixture::new();
    assert!(fixture.compilers.operators().binary("+").is_some());
}

#[derive(Clone, Debug)]
enum Tree {
    Leaf(u8),
    Op(char, Box<Tree>, Box<Tree>),
}

impl Tree {
    fn prefix(&self) -> String {
        match self {
            Tree::Leaf(n) => n.to_string(),
            Tree::Op(op, l, r) => format!("({op} {} {})", l.prefix(), r.prefix()),
        }
    }

    fn infix(&self) -> String {
        match self {
            Tree::Leaf(n) => n.to_string(),
            Tree::Op(op, l, r) => format!("({} {op} {})", l.infix(), r.infix()),
        }
    }

    fn postfix(&self) -> String {
        match self {
            Tree::Leaf(n) => n.to_string(),
            Tree::Op(op, l, r) => format!("{} {} {op}", l.postfix(), r.postfix()),
        }
    }
}

fn tree() -> impl Strategy<Value = Tree> {
    (0u8..100).prop_map(Tree::Leaf).prop_recursive(4, 32, 2, |inner| {
        (prop_oneof![Just('+'), Just('-'), Just('*')], inner.clone(), inner)
            .prop_map(|(op, l, r)| Tree::Op(op, Box::new(l), Box::new(r)))
    })
}

proptest! {
    #[test]
    fn prop_notations_agree(tree in tree()) {
        let fixture = Fixture::new();
        let postfix = fixture.compile(Notation::Postfix, &tree.postfix()).unwrap();
        prop_assert_eq!(&fixture.compile(Notation::Prefix, &tree.prefix()).unwrap(), &postfix);
        prop_assert_eq!(&fixture.compile(Notation::Infix, &tree.infix()).unwrap(), &postfix);
        prop_assert_eq!(postfix.to_string(), tree.postfix());
    }
}
