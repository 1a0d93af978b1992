//! Property-based tests across notations.
//!
//! Random arithmetic trees are rendered in prefix, infix and postfix text;
//! all three must compile to the same program and evaluate to the same
//! result, overflow errors included.

#![allow(clippy::unwrap_used, reason = "tests use unwrap to panic on unexpected state")]

use proptest::prelude::*;
use tallyc::{Calculator, Notation};

#[derive(Clone, Debug)]
enum Expr {
    Literal(u8),
    Binary(&'static str, Box<Expr>, Box<Expr>),
}

impl Expr {
    fn prefix(&self) -> String {
        match self {
            Expr::Literal(n) => n.to_string(),
            Expr::Binary(op, left, right) => format!("({op} {} {})", left.prefix(), right.prefix()),
        }
    }

    fn infix(&self) -> String {
        match self {
            Expr::Literal(n) => n.to_string(),
            Expr::Binary(op, left, right) => format!("({} {op} {})", left.infix(), right.infix()),
        }
    }

    fn postfix(&self) -> String {
        match self {
            Expr::Literal(n) => n.to_string(),
            Expr::Binary(op, left, right) => format!("{} {} {op}", left.postfix(), right.postfix()),
        }
    }
}

fn expr_strategy() -> impl Strategy<Value = Expr> {
    let leaf = (0u8..20).prop_map(Expr::Literal);
    leaf.prop_recursive(4, 24, 2, |inner| {
        (
            prop::sample::select(vec!["+", "-", "*", "/", "%", "&", "|", "^"]),
            inner.clone(),
            inner,
        )
            .prop_map(|(op, left, right)| Expr::Binary(op, Box::new(left), Box::new(right)))
    })
}

proptest! {
    #[test]
    fn prop_notations_agree(expr in expr_strategy()) {
        let mut calc = Calculator::integer().unwrap();
        let prefix = calc.compile(Notation::Prefix, &expr.prefix()).unwrap();
        let infix = calc.compile(Notation::Infix, &expr.infix()).unwrap();
        let postfix = calc.compile(Notation::Postfix, &expr.postfix()).unwrap();
        prop_assert_eq!(&prefix, &infix);
        prop_assert_eq!(&infix, &postfix);
        prop_assert_eq!(postfix.to_string(), expr.postfix());

        let expected = calc.execute_and_pop(&postfix);
        calc.clear_global_stack();
        prop_assert_eq!(calc.compile_and_execute(Notation::Prefix, &expr.prefix()), expected.clone());
        calc.clear_global_stack();
        prop_assert_eq!(calc.compile_and_execute(Notation::Infix, &expr.infix()), expected);
    }

    #[test]
    fn prop_typed_int_float_agree(a in -1000i64..1000, b in 1i64..1000) {
        let mut calc = Calculator::typed().unwrap();
        let ints = calc.compile_and_execute(Notation::Infix, &format!("{a} + {b}")).unwrap().unwrap();
        prop_assert_eq!(ints.type_name(), "int");
        let same = calc
            .compile_and_execute(Notation::Infix, &format!("float({a}) + {b} == $ans"))
            .unwrap()
            .unwrap();
        prop_assert_eq!(same.to_string(), "true");
    }
}
