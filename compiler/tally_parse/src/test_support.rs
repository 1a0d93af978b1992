//! Small integer dialect shared by the parser tests.

#![expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

use std::rc::Rc;

use tally_eval::{
    accumulator, install_generic_functions, BinaryOperator, Environment, OperatorDictionary,
    Program, Symbol, UnaryOperator,
};
use tally_ir::{invalid_value, CalcResult, Notation, Token};
use tally_lexer::Numeral;

use crate::Compilers;

fn parse_int(token: &Token) -> CalcResult<i64> {
    if !token.kind.is_number() {
        return Err(invalid_value(format_args!("not a number: {token}")));
    }
    Numeral::from_token(token)?
        .integer_value()
        .ok_or_else(|| invalid_value(format_args!("not an integer: {token}")))
}

fn operators(with_default: bool) -> OperatorDictionary<i64> {
    let mut ops = OperatorDictionary::new();
    ops.add_binary(BinaryOperator::left("+", 10, |a: i64, b: i64| Ok(a + b)))
        .unwrap();
    ops.add_binary(BinaryOperator::left("-", 10, |a: i64, b: i64| Ok(a - b)))
        .unwrap();
    ops.add_binary(BinaryOperator::left("*", 20, |a: i64, b: i64| Ok(a * b)))
        .unwrap();
    ops.add_binary(BinaryOperator::left("/", 20, |a: i64, b: i64| {
        a.checked_div(b).ok_or_else(|| invalid_value("division by zero"))
    }))
    .unwrap();
    ops.add_binary(BinaryOperator::right("^", 30, |a: i64, b: i64| {
        Ok(a.pow(u32::try_from(b).unwrap()))
    }))
    .unwrap();
    ops.add_binary(BinaryOperator::marker(":", 1)).unwrap();
    ops.add_binary(BinaryOperator::marker("=", 1)).unwrap();
    ops.add_unary(UnaryOperator::new("-", |a: i64| Ok(-a))).unwrap();
    ops.add_unary(UnaryOperator::new("neg", |a: i64| Ok(-a))).unwrap();
    if with_default {
        ops.set_default_binary("*").unwrap();
    }
    ops
}

pub(crate) struct Fixture {
    pub compilers: Compilers<i64>,
    pub env: Environment<i64>,
}

impl Fixture {
    pub fn new() -> Self {
        let mut compilers = Compilers::new(Rc::new(operators(true)), parse_int).unwrap();
        compilers.add_let("let", &[":", "="]).unwrap();
        let env = Environment::new(0);
        install_generic_functions(&env);
        env.set_global_symbol("sum", accumulator("sum", 0, |a, b| Ok(a + b), |v, _| Ok(v)));
        env.set_global_symbol("x", Symbol::Value(5));
        Fixture { compilers, env }
    }

    /// Without the juxtaposition operator or `let`.
    pub fn without_default() -> Self {
        Fixture {
            compilers: Compilers::new(Rc::new(operators(false)), parse_int).unwrap(),
            env: Environment::new(0),
        }
    }

    pub fn compile(&self, notation: Notation, text: &str) -> CalcResult<Program<i64>> {
        self.compilers.compile(notation, text, &self.env)
    }

    /// Compiled program rendered as postfix text.
    pub fn postfix(&self, notation: Notation, text: &str) -> String {
        self.compile(notation, text).unwrap().to_string()
    }

    /// Compile and run in a scratch frame.
    pub fn eval(&self, notation: Notation, text: &str) -> CalcResult<Vec<i64>> {
        let program = self.compile(notation, text)?;
        self.env.execute_isolated(&program)
    }
}
