//! The float dialect: IEEE `f64` arithmetic.
//!
//! Division by zero and domain errors follow IEEE rules and produce
//! infinities or NaN instead of failing.

use std::f64::consts;
use std::rc::Rc;

use tally_eval::{
    accumulator, install_generic_functions, BinaryOperator, Environment, Frame,
    OperatorDictionary, Symbol, UnaryOperator,
};
use tally_ir::{invalid_value, CalcResult, Token};
use tally_lexer::Numeral;
use tally_parse::Compilers;

fn parse_value(token: &Token) -> CalcResult<f64> {
    if !token.kind.is_number() {
        return Err(invalid_value(format_args!("'{token}' is not a number")));
    }
    Ok(Numeral::from_token(token)?.to_f64())
}

#[allow(clippy::cast_precision_loss, reason = "argument counts are small")]
fn average(total: f64, count: usize) -> CalcResult<f64> {
    Ok(total / count as f64)
}

fn operators() -> CalcResult<OperatorDictionary<f64>> {
    let mut ops = OperatorDictionary::new();
    ops.add_binary(BinaryOperator::left("+", 10, |a: f64, b: f64| Ok(a + b)))?;
    ops.add_binary(BinaryOperator::left("-", 10, |a: f64, b: f64| Ok(a - b)))?;
    ops.add_binary(BinaryOperator::left("*", 20, |a: f64, b: f64| Ok(a * b)))?;
    ops.add_binary(BinaryOperator::left("/", 20, |a: f64, b: f64| Ok(a / b)))?;
    ops.add_binary(BinaryOperator::left("%", 20, |a: f64, b: f64| Ok(a % b)))?;
    ops.add_binary(BinaryOperator::right("^", 30, |a: f64, b: f64| Ok(a.powf(b))))?;
    ops.add_binary(BinaryOperator::right("**", 30, |a: f64, b: f64| Ok(a.powf(b))))?;
    // `let` separators only.
    ops.add_binary(BinaryOperator::marker(":", 1))?;
    ops.add_binary(BinaryOperator::marker("=", 1))?;

    ops.add_unary(UnaryOperator::new("-", |a: f64| Ok(-a)))?;
    ops.add_unary(UnaryOperator::new("+", Ok))?;
    ops.add_unary(UnaryOperator::new("neg", |a: f64| Ok(-a)))?;
    ops.set_default_binary("*")?;
    Ok(ops)
}

fn unary_function(name: &'static str, f: fn(f64) -> f64) -> Symbol<f64> {
    Symbol::fixed(name, 1, 1, move |frame: &mut Frame<f64>| {
        let stack = frame.stack_mut();
        let value = stack.pop()?;
        stack.push(f(value));
        Ok(())
    })
}

fn binary_function(name: &'static str, f: fn(f64, f64) -> f64) -> Symbol<f64> {
    Symbol::fixed(name, 2, 1, move |frame: &mut Frame<f64>| {
        let stack = frame.stack_mut();
        let right = stack.pop()?;
        let left = stack.pop()?;
        stack.push(f(left, right));
        Ok(())
    })
}

/// `0` stays `0`; everything else keeps only its sign.
fn sign(value: f64) -> f64 {
    if value == 0.0 {
        value
    } else {
        value.signum()
    }
}

fn install_functions(env: &Environment<f64>) {
    env.set_global_symbol("PI", Symbol::Value(consts::PI));
    env.set_global_symbol("E", Symbol::Value(consts::E));
    env.set_global_symbol("INF", Symbol::Value(f64::INFINITY));

    let unary: [(&'static str, fn(f64) -> f64); 20] = [
        ("abs", f64::abs),
        ("sgn", sign),
        ("sqrt", f64::sqrt),
        ("ceil", f64::ceil),
        ("floor", f64::floor),
        ("sin", f64::sin),
        ("cos", f64::cos),
        ("tan", f64::tan),
        ("asin", f64::asin),
        ("acos", f64::acos),
        ("atan", f64::atan),
        ("sinh", f64::sinh),
        ("cosh", f64::cosh),
        ("tanh", f64::tanh),
        ("log10", f64::log10),
        ("ln", f64::ln),
        ("exp", f64::exp),
        ("rad", f64::to_radians),
        ("deg", f64::to_degrees),
        ("round", f64::round),
    ];
    for (name, f) in unary {
        env.set_global_symbol(name, unary_function(name, f));
    }
    env.set_global_symbol("atan2", binary_function("atan2", f64::atan2));
    env.set_global_symbol("log", binary_function("log", f64::log));

    env.set_global_symbol("min", accumulator("min", 0.0, |a: f64, b: f64| Ok(a.min(b)), |value, _| Ok(value)));
    env.set_global_symbol("max", accumulator("max", 0.0, |a: f64, b: f64| Ok(a.max(b)), |value, _| Ok(value)));
    env.set_global_symbol("sum", accumulator("sum", 0.0, |a: f64, b: f64| Ok(a + b), |value, _| Ok(value)));
    env.set_global_symbol("avg", accumulator("avg", 0.0, |a: f64, b: f64| Ok(a + b), average));
}

/// Compilers and a fresh environment for the float dialect.
#[tracing::instrument(level = "debug")]
pub fn float_dialect() -> CalcResult<(Compilers<f64>, Environment<f64>)> {
    let mut compilers = Compilers::new(Rc::new(operators()?), parse_value)?;
    compilers.add_let("let", &[":", "="])?;
    let env = Environment::new(0.0);
    install_generic_functions(&env);
    install_functions(&env);
    tracing::debug!("float dialect ready");
    Ok((compilers, env))
}
