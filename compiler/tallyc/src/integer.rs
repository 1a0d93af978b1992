//! The integer dialect: checked `i64` arithmetic.

use std::rc::Rc;

use tally_eval::{
    accumulator, install_generic_functions, BinaryOperator, Environment, Frame,
    OperatorDictionary, Symbol, UnaryOperator,
};
use tally_ir::{invalid_value, CalcError, CalcResult, ParseError, Token};
use tally_lexer::Numeral;
use tally_parse::Compilers;

fn overflow() -> CalcError {
    invalid_value("integer overflow")
}

fn checked(result: Option<i64>) -> CalcResult<i64> {
    result.ok_or_else(overflow)
}

fn nonzero(divisor: i64) -> CalcResult<i64> {
    if divisor == 0 {
        Err(invalid_value("division by zero"))
    } else {
        Ok(divisor)
    }
}

fn power(base: i64, exponent: i64) -> CalcResult<i64> {
    let exponent = u32::try_from(exponent)
        .map_err(|_| invalid_value(format_args!("negative exponent {exponent}")))?;
    checked(base.checked_pow(exponent))
}

fn shift_amount(by: i64) -> CalcResult<u32> {
    u32::try_from(by).map_err(|_| invalid_value("negative shift"))
}

fn gcd(a: i64, b: i64) -> CalcResult<i64> {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    i64::try_from(a).map_err(|_| overflow())
}

fn parse_value(token: &Token) -> CalcResult<i64> {
    if !token.kind.is_number() {
        return Err(invalid_value(format_args!("'{token}' is not an integer")));
    }
    let numeral = Numeral::from_token(token)?;
    if !numeral.is_integer() {
        return Err(invalid_value(format_args!("'{token}' is not an integer")));
    }
    let value = numeral
        .integer_value()
        .ok_or_else(|| ParseError::InvalidNumber {
            literal: token.text.clone(),
            reason: "too large for a 64-bit integer".to_string(),
        })?;
    Ok(value)
}

fn operators() -> CalcResult<OperatorDictionary<i64>> {
    let mut ops = OperatorDictionary::new();
    ops.add_binary(BinaryOperator::left("|", 2, |a: i64, b: i64| Ok(a | b)))?;
    ops.add_binary(BinaryOperator::left("^", 3, |a: i64, b: i64| Ok(a ^ b)))?;
    ops.add_binary(BinaryOperator::left("&", 4, |a: i64, b: i64| Ok(a & b)))?;
    ops.add_binary(BinaryOperator::left("<<", 5, |a: i64, b: i64| {
        checked(a.checked_shl(shift_amount(b)?))
    }))?;
    ops.add_binary(BinaryOperator::left(">>", 5, |a: i64, b: i64| {
        checked(a.checked_shr(shift_amount(b)?))
    }))?;
    ops.add_binary(BinaryOperator::left("+", 10, |a: i64, b: i64| checked(a.checked_add(b))))?;
    ops.add_binary(BinaryOperator::left("-", 10, |a: i64, b: i64| checked(a.checked_sub(b))))?;
    ops.add_binary(BinaryOperator::left("*", 20, |a: i64, b: i64| checked(a.checked_mul(b))))?;
    ops.add_binary(BinaryOperator::left("/", 20, |a: i64, b: i64| {
        checked(a.checked_div(nonzero(b)?))
    }))?;
    ops.add_binary(BinaryOperator::left("%", 20, |a: i64, b: i64| {
        checked(a.checked_rem(nonzero(b)?))
    }))?;
    ops.add_binary(BinaryOperator::right("**", 30, power))?;
    // `let` separators only.
    ops.add_binary(BinaryOperator::marker(":", 1))?;
    ops.add_binary(BinaryOperator::marker("=", 1))?;

    ops.add_unary(UnaryOperator::new("-", |a: i64| checked(a.checked_neg())))?;
    ops.add_unary(UnaryOperator::new("neg", |a: i64| checked(a.checked_neg())))?;
    ops.add_unary(UnaryOperator::new("~", |a: i64| Ok(!a)))?;
    ops.set_default_binary("*")?;
    Ok(ops)
}

fn unary_function(name: &'static str, f: fn(i64) -> CalcResult<i64>) -> Symbol<i64> {
    Symbol::fixed(name, 1, 1, move |frame: &mut Frame<i64>| {
        let stack = frame.stack_mut();
        let value = stack.pop()?;
        stack.push(f(value)?);
        Ok(())
    })
}

fn install_functions(env: &Environment<i64>) {
    env.set_global_symbol("abs", unary_function("abs", |a: i64| checked(a.checked_abs())));
    env.set_global_symbol("sgn", unary_function("sgn", |a: i64| Ok(a.signum())));
    env.set_global_symbol("gcd", accumulator("gcd", 0, gcd, |value, _| Ok(value)));
    env.set_global_symbol("min", accumulator("min", 0, |a: i64, b: i64| Ok(a.min(b)), |value, _| Ok(value)));
    env.set_global_symbol("max", accumulator("max", 0, |a: i64, b: i64| Ok(a.max(b)), |value, _| Ok(value)));
    env.set_global_symbol(
        "sum",
        accumulator("sum", 0, |a: i64, b: i64| checked(a.checked_add(b)), |value, _| Ok(value)),
    );
    env.set_global_symbol(
        "avg",
        accumulator(
            "avg",
            0,
            |a: i64, b: i64| checked(a.checked_add(b)),
            |total: i64, count: usize| {
                let count = i64::try_from(count).map_err(|_| overflow())?;
                checked(total.checked_div(count))
            },
        ),
    );
}

/// Compilers and a fresh environment for the integer dialect.
#[tracing::instrument(level = "debug")]
pub fn integer_dialect() -> CalcResult<(Compilers<i64>, Environment<i64>)> {
    let mut compilers = Compilers::new(Rc::new(operators()?), parse_value)?;
    compilers.add_let("let", &[":", "="])?;
    let env = Environment::new(0);
    install_generic_functions(&env);
    install_functions(&env);
    tracing::debug!("integer dialect ready");
    Ok((compilers, env))
}
