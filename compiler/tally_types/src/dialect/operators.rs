//! Operator table of the typed dialect.

use std::cmp::Ordering;
use std::rc::Rc;

use tally_eval::OperatorDictionary;
use tally_ir::{invalid_value, CalcError, CalcResult};

use crate::cons::Cons;
use crate::domain::TypeDomain;
use crate::operator::{TypedBinary, TypedUnary};
use crate::value::TypedValue;

fn overflow() -> CalcError {
    invalid_value("integer overflow")
}

fn division_by_zero() -> CalcError {
    invalid_value("division by zero")
}

fn checked(result: Option<i64>) -> CalcResult<i64> {
    result.ok_or_else(overflow)
}

/// Division rounding toward negative infinity.
pub(super) fn floor_div(a: i64, b: i64) -> CalcResult<i64> {
    if b == 0 {
        return Err(division_by_zero());
    }
    let quotient = checked(a.checked_div(b))?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        checked(quotient.checked_sub(1))
    } else {
        Ok(quotient)
    }
}

/// Remainder with the sign of the divisor, matching [`floor_div`].
pub(super) fn floor_mod(a: i64, b: i64) -> CalcResult<i64> {
    if b == 0 {
        return Err(division_by_zero());
    }
    let remainder = checked(a.checked_rem(b))?;
    if remainder != 0 && ((remainder < 0) != (b < 0)) {
        Ok(remainder + b)
    } else {
        Ok(remainder)
    }
}

#[allow(clippy::cast_precision_loss, reason = "true division always yields a float")]
fn true_div(a: i64, b: i64) -> CalcResult<f64> {
    if b == 0 {
        return Err(division_by_zero());
    }
    Ok(a as f64 / b as f64)
}

#[allow(clippy::cast_precision_loss, reason = "negative powers leave the integers")]
fn int_pow(domain: &Rc<TypeDomain>, base: i64, exponent: i64) -> CalcResult<TypedValue> {
    if exponent < 0 {
        return TypedValue::new(domain, (base as f64).powf(exponent as f64));
    }
    let exponent = u32::try_from(exponent).map_err(|_| overflow())?;
    TypedValue::new(domain, checked(base.checked_pow(exponent))?)
}

fn shift(value: i64, by: i64, op: fn(i64, u32) -> Option<i64>) -> CalcResult<i64> {
    let by = u32::try_from(by).map_err(|_| invalid_value("negative shift"))?;
    checked(op(value, by))
}

fn repeat(text: &str, count: i64) -> CalcResult<String> {
    let count = usize::try_from(count).map_err(|_| invalid_value("negative repeat count"))?;
    Ok(text.repeat(count))
}

fn compare_floats(a: f64, b: f64) -> CalcResult<Ordering> {
    a.partial_cmp(&b)
        .ok_or_else(|| invalid_value("NaN can't be ordered"))
}

fn ordering_value(ordering: Ordering) -> i64 {
    match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

/// An ordering test over numbers and strings.
fn comparison(id: &str, test: fn(Ordering) -> bool) -> TypedBinary {
    TypedBinary::left(id, 100)
        .coerced(move |a: &i64, b: &i64| Ok(test(a.cmp(b))))
        .coerced(move |a: &f64, b: &f64| Ok(test(compare_floats(*a, *b)?)))
        .coerced(move |a: &String, b: &String| Ok(test(a.cmp(b))))
}

/// Equality over numbers after coercion, and over anything else as is.
fn equality(id: &str, expected: bool) -> TypedBinary {
    TypedBinary::left(id, 80)
        .coerced(move |a: &i64, b: &i64| Ok((a == b) == expected))
        .coerced(move |a: &f64, b: &f64| Ok((a == b) == expected))
        .fallback(move |domain: &Rc<TypeDomain>, left: &TypedValue, right: &TypedValue| {
            TypedValue::new(domain, (left == right) == expected)
        })
}

fn cons(id: &str, precedence: u32, right: bool) -> TypedBinary {
    let op = if right {
        TypedBinary::right(id, precedence)
    } else {
        TypedBinary::left(id, precedence)
    };
    op.fallback(|domain: &Rc<TypeDomain>, car: &TypedValue, cdr: &TypedValue| {
        TypedValue::new(domain, Cons::new(car.clone(), cdr.clone()))
    })
}

fn binary_operators() -> Vec<TypedBinary> {
    vec![
        TypedBinary::right("**", 170)
            .coerced_value(|domain: &Rc<TypeDomain>, a: &i64, b: &i64| int_pow(domain, *a, *b))
            .coerced(|a: &f64, b: &f64| Ok(a.powf(*b))),
        TypedBinary::left("*", 160)
            .coerced(|a: &i64, b: &i64| checked(a.checked_mul(*b)))
            .coerced(|a: &f64, b: &f64| Ok(a * b))
            .variant(|a: &String, b: &i64| repeat(a, *b))
            .variant(|a: &i64, b: &String| repeat(b, *a)),
        TypedBinary::left("/", 160)
            .coerced(|a: &i64, b: &i64| true_div(*a, *b))
            .coerced(|a: &f64, b: &f64| Ok(a / b)),
        TypedBinary::left("%", 160)
            .coerced(|a: &i64, b: &i64| floor_mod(*a, *b))
            .coerced(|a: &f64, b: &f64| Ok(a - b * (a / b).floor())),
        TypedBinary::left("//", 160)
            .coerced(|a: &i64, b: &i64| floor_div(*a, *b))
            .coerced(|a: &f64, b: &f64| Ok((a / b).floor())),
        TypedBinary::left("+", 150)
            .coerced(|a: &i64, b: &i64| checked(a.checked_add(*b)))
            .coerced(|a: &f64, b: &f64| Ok(a + b))
            .coerced(|a: &String, b: &String| Ok(format!("{a}{b}"))),
        TypedBinary::left("-", 150)
            .coerced(|a: &i64, b: &i64| checked(a.checked_sub(*b)))
            .coerced(|a: &f64, b: &f64| Ok(a - b)),
        TypedBinary::left("<<", 140).coerced(|a: &i64, b: &i64| shift(*a, *b, i64::checked_shl)),
        TypedBinary::left(">>", 140).coerced(|a: &i64, b: &i64| shift(*a, *b, i64::checked_shr)),
        TypedBinary::left("&", 130)
            .coerced(|a: &i64, b: &i64| Ok(a & b))
            .coerced(|a: &bool, b: &bool| Ok(a & b)),
        TypedBinary::left("^", 120)
            .coerced(|a: &i64, b: &i64| Ok(a ^ b))
            .coerced(|a: &bool, b: &bool| Ok(a ^ b)),
        TypedBinary::left("|", 110)
            .coerced(|a: &i64, b: &i64| Ok(a | b))
            .coerced(|a: &bool, b: &bool| Ok(a | b)),
        comparison("<", Ordering::is_lt),
        comparison(">", Ordering::is_gt),
        comparison("<=", Ordering::is_le),
        comparison(">=", Ordering::is_ge),
        TypedBinary::left("<=>", 90)
            .coerced(|a: &i64, b: &i64| Ok(ordering_value(a.cmp(b))))
            .coerced(|a: &f64, b: &f64| Ok(ordering_value(compare_floats(*a, *b)?)))
            .coerced(|a: &String, b: &String| Ok(ordering_value(a.cmp(b)))),
        equality("==", true),
        equality("!=", false),
        TypedBinary::left("&&", 70).fallback(
            |_domain: &Rc<TypeDomain>, left: &TypedValue, right: &TypedValue| {
                Ok(if left.is_truthy()? { right.clone() } else { left.clone() })
            },
        ),
        TypedBinary::left("^^", 60).fallback(
            |domain: &Rc<TypeDomain>, left: &TypedValue, right: &TypedValue| {
                TypedValue::new(domain, left.is_truthy()? != right.is_truthy()?)
            },
        ),
        TypedBinary::left("||", 50).fallback(
            |_domain: &Rc<TypeDomain>, left: &TypedValue, right: &TypedValue| {
                Ok(if left.is_truthy()? { left.clone() } else { right.clone() })
            },
        ),
        cons(":", 40, true),
        cons("=", 10, false),
    ]
}

fn negation(id: &str) -> TypedUnary {
    TypedUnary::new(id)
        .variant(|a: &i64| checked(a.checked_neg()))
        .variant(|a: &f64| Ok(-a))
}

fn unary_operators() -> Vec<TypedUnary> {
    vec![
        negation("-"),
        negation("neg"),
        TypedUnary::new("+")
            .variant(|a: &i64| Ok(*a))
            .variant(|a: &f64| Ok(*a)),
        TypedUnary::new("!").fallback(|domain: &Rc<TypeDomain>, value: &TypedValue| {
            TypedValue::new(domain, !value.is_truthy()?)
        }),
        TypedUnary::new("~")
            .variant(|a: &i64| Ok(!a))
            .variant(|a: &bool| Ok(!a)),
    ]
}

/// Every operator of the dialect; juxtaposition multiplies.
pub(super) fn dictionary(domain: &Rc<TypeDomain>) -> CalcResult<OperatorDictionary<TypedValue>> {
    let mut operators = OperatorDictionary::new();
    for op in binary_operators() {
        operators.add_binary(op.build(domain)?)?;
    }
    for op in unary_operators() {
        operators.add_unary(op.build(domain)?)?;
    }
    operators.set_default_binary("*")?;
    Ok(operators)
}
