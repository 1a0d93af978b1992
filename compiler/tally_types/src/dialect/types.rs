//! Types, conversions and truth of the typed dialect.

use std::any::TypeId;
use std::rc::Rc;

use tally_ir::{CalcResult, ParseError, Token, TokenKind};
use tally_lexer::{escape_string, Numeral};

use crate::cons::{Cons, Null};
use crate::domain::{Coercion, TypeDomain};
use crate::value::TypedValue;

pub(super) fn domain() -> CalcResult<TypeDomain> {
    let mut domain = TypeDomain::new();
    domain.register_type::<i64>("int", |v, f| write!(f, "{v}"))?;
    domain.register_type::<f64>("float", |v, f| write!(f, "{v:?}"))?;
    domain.register_type::<bool>("bool", |v, f| write!(f, "{v}"))?;
    domain.register_type::<String>("str", |v, f| f.write_str(&escape_string(v, '"')))?;
    domain.register_type::<Null>("<null>", |v, f| write!(f, "{v}"))?;
    domain.register_type::<Cons>("cons", |v, f| write!(f, "{v}"))?;

    domain.register_cast::<bool, i64>()?;
    domain.register_cast::<bool, f64>()?;
    domain.register_converter(int_to_float)?;

    let (int, float, boolean) = (TypeId::of::<i64>(), TypeId::of::<f64>(), TypeId::of::<bool>());
    domain.register_coercion(boolean, int, Coercion::ToRight)?;
    domain.register_coercion(boolean, float, Coercion::ToRight)?;
    domain.register_coercion(int, float, Coercion::ToRight)?;

    domain.register_truth(|v: &i64| *v != 0)?;
    domain.register_truth(|v: &f64| *v != 0.0)?;
    domain.register_truth(|v: &bool| *v)?;
    domain.register_truth(|v: &String| !v.is_empty())?;
    domain.register_truth(|_: &Null| false)?;
    domain.register_truth(|_: &Cons| true)?;
    Ok(domain)
}

#[allow(clippy::cast_precision_loss, reason = "large ints round to the nearest float")]
fn int_to_float(value: &i64) -> CalcResult<f64> {
    Ok(*value as f64)
}

/// Literal tokens: integers become `int`, numerals with a fraction
/// `float`, strings `str`.
pub(super) fn parse_value(domain: &Rc<TypeDomain>, token: &Token) -> CalcResult<TypedValue> {
    if token.kind == TokenKind::String {
        return TypedValue::new(domain, token.text.clone());
    }
    let numeral = Numeral::from_token(token)?;
    if !numeral.is_integer() {
        return TypedValue::new(domain, numeral.to_f64());
    }
    let value = numeral
        .integer_value()
        .ok_or_else(|| ParseError::InvalidNumber {
            literal: token.text.clone(),
            reason: "too large for int".to_string(),
        })?;
    TypedValue::new(domain, value)
}
