//! Global functions and constants of the typed dialect.

use std::any::TypeId;
use std::rc::Rc;

use tally_eval::{accumulator, BinaryOperator, Environment, OperatorDictionary, Symbol};
use tally_ir::{invalid_value, CalcError, CalcResult};

use super::operators::{floor_div, floor_mod};
use crate::cons::{Cons, Null};
use crate::domain::TypeDomain;
use crate::function::{TypedFunction, Variant};
use crate::value::TypedValue;

/// Whole-number float to int, failing outside the int range.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, reason = "range checked first")]
fn float_to_int(value: f64) -> CalcResult<i64> {
    if (i64::MIN as f64..i64::MAX as f64).contains(&value) {
        Ok(value as i64)
    } else {
        Err(invalid_value(format_args!("{value:?} doesn't fit in an int")))
    }
}

fn count_to_int(count: usize) -> CalcResult<i64> {
    i64::try_from(count).map_err(|_| invalid_value("count doesn't fit in an int"))
}

fn parse_int(text: &str, radix: i64) -> CalcResult<i64> {
    let radix = u32::try_from(radix)
        .ok()
        .filter(|radix| (2..=36).contains(radix))
        .ok_or_else(|| invalid_value(format_args!("invalid radix {radix}")))?;
    i64::from_str_radix(text.trim(), radix)
        .map_err(|err| invalid_value(format_args!("can't parse '{text}' as int: {err}")))
}

/// A one-argument variant over `T`.
fn unary<T: 'static, O: 'static>(op: impl Fn(&T) -> CalcResult<O> + 'static) -> Variant {
    Variant::single(move |domain: &Rc<TypeDomain>, args: &[TypedValue]| {
        TypedValue::new(domain, op(args[0].get::<T>()?)?)
    })
    .arg::<T>()
}

/// A one-argument variant over any value.
fn raw<O: 'static>(op: impl Fn(&TypedValue) -> CalcResult<O> + 'static) -> Variant {
    Variant::single(move |domain: &Rc<TypeDomain>, args: &[TypedValue]| {
        TypedValue::new(domain, op(&args[0])?)
    })
    .raw()
}

fn define(
    env: &Environment<TypedValue>,
    domain: &Rc<TypeDomain>,
    name: &str,
    variants: Vec<Variant>,
) -> CalcResult<()> {
    let function = TypedFunction::build(name, domain, variants)?;
    env.set_global_symbol(name, function.into_symbol());
    Ok(())
}

fn operator(
    operators: &OperatorDictionary<TypedValue>,
    id: &str,
) -> CalcResult<Rc<BinaryOperator<TypedValue>>> {
    operators
        .binary(id)
        .map(Rc::clone)
        .ok_or_else(|| CalcError::Setup(format!("accumulators need operator '{id}'")))
}

fn install_constants(env: &Environment<TypedValue>, domain: &Rc<TypeDomain>) -> CalcResult<()> {
    env.set_global_symbol("PI", Symbol::Value(TypedValue::new(domain, std::f64::consts::PI)?));
    env.set_global_symbol("E", Symbol::Value(TypedValue::new(domain, std::f64::consts::E)?));
    env.set_global_symbol("null", Symbol::Value(TypedValue::new(domain, Null)?));
    env.set_global_symbol("true", Symbol::Value(TypedValue::new(domain, true)?));
    env.set_global_symbol("false", Symbol::Value(TypedValue::new(domain, false)?));
    Ok(())
}

fn install_numeric(env: &Environment<TypedValue>, domain: &Rc<TypeDomain>) -> CalcResult<()> {
    let int = TypeId::of::<i64>();
    let boolean = TypeId::of::<bool>();

    define(env, domain, "abs", vec![
        unary(|v: &i64| v.checked_abs().ok_or_else(|| invalid_value("integer overflow"))),
        unary(|v: &f64| Ok(v.abs())),
    ])?;
    define(env, domain, "sqrt", vec![Variant::single(
        |domain: &Rc<TypeDomain>, args: &[TypedValue]| {
            TypedValue::new(domain, args[0].get::<f64>()?.sqrt())
        },
    )
    .arg_with_extras::<f64>(&[int])])?;
    define(env, domain, "floor", vec![
        unary(|v: &i64| Ok(*v)),
        unary(|v: &f64| float_to_int(v.floor())),
    ])?;
    define(env, domain, "ceil", vec![
        unary(|v: &i64| Ok(*v)),
        unary(|v: &f64| float_to_int(v.ceil())),
    ])?;
    define(env, domain, "int", vec![
        unary(|v: &i64| Ok(*v)),
        unary(|v: &f64| float_to_int(v.trunc())),
        unary(|v: &bool| Ok(i64::from(*v))),
        Variant::single(|domain: &Rc<TypeDomain>, args: &[TypedValue]| {
            let radix = match args.get(1) {
                Some(radix) => *radix.get::<i64>()?,
                None => 10,
            };
            TypedValue::new(domain, parse_int(args[0].get::<String>()?, radix)?)
        })
        .arg::<String>()
        .arg::<i64>()
        .optional(),
    ])?;
    define(env, domain, "float", vec![
        Variant::single(|_domain: &Rc<TypeDomain>, args: &[TypedValue]| Ok(args[0].clone()))
            .arg_with_extras::<f64>(&[int, boolean]),
        unary(|v: &String| {
            v.trim()
                .parse::<f64>()
                .map_err(|err| invalid_value(format_args!("can't parse '{v}' as float: {err}")))
        }),
    ])?;
    define(env, domain, "divmod", vec![Variant::multiple(
        |domain: &Rc<TypeDomain>, args: &[TypedValue]| {
            let (a, b) = (*args[0].get::<i64>()?, *args[1].get::<i64>()?);
            Ok(vec![
                TypedValue::new(domain, floor_div(a, b)?)?,
                TypedValue::new(domain, floor_mod(a, b)?)?,
            ])
        },
    )
    .arg::<i64>()
    .arg::<i64>()])?;
    Ok(())
}

fn install_conversions(env: &Environment<TypedValue>, domain: &Rc<TypeDomain>) -> CalcResult<()> {
    define(env, domain, "str", vec![
        unary(|v: &String| Ok(v.clone())),
        raw(|v: &TypedValue| Ok(v.to_string())),
    ])?;
    define(env, domain, "bool", vec![raw(TypedValue::is_truthy)])?;
    define(env, domain, "isnumber", vec![raw(|v: &TypedValue| {
        Ok(v.is::<i64>() || v.is::<f64>())
    })])?;
    define(env, domain, "type", vec![raw(|v: &TypedValue| {
        Ok(v.type_name().to_string())
    })])?;
    Ok(())
}

fn install_lists(env: &Environment<TypedValue>, domain: &Rc<TypeDomain>) -> CalcResult<()> {
    define(env, domain, "len", vec![
        unary(|v: &String| count_to_int(v.chars().count())),
        unary(|v: &Cons| count_to_int(v.cell_count())),
        unary(|_: &Null| Ok(0i64)),
    ])?;
    define(env, domain, "car", vec![Variant::single(
        |_domain: &Rc<TypeDomain>, args: &[TypedValue]| Ok(args[0].get::<Cons>()?.car.clone()),
    )
    .arg::<Cons>()])?;
    define(env, domain, "cdr", vec![Variant::single(
        |_domain: &Rc<TypeDomain>, args: &[TypedValue]| Ok(args[0].get::<Cons>()?.cdr.clone()),
    )
    .arg::<Cons>()])?;
    define(env, domain, "list", vec![Variant::single(Cons::list).raw().variadic()])?;
    Ok(())
}

fn install_accumulators(
    env: &Environment<TypedValue>,
    domain: &Rc<TypeDomain>,
    operators: &OperatorDictionary<TypedValue>,
) -> CalcResult<()> {
    let null = env.null_value().clone();

    let less = operator(operators, "<")?;
    let min_less = Rc::clone(&less);
    env.set_global_symbol(
        "min",
        accumulator(
            "min",
            null.clone(),
            move |a: TypedValue, b: TypedValue| {
                Ok(if min_less.apply(b.clone(), a.clone())?.is_truthy()? { b } else { a })
            },
            |value, _| Ok(value),
        ),
    );
    env.set_global_symbol(
        "max",
        accumulator(
            "max",
            null.clone(),
            move |a: TypedValue, b: TypedValue| {
                Ok(if less.apply(a.clone(), b.clone())?.is_truthy()? { b } else { a })
            },
            |value, _| Ok(value),
        ),
    );

    let plus = operator(operators, "+")?;
    let sum_plus = Rc::clone(&plus);
    env.set_global_symbol(
        "sum",
        accumulator(
            "sum",
            null.clone(),
            move |a, b| sum_plus.apply(a, b),
            |value, _| Ok(value),
        ),
    );

    let divide = operator(operators, "/")?;
    let domain = Rc::clone(domain);
    env.set_global_symbol(
        "avg",
        accumulator(
            "avg",
            null,
            move |a, b| plus.apply(a, b),
            move |total, count| divide.apply(total, TypedValue::new(&domain, count_to_int(count)?)?),
        ),
    );
    Ok(())
}

/// Install every global of the dialect into `env`.
pub(super) fn install(
    env: &Environment<TypedValue>,
    domain: &Rc<TypeDomain>,
    operators: &OperatorDictionary<TypedValue>,
) -> CalcResult<()> {
    install_constants(env, domain)?;
    install_numeric(env, domain)?;
    install_conversions(env, domain)?;
    install_lists(env, domain)?;
    install_accumulators(env, domain, operators)
}
