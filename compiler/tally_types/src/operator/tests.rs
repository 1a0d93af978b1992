use std::any::TypeId;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use tally_ir::{Associativity, CalcError};

use super::*;
use crate::domain::Coercion;

fn domain() -> Rc<TypeDomain> {
    let mut domain = TypeDomain::new();
    domain.register_type::<i64>("int", |v, f| write!(f, "{v}")).unwrap();
    domain.register_type::<f64>("float", |v, f| write!(f, "{v:?}")).unwrap();
    domain.register_type::<bool>("bool", |v, f| write!(f, "{v}")).unwrap();
    domain.register_type::<String>("str", |v, f| write!(f, "{v:?}")).unwrap();
    domain.register_cast::<bool, i64>().unwrap();
    domain.register_converter(|v: &i64| Ok(*v as f64)).unwrap();
    domain
        .register_coercion(TypeId::of::<bool>(), TypeId::of::<i64>(), Coercion::ToRight)
        .unwrap();
    domain
        .register_coercion(TypeId::of::<i64>(), TypeId::of::<f64>(), Coercion::ToRight)
        .unwrap();
    Rc::new(domain)
}

fn value<T: 'static>(domain: &Rc<TypeDomain>, value: T) -> TypedValue {
    TypedValue::new(domain, value).unwrap()
}

fn plus(domain: &Rc<TypeDomain>) -> BinaryOperator<TypedValue> {
    TypedBinary::left("+", 10)
        .coerced(|a: &i64, b: &i64| Ok(a + b))
        .coerced(|a: &f64, b: &f64| Ok(a + b))
        .coerced(|a: &String, b: &String| Ok(format!("{a}{b}")))
        .variant(|a: &String, b: &i64| Ok(format!("{a}{b}")))
        .build(domain)
        .unwrap()
}

#[test]
fn test_build_keeps_syntax() {
    let d = domain();
    let op = TypedBinary::right("**", 30).coerced(|a: &i64, _b: &i64| Ok(*a)).build(&d).unwrap();
    assert_eq!(op.id, "**");
    assert_eq!(op.precedence, 30);
    assert_eq!(op.associativity, Associativity::Right);
}

#[test]
fn test_same_type() {
    let d = domain();
    let op = plus(&d);
    assert_eq!(op.apply(value(&d, 1i64), value(&d, 2i64)).unwrap(), value(&d, 3i64));
    assert_eq!(
        op.apply(value(&d, "ab".to_string()), value(&d, "c".to_string())).unwrap(),
        value(&d, "abc".to_string())
    );
}

#[test]
fn test_coercion_promotes_operand() {
    let d = domain();
    let op = plus(&d);
    assert_eq!(op.apply(value(&d, 1i64), value(&d, 0.5f64)).unwrap(), value(&d, 1.5f64));
    assert_eq!(op.apply(value(&d, 0.5f64), value(&d, 1i64)).unwrap(), value(&d, 1.5f64));
    assert_eq!(op.apply(value(&d, true), value(&d, 2i64)).unwrap(), value(&d, 3i64));
}

#[test]
fn test_widening_without_coerced_operation() {
    let d = domain();
    let op = plus(&d);
    assert_eq!(op.apply(value(&d, true), value(&d, true)).unwrap(), value(&d, 2i64));
}

#[test]
fn test_exact_variant_before_coercion() {
    let d = domain();
    let op = plus(&d);
    assert_eq!(
        op.apply(value(&d, "n".to_string()), value(&d, 1i64)).unwrap(),
        value(&d, "n1".to_string())
    );
}

#[test]
fn test_no_match_is_dispatch_error() {
    let d = domain();
    let op = plus(&d);
    let err = op.apply(value(&d, 1i64), value(&d, "x".to_string())).unwrap_err();
    assert_eq!(err.category(), "dispatch");
}

#[test]
fn test_fallback() {
    let d = domain();
    let op = TypedBinary::left("==", 5)
        .coerced(|a: &i64, b: &i64| Ok(a == b))
        .fallback(|domain: &Rc<TypeDomain>, left: &TypedValue, right: &TypedValue| {
            TypedValue::new(domain, left == right)
        })
        .build(&d)
        .unwrap();
    assert_eq!(op.apply(value(&d, true), value(&d, 1i64)).unwrap(), value(&d, true));
    assert_eq!(
        op.apply(value(&d, "x".to_string()), value(&d, 1i64)).unwrap(),
        value(&d, false)
    );
}

#[test]
fn test_unknown_type_rejected() {
    let d = domain();
    let result = TypedBinary::left("+", 1).coerced(|a: &u8, b: &u8| Ok(a + b)).build(&d);
    assert!(result.is_err());
    assert!(TypedUnary::new("-").variant(|a: &u8| Ok(*a)).build(&d).is_err());
}

#[test]
fn test_unary_exact_widened_and_fallback() {
    let d = domain();
    let neg = TypedUnary::new("-")
        .variant(|a: &i64| Ok(-a))
        .variant(|a: &f64| Ok(-a))
        .build(&d)
        .unwrap();
    assert_eq!(neg.apply(value(&d, 2i64)).unwrap(), value(&d, -2i64));
    assert_eq!(neg.apply(value(&d, 2.5f64)).unwrap(), value(&d, -2.5f64));
    assert_eq!(neg.apply(value(&d, true)).unwrap(), value(&d, -1i64));
    assert_eq!(neg.apply(value(&d, "x".to_string())).unwrap_err().category(), "dispatch");

    let not = TypedUnary::new("!")
        .fallback(|domain: &Rc<TypeDomain>, value: &TypedValue| {
            TypedValue::new(domain, value.type_name() == "str")
        })
        .build(&d)
        .unwrap();
    assert_eq!(not.apply(value(&d, "x".to_string())).unwrap(), value(&d, true));
}

/// `bool` converts to both `int` and `float`; `ranked` adds the rule that
/// puts `int` before `float`.
fn two_way_domain(ranked: bool) -> Rc<TypeDomain> {
    let mut domain = TypeDomain::new();
    domain.register_type::<i64>("int", |v, f| write!(f, "{v}")).unwrap();
    domain.register_type::<f64>("float", |v, f| write!(f, "{v:?}")).unwrap();
    domain.register_type::<bool>("bool", |v, f| write!(f, "{v}")).unwrap();
    domain.register_cast::<bool, i64>().unwrap();
    domain.register_converter(|v: &bool| Ok(f64::from(u8::from(*v)))).unwrap();
    if ranked {
        domain.register_converter(|v: &i64| Ok(*v as f64)).unwrap();
        domain
            .register_coercion(TypeId::of::<i64>(), TypeId::of::<f64>(), Coercion::ToRight)
            .unwrap();
    }
    Rc::new(domain)
}

#[test]
fn test_unary_widening_ignores_registration_order() {
    let d = two_way_domain(true);
    let int_first = TypedUnary::new("-")
        .variant(|a: &i64| Ok(-a))
        .variant(|a: &f64| Ok(-a))
        .build(&d)
        .unwrap();
    let float_first = TypedUnary::new("-")
        .variant(|a: &f64| Ok(-a))
        .variant(|a: &i64| Ok(-a))
        .build(&d)
        .unwrap();
    assert_eq!(int_first.apply(value(&d, true)).unwrap(), value(&d, -1i64));
    assert_eq!(float_first.apply(value(&d, true)).unwrap(), value(&d, -1i64));
}

#[test]
fn test_binary_widening_ignores_registration_order() {
    let d = two_way_domain(true);
    let float_first = TypedBinary::left("+", 10)
        .coerced(|a: &f64, b: &f64| Ok(a + b))
        .coerced(|a: &i64, b: &i64| Ok(a + b))
        .build(&d)
        .unwrap();
    assert_eq!(float_first.apply(value(&d, true), value(&d, true)).unwrap(), value(&d, 2i64));
}

#[test]
fn test_unranked_widening_targets_rejected() {
    let d = two_way_domain(false);
    let unary = TypedUnary::new("-")
        .variant(|a: &i64| Ok(-a))
        .variant(|a: &f64| Ok(-a))
        .build(&d);
    assert!(matches!(unary, Err(CalcError::AmbiguousDispatch(_))), "{:?}", unary.err());
    let binary = TypedBinary::left("+", 10)
        .coerced(|a: &i64, b: &i64| Ok(a + b))
        .coerced(|a: &f64, b: &f64| Ok(a + b))
        .build(&d);
    assert!(matches!(binary, Err(CalcError::AmbiguousDispatch(_))), "{:?}", binary.err());
}

#[test]
fn test_duplicate_registration_rejected() {
    let d = domain();
    let coerced = TypedBinary::left("+", 10)
        .coerced(|a: &i64, b: &i64| Ok(a + b))
        .coerced(|a: &i64, b: &i64| Ok(a - b))
        .build(&d);
    assert!(matches!(coerced, Err(CalcError::Setup(_))), "{:?}", coerced.err());

    let variant = TypedBinary::left("+", 10)
        .variant(|a: &String, b: &i64| Ok(format!("{a}{b}")))
        .variant(|a: &String, _b: &i64| Ok(a.clone()))
        .build(&d);
    assert!(matches!(variant, Err(CalcError::Setup(_))), "{:?}", variant.err());

    let unary = TypedUnary::new("-")
        .variant(|a: &i64| Ok(-a))
        .variant(|a: &i64| Ok(*a))
        .build(&d);
    assert!(matches!(unary, Err(CalcError::Setup(_))), "{:?}", unary.err());
}
