//! The registry of runtime types a typed dialect computes with.
//!
//! A domain is built once with `&mut self` registrations and then frozen
//! behind an `Rc`; every [`TypedValue`](crate::TypedValue) holds that `Rc`.
//!
//! Types are keyed by [`TypeId`]. Besides the type set, a domain knows:
//! - converters: directed, possibly lossy `A -> B` transformations
//! - casts: lossless conversions backed by [`From`]
//! - coercion rules over type pairs, always registered in mirrored pairs
//! - truthiness per type; types without one are neither true nor false

use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use tally_ir::{ambiguous_dispatch, invalid_value, CalcError, CalcResult};

type Printer = Box<dyn Fn(&dyn Any, &mut fmt::Formatter<'_>) -> fmt::Result>;
type Equality = fn(&dyn Any, &dyn Any) -> bool;
type Converter = Box<dyn Fn(&dyn Any) -> CalcResult<Rc<dyn Any>>>;
type TruthEvaluator = Box<dyn Fn(&dyn Any) -> bool>;

/// How two operand types meet before a binary operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Coercion {
    /// Same type on both sides; nothing to do.
    Identity,
    /// Convert the right operand to the left operand's type.
    ToLeft,
    /// Convert the left operand to the right operand's type.
    ToRight,
    /// No common type.
    Invalid,
}

impl Coercion {
    /// The rule for the operands in swapped order.
    pub fn mirror(self) -> Self {
        match self {
            Coercion::ToLeft => Coercion::ToRight,
            Coercion::ToRight => Coercion::ToLeft,
            other => other,
        }
    }
}

struct TypeEntry {
    name: &'static str,
    eq: Equality,
    printer: Printer,
}

fn payload_eq<T: PartialEq + 'static>(left: &dyn Any, right: &dyn Any) -> bool {
    match (left.downcast_ref::<T>(), right.downcast_ref::<T>()) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

#[derive(Default)]
pub struct TypeDomain {
    types: FxHashMap<TypeId, TypeEntry>,
    converters: FxHashMap<(TypeId, TypeId), Converter>,
    coercions: FxHashMap<(TypeId, TypeId), Coercion>,
    truth: FxHashMap<TypeId, TruthEvaluator>,
}

impl TypeDomain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under `name`, printed by `printer`.
    pub fn register_type<T: PartialEq + 'static>(
        &mut self,
        name: &'static str,
        printer: impl Fn(&T, &mut fmt::Formatter<'_>) -> fmt::Result + 'static,
    ) -> CalcResult<()> {
        let id = TypeId::of::<T>();
        if self.types.contains_key(&id) {
            return Err(CalcError::Setup(format!("type '{name}' registered twice")));
        }
        let printer: Printer = Box::new(move |value: &dyn Any, f: &mut fmt::Formatter<'_>| match value.downcast_ref::<T>() {
            Some(value) => printer(value, f),
            None => f.write_str("<corrupt>"),
        });
        self.types.insert(
            id,
            TypeEntry {
                name,
                eq: payload_eq::<T>,
                printer,
            },
        );
        Ok(())
    }

    pub fn is_known(&self, ty: TypeId) -> bool {
        self.types.contains_key(&ty)
    }

    pub fn check_known(&self, ty: TypeId) -> CalcResult<()> {
        if self.is_known(ty) {
            Ok(())
        } else {
            Err(CalcError::Setup(format!("type {ty:?} is not registered in this domain")))
        }
    }

    /// Every registered type, in no particular order.
    pub fn type_ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.types.keys().copied()
    }

    /// Registered name, or `<unknown>`.
    pub fn name(&self, ty: TypeId) -> &'static str {
        self.types.get(&ty).map_or("<unknown>", |entry| entry.name)
    }

    /// Register a directed conversion. Fails for unknown types and for a
    /// pair that already has a converter or cast.
    pub fn register_converter<S: 'static, T: 'static>(
        &mut self,
        convert: impl Fn(&S) -> CalcResult<T> + 'static,
    ) -> CalcResult<()> {
        let converter: Converter = Box::new(move |value: &dyn Any| {
            let source = value
                .downcast_ref::<S>()
                .ok_or_else(|| invalid_value("converter applied to the wrong type"))?;
            convert(source).map(|target| Rc::new(target) as Rc<dyn Any>)
        });
        self.insert_converter(TypeId::of::<S>(), TypeId::of::<T>(), converter)
    }

    /// Register a lossless conversion through [`From`].
    pub fn register_cast<S: Clone + 'static, T: From<S> + 'static>(&mut self) -> CalcResult<()> {
        self.register_converter(|value: &S| Ok(T::from(value.clone())))
    }

    fn insert_converter(&mut self, from: TypeId, to: TypeId, converter: Converter) -> CalcResult<()> {
        self.check_known(from)?;
        self.check_known(to)?;
        if self.converters.contains_key(&(from, to)) {
            return Err(CalcError::Setup(format!(
                "duplicate conversion from {} to {}",
                self.name(from),
                self.name(to)
            )));
        }
        self.converters.insert((from, to), converter);
        Ok(())
    }

    pub fn has_conversion(&self, from: TypeId, to: TypeId) -> bool {
        from == to || self.converters.contains_key(&(from, to))
    }

    /// Convert a raw payload of type `from` to type `to`.
    pub(crate) fn convert_payload(
        &self,
        from: TypeId,
        to: TypeId,
        payload: &dyn Any,
    ) -> CalcResult<Rc<dyn Any>> {
        let converter = self.converters.get(&(from, to)).ok_or_else(|| {
            invalid_value(format_args!(
                "no conversion from {} to {}",
                self.name(from),
                self.name(to)
            ))
        })?;
        converter(payload)
    }

    /// Register `rule` for `(left, right)` and its mirror for
    /// `(right, left)`. Promoting rules need the matching converter.
    pub fn register_coercion(&mut self, left: TypeId, right: TypeId, rule: Coercion) -> CalcResult<()> {
        self.check_known(left)?;
        self.check_known(right)?;
        if left == right {
            return Err(CalcError::Setup(format!(
                "coercion of {} with itself is implicit",
                self.name(left)
            )));
        }
        match rule {
            Coercion::ToLeft => self.check_conversion(right, left)?,
            Coercion::ToRight => self.check_conversion(left, right)?,
            Coercion::Identity => {
                return Err(CalcError::Setup(
                    "identity coercion only applies to equal types".to_string(),
                ))
            }
            Coercion::Invalid => {}
        }
        for (key, rule) in [((left, right), rule), ((right, left), rule.mirror())] {
            match self.coercions.get(&key) {
                Some(existing) if *existing != rule => {
                    return Err(CalcError::Setup(format!(
                        "conflicting coercion rules for ({}, {})",
                        self.name(key.0),
                        self.name(key.1)
                    )))
                }
                _ => {
                    self.coercions.insert(key, rule);
                }
            }
        }
        Ok(())
    }

    fn check_conversion(&self, from: TypeId, to: TypeId) -> CalcResult<()> {
        if self.has_conversion(from, to) {
            Ok(())
        } else {
            Err(CalcError::Setup(format!(
                "no conversion from {} to {}",
                self.name(from),
                self.name(to)
            )))
        }
    }

    /// Rule for an operand pair; symmetric by construction.
    pub fn coercion(&self, left: TypeId, right: TypeId) -> Coercion {
        if left == right {
            return Coercion::Identity;
        }
        self.coercions
            .get(&(left, right))
            .copied()
            .unwrap_or(Coercion::Invalid)
    }

    /// Whether `narrow` is promoted to `wide` when the two meet, making it
    /// the more specific of two widening targets.
    pub fn promotes_to(&self, narrow: TypeId, wide: TypeId) -> bool {
        self.coercion(narrow, wide) == Coercion::ToRight
    }

    /// Of the `targets` an argument widens to, the one every other target
    /// promotes from. Ties keep the earliest.
    pub(crate) fn narrowest(&self, targets: impl IntoIterator<Item = TypeId>) -> Option<TypeId> {
        targets.into_iter().reduce(|best, candidate| {
            if self.promotes_to(candidate, best) {
                candidate
            } else {
                best
            }
        })
    }

    /// Fail when a value of some type outside `exact` converts to both
    /// `a` and `b` and the coercion table doesn't rank the two.
    pub(crate) fn check_widening_order(
        &self,
        owner: &str,
        exact: &[TypeId],
        a: TypeId,
        b: TypeId,
    ) -> CalcResult<()> {
        if a == b || self.promotes_to(a, b) || self.promotes_to(b, a) {
            return Ok(());
        }
        let shared = self.type_ids().find(|ty| {
            !exact.contains(ty) && self.has_conversion(*ty, a) && self.has_conversion(*ty, b)
        });
        match shared {
            Some(source) => Err(ambiguous_dispatch(format_args!(
                "{owner} can't choose between widening {} to {} or to {}",
                self.name(source),
                self.name(a),
                self.name(b)
            ))),
            None => Ok(()),
        }
    }

    pub fn register_truth<T: 'static>(
        &mut self,
        evaluator: impl Fn(&T) -> bool + 'static,
    ) -> CalcResult<()> {
        let ty = TypeId::of::<T>();
        self.check_known(ty)?;
        if self.truth.contains_key(&ty) {
            return Err(CalcError::Setup(format!(
                "duplicate truth evaluator for {}",
                self.name(ty)
            )));
        }
        self.truth.insert(
            ty,
            Box::new(move |value: &dyn Any| value.downcast_ref::<T>().is_some_and(&evaluator)),
        );
        Ok(())
    }

    /// `None` when the type has no notion of truth.
    pub(crate) fn truth_of(&self, ty: TypeId, payload: &dyn Any) -> Option<bool> {
        self.truth.get(&ty).map(|evaluator| evaluator(payload))
    }

    pub(crate) fn payload_eq(&self, ty: TypeId, left: &dyn Any, right: &dyn Any) -> bool {
        self.types.get(&ty).is_some_and(|entry| (entry.eq)(left, right))
    }

    pub(crate) fn print(&self, ty: TypeId, payload: &dyn Any, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.types.get(&ty) {
            Some(entry) => (entry.printer)(payload, f),
            None => f.write_str("<unknown>"),
        }
    }
}

impl fmt::Debug for TypeDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.types.values().map(|entry| entry.name).collect();
        names.sort_unstable();
        f.debug_struct("TypeDomain").field("types", &names).finish_non_exhaustive()
    }
}
