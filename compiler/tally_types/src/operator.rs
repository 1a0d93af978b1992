//! Operators over [`TypedValue`]s, dispatched on operand types.
//!
//! Binary resolution order:
//! 1. an exact `(left, right)` variant
//! 2. the coerced operation for the type the domain's coercion rule picks
//! 3. the coerced operation with the narrowest type both operands convert to
//! 4. the fallback, if any
//!
//! Registering two operations for the same types is a setup error, and so
//! is a pair of widening targets the domain's coercions don't rank. Both
//! are reported by `build`.
//!
//! The built operators are plain [`BinaryOperator`]/[`UnaryOperator`]s, so
//! parsers and the dictionary never know values are typed.

use std::any::TypeId;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use tally_eval::{BinaryOperator, UnaryOperator};
use tally_ir::{dispatch_failed, Associativity, CalcError, CalcResult};

use crate::domain::{Coercion, TypeDomain};
use crate::value::TypedValue;

type BinaryBody = Box<dyn Fn(&Rc<TypeDomain>, &TypedValue, &TypedValue) -> CalcResult<TypedValue>>;
type UnaryBody = Box<dyn Fn(&Rc<TypeDomain>, &TypedValue) -> CalcResult<TypedValue>>;

/// Builder for a typed binary operator.
pub struct TypedBinary {
    id: String,
    precedence: u32,
    associativity: Associativity,
    coerced: Vec<(TypeId, BinaryBody)>,
    variants: FxHashMap<(TypeId, TypeId), BinaryBody>,
    fallback: Option<BinaryBody>,
    duplicates: Vec<String>,
}

impl TypedBinary {
    pub fn new(id: impl Into<String>, precedence: u32, associativity: Associativity) -> Self {
        TypedBinary {
            id: id.into(),
            precedence,
            associativity,
            coerced: Vec::new(),
            variants: FxHashMap::default(),
            fallback: None,
            duplicates: Vec::new(),
        }
    }

    pub fn left(id: impl Into<String>, precedence: u32) -> Self {
        Self::new(id, precedence, Associativity::Left)
    }

    pub fn right(id: impl Into<String>, precedence: u32) -> Self {
        Self::new(id, precedence, Associativity::Right)
    }

    /// Operation on two values of type `T`, after coercion.
    #[must_use]
    pub fn coerced<T: 'static, O: 'static>(
        self,
        op: impl Fn(&T, &T) -> CalcResult<O> + 'static,
    ) -> Self {
        self.coerced_value::<T>(move |domain: &Rc<TypeDomain>, left: &T, right: &T| {
            TypedValue::new(domain, op(left, right)?)
        })
    }

    /// Like [`coerced`](Self::coerced), for operations whose result type
    /// depends on the operands.
    #[must_use]
    pub fn coerced_value<T: 'static>(
        mut self,
        op: impl Fn(&Rc<TypeDomain>, &T, &T) -> CalcResult<TypedValue> + 'static,
    ) -> Self {
        let ty = TypeId::of::<T>();
        if self.coerced.iter().any(|(existing, _)| *existing == ty) {
            self.duplicates.push(format!("coerced operation on {}", std::any::type_name::<T>()));
        }
        self.coerced.push((
            ty,
            Box::new(move |domain: &Rc<TypeDomain>, left: &TypedValue, right: &TypedValue| {
                op(domain, left.get::<T>()?, right.get::<T>()?)
            }),
        ));
        self
    }

    /// Operation on exactly `(L, R)`, tried before any coercion.
    #[must_use]
    pub fn variant<L: 'static, R: 'static, O: 'static>(
        mut self,
        op: impl Fn(&L, &R) -> CalcResult<O> + 'static,
    ) -> Self {
        let previous = self.variants.insert(
            (TypeId::of::<L>(), TypeId::of::<R>()),
            Box::new(move |domain: &Rc<TypeDomain>, left: &TypedValue, right: &TypedValue| {
                TypedValue::new(domain, op(left.get::<L>()?, right.get::<R>()?)?)
            }),
        );
        if previous.is_some() {
            self.duplicates.push(format!(
                "variant on ({}, {})",
                std::any::type_name::<L>(),
                std::any::type_name::<R>()
            ));
        }
        self
    }

    /// Operation for any operand pair nothing else handles.
    #[must_use]
    pub fn fallback(
        mut self,
        op: impl Fn(&Rc<TypeDomain>, &TypedValue, &TypedValue) -> CalcResult<TypedValue> + 'static,
    ) -> Self {
        self.fallback = Some(Box::new(op));
        self
    }

    /// Verify the registrations against `domain` and freeze.
    pub fn build(self, domain: &Rc<TypeDomain>) -> CalcResult<BinaryOperator<TypedValue>> {
        reject_duplicates(&self.id, &self.duplicates)?;
        for (ty, _) in &self.coerced {
            domain.check_known(*ty)?;
        }
        for (left, right) in self.variants.keys() {
            domain.check_known(*left)?;
            domain.check_known(*right)?;
        }
        let targets: Vec<TypeId> = self.coerced.iter().map(|(ty, _)| *ty).collect();
        check_targets(domain, &format!("operator '{}'", self.id), &targets)?;
        let id = self.id.clone();
        let precedence = self.precedence;
        let associativity = self.associativity;
        let domain = Rc::clone(domain);
        Ok(BinaryOperator::new(
            id,
            precedence,
            associativity,
            move |left: TypedValue, right: TypedValue| self.apply(&domain, &left, &right),
        ))
    }

    fn coerced_op(&self, ty: TypeId) -> Option<&BinaryBody> {
        self.coerced
            .iter()
            .find(|(candidate, _)| *candidate == ty)
            .map(|(_, op)| op)
    }

    fn apply(
        &self,
        domain: &Rc<TypeDomain>,
        left: &TypedValue,
        right: &TypedValue,
    ) -> CalcResult<TypedValue> {
        let (left_ty, right_ty) = (left.type_id(), right.type_id());
        if let Some(op) = self.variants.get(&(left_ty, right_ty)) {
            return op(domain, left, right);
        }

        let target = match domain.coercion(left_ty, right_ty) {
            Coercion::Identity | Coercion::ToLeft => Some(left_ty),
            Coercion::ToRight => Some(right_ty),
            Coercion::Invalid => None,
        };
        if let Some((target, op)) = target.and_then(|ty| self.coerced_op(ty).map(|op| (ty, op))) {
            return op(domain, &left.convert(target)?, &right.convert(target)?);
        }

        let widened = domain.narrowest(self.coerced.iter().map(|(ty, _)| *ty).filter(|ty| {
            domain.has_conversion(left_ty, *ty) && domain.has_conversion(right_ty, *ty)
        }));
        if let Some((target, op)) = widened.and_then(|ty| self.coerced_op(ty).map(|op| (ty, op))) {
            return op(domain, &left.convert(target)?, &right.convert(target)?);
        }

        match &self.fallback {
            Some(op) => op(domain, left, right),
            None => Err(dispatch_failed(format_args!(
                "operator '{}' can't be applied to {left:?} and {right:?}",
                self.id
            ))),
        }
    }
}

/// Builder for a typed unary operator.
pub struct TypedUnary {
    id: String,
    variants: Vec<(TypeId, UnaryBody)>,
    fallback: Option<UnaryBody>,
    duplicates: Vec<String>,
}

impl TypedUnary {
    pub fn new(id: impl Into<String>) -> Self {
        TypedUnary {
            id: id.into(),
            variants: Vec::new(),
            fallback: None,
            duplicates: Vec::new(),
        }
    }

    /// Operation on a value of type `T`. An operand of another type uses
    /// the narrowest variant it converts to.
    #[must_use]
    pub fn variant<T: 'static, O: 'static>(
        mut self,
        op: impl Fn(&T) -> CalcResult<O> + 'static,
    ) -> Self {
        let ty = TypeId::of::<T>();
        if self.variants.iter().any(|(existing, _)| *existing == ty) {
            self.duplicates.push(format!("variant on {}", std::any::type_name::<T>()));
        }
        self.variants.push((
            ty,
            Box::new(move |domain: &Rc<TypeDomain>, value: &TypedValue| {
                TypedValue::new(domain, op(value.get::<T>()?)?)
            }),
        ));
        self
    }

    #[must_use]
    pub fn fallback(
        mut self,
        op: impl Fn(&Rc<TypeDomain>, &TypedValue) -> CalcResult<TypedValue> + 'static,
    ) -> Self {
        self.fallback = Some(Box::new(op));
        self
    }

    pub fn build(self, domain: &Rc<TypeDomain>) -> CalcResult<UnaryOperator<TypedValue>> {
        reject_duplicates(&self.id, &self.duplicates)?;
        for (ty, _) in &self.variants {
            domain.check_known(*ty)?;
        }
        let targets: Vec<TypeId> = self.variants.iter().map(|(ty, _)| *ty).collect();
        check_targets(domain, &format!("unary operator '{}'", self.id), &targets)?;
        let id = self.id.clone();
        let domain = Rc::clone(domain);
        Ok(UnaryOperator::new(id, move |value: TypedValue| {
            self.apply(&domain, &value)
        }))
    }

    fn variant_op(&self, ty: TypeId) -> Option<&UnaryBody> {
        self.variants
            .iter()
            .find(|(candidate, _)| *candidate == ty)
            .map(|(_, op)| op)
    }

    fn apply(&self, domain: &Rc<TypeDomain>, value: &TypedValue) -> CalcResult<TypedValue> {
        let ty = value.type_id();
        if let Some(op) = self.variant_op(ty) {
            return op(domain, value);
        }
        let widened = domain.narrowest(
            self.variants
                .iter()
                .map(|(candidate, _)| *candidate)
                .filter(|candidate| domain.has_conversion(ty, *candidate)),
        );
        if let Some((target, op)) = widened.and_then(|target| self.variant_op(target).map(|op| (target, op))) {
            return op(domain, &value.convert(target)?);
        }
        match &self.fallback {
            Some(op) => op(domain, value),
            None => Err(dispatch_failed(format_args!(
                "operator '{}' can't be applied to {value:?}",
                self.id
            ))),
        }
    }
}

fn reject_duplicates(id: &str, duplicates: &[String]) -> CalcResult<()> {
    match duplicates.first() {
        Some(duplicate) => Err(CalcError::Setup(format!(
            "operator '{id}' registers its {duplicate} twice"
        ))),
        None => Ok(()),
    }
}

/// Every pair of widening targets must be ranked by the domain's
/// coercions wherever a value outside `targets` converts to both.
fn check_targets(domain: &TypeDomain, owner: &str, targets: &[TypeId]) -> CalcResult<()> {
    for (index, a) in targets.iter().enumerate() {
        for b in &targets[index + 1..] {
            domain.check_widening_order(owner, targets, *a, *b)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
