//! Multi-dispatch functions over [`TypedValue`]s.
//!
//! A [`TypedFunction`] is a list of [`Variant`]s, each declaring its
//! parameters explicitly:
//! - dispatch parameters accept a primary type plus optional extra types,
//!   and always reach the body converted to the primary type
//! - raw parameters accept anything and take no part in dispatch
//! - trailing parameters may be optional, and the last one may repeat
//!
//! Overlaps are resolved when the table is built. Two variants that can
//! accept the same argument types must be strictly ordered (one accepts a
//! subset of what the other accepts); otherwise the build fails. The same
//! holds after widening: two variants some argument converts into must have
//! targets the domain's coercions rank, so `abs(true)` reaches the `int`
//! variant whichever of `int` and `float` was registered first.
//!
//! Calls take the first variant that matches exactly, or failing that, the
//! widened match with the narrowest targets.

use std::any::TypeId;
use std::fmt;
use std::rc::Rc;

use smallvec::{smallvec, SmallVec};

use tally_eval::{Callable, Frame, Symbol};
use tally_ir::{ambiguous_dispatch, arity_mismatch, dispatch_failed, CalcError, CalcResult};

use crate::domain::TypeDomain;
use crate::value::TypedValue;

type Args = SmallVec<[TypedValue; 4]>;
type Body = dyn Fn(&Rc<TypeDomain>, &[TypedValue]) -> CalcResult<Vec<TypedValue>>;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Param {
    /// Primary type first, then extras.
    Dispatch(SmallVec<[TypeId; 2]>),
    Raw,
}

impl Param {
    fn accepts(&self, ty: TypeId) -> bool {
        match self {
            Param::Dispatch(types) => types.contains(&ty),
            Param::Raw => true,
        }
    }

    fn primary(&self) -> Option<TypeId> {
        match self {
            Param::Dispatch(types) => types.first().copied(),
            Param::Raw => None,
        }
    }

    fn intersects(&self, other: &Param) -> bool {
        match (self, other) {
            (Param::Dispatch(left), Param::Dispatch(right)) => {
                left.iter().any(|ty| right.contains(ty))
            }
            _ => true,
        }
    }

    /// Whether an argument of type `ty` reaches this parameter, directly
    /// or through a converter to the primary type.
    fn accepts_widened(&self, domain: &TypeDomain, ty: TypeId) -> bool {
        self.accepts(ty) || self.primary().is_some_and(|primary| domain.has_conversion(ty, primary))
    }

    /// Whether widening into this parameter is never looser than widening
    /// into `other`: the same target, a target that promotes into the
    /// other's, or an `other` that takes anything.
    fn target_within(&self, domain: &TypeDomain, other: &Param) -> bool {
        match (self.primary(), other.primary()) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(left), Some(right)) => left == right || domain.promotes_to(left, right),
        }
    }

    fn is_subset_of(&self, other: &Param) -> bool {
        match (self, other) {
            (_, Param::Raw) => true,
            (Param::Raw, Param::Dispatch(_)) => false,
            (Param::Dispatch(left), Param::Dispatch(right)) => {
                left.iter().all(|ty| right.contains(ty))
            }
        }
    }
}

/// One overload of a [`TypedFunction`].
pub struct Variant {
    params: Vec<Param>,
    optional: usize,
    variadic: bool,
    body: Box<Body>,
}

impl Variant {
    /// A variant returning exactly one value.
    pub fn single(
        body: impl Fn(&Rc<TypeDomain>, &[TypedValue]) -> CalcResult<TypedValue> + 'static,
    ) -> Self {
        Variant::multiple(move |domain: &Rc<TypeDomain>, args: &[TypedValue]| {
            Ok(vec![body(domain, args)?])
        })
    }

    /// A variant returning any number of values.
    pub fn multiple(
        body: impl Fn(&Rc<TypeDomain>, &[TypedValue]) -> CalcResult<Vec<TypedValue>> + 'static,
    ) -> Self {
        Variant {
            params: Vec::new(),
            optional: 0,
            variadic: false,
            body: Box::new(body),
        }
    }

    /// Append a dispatch parameter of type `T`.
    #[must_use]
    pub fn arg<T: 'static>(self) -> Self {
        self.arg_with_extras::<T>(&[])
    }

    /// Append a dispatch parameter of type `T` that also accepts `extras`
    /// (converted to `T` before the body runs).
    #[must_use]
    pub fn arg_with_extras<T: 'static>(mut self, extras: &[TypeId]) -> Self {
        let mut types: SmallVec<[TypeId; 2]> = smallvec![TypeId::of::<T>()];
        types.extend(extras.iter().copied());
        self.params.push(Param::Dispatch(types));
        self
    }

    /// Append a parameter passed through untouched.
    #[must_use]
    pub fn raw(mut self) -> Self {
        self.params.push(Param::Raw);
        self
    }

    /// Mark the last parameter as optional. Optional parameters must be
    /// trailing.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional += 1;
        self
    }

    /// Let the last parameter repeat any number of times, including zero.
    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    fn mandatory(&self) -> usize {
        self.params.len() - self.optional - usize::from(self.variadic)
    }

    fn max_args(&self) -> Option<usize> {
        if self.variadic {
            None
        } else {
            Some(self.params.len())
        }
    }

    fn accepts_count(&self, count: usize) -> bool {
        count >= self.mandatory() && self.max_args().is_none_or(|max| count <= max)
    }

    /// Parameter governing argument `index`, repeating a variadic tail.
    fn param(&self, index: usize) -> Option<&Param> {
        match self.params.get(index) {
            Some(param) => Some(param),
            None if self.variadic => self.params.last(),
            None => None,
        }
    }

    fn validate(&self, name: &str, domain: &TypeDomain) -> CalcResult<()> {
        if self.optional + usize::from(self.variadic) > self.params.len() {
            return Err(CalcError::Setup(format!(
                "variant of '{name}' marks more optional parameters than it declares"
            )));
        }
        for param in &self.params {
            if let Param::Dispatch(types) = param {
                for ty in types {
                    domain.check_known(*ty)?;
                }
            }
        }
        Ok(())
    }

    /// Argument counts worth comparing against `other`: every position up
    /// to the longer parameter list, plus one to cover variadic tails.
    fn shared_counts(&self, other: &Variant) -> impl Iterator<Item = usize> + '_ {
        let limit = self.params.len().max(other.params.len()) + 1;
        let other_min = other.mandatory();
        let other_max = other.max_args();
        (0..=limit).filter(move |count| {
            self.accepts_count(*count)
                && *count >= other_min
                && other_max.is_none_or(|max| *count <= max)
        })
    }

    fn overlaps_at(&self, other: &Variant, count: usize) -> bool {
        (0..count).all(|index| match (self.param(index), other.param(index)) {
            (Some(left), Some(right)) => left.intersects(right),
            _ => false,
        })
    }

    fn subset_at(&self, other: &Variant, count: usize) -> bool {
        (0..count).all(|index| match (self.param(index), other.param(index)) {
            (Some(left), Some(right)) => left.is_subset_of(right),
            _ => false,
        })
    }

    /// Whether `self` accepts a strict subset of what `other` accepts,
    /// wherever the two overlap.
    fn more_specific_than(&self, other: &Variant) -> bool {
        let overlapping: Vec<usize> = self
            .shared_counts(other)
            .filter(|count| self.overlaps_at(other, *count))
            .collect();
        !overlapping.is_empty()
            && overlapping.iter().all(|count| self.subset_at(other, *count))
            && !overlapping.iter().all(|count| other.subset_at(self, *count))
    }

    fn is_ambiguous_with(&self, other: &Variant) -> bool {
        let overlaps = self
            .shared_counts(other)
            .any(|count| self.overlaps_at(other, count));
        overlaps && !self.more_specific_than(other) && !other.more_specific_than(self)
    }

    fn widened_overlap_at(&self, other: &Variant, domain: &TypeDomain, count: usize) -> bool {
        (0..count).all(|index| match (self.param(index), other.param(index)) {
            (Some(left), Some(right)) => domain
                .type_ids()
                .any(|ty| left.accepts_widened(domain, ty) && right.accepts_widened(domain, ty)),
            _ => false,
        })
    }

    fn targets_within_at(&self, other: &Variant, domain: &TypeDomain, count: usize) -> bool {
        (0..count).all(|index| match (self.param(index), other.param(index)) {
            (Some(left), Some(right)) => left.target_within(domain, right),
            _ => false,
        })
    }

    /// Whether a widened call with `count` arguments prefers `self`.
    fn widens_before(&self, other: &Variant, domain: &TypeDomain, count: usize) -> bool {
        self.targets_within_at(other, domain, count) && !other.targets_within_at(self, domain, count)
    }

    fn is_ambiguous_widened(&self, other: &Variant, domain: &TypeDomain) -> bool {
        self.shared_counts(other).filter(|count| *count > 0).any(|count| {
            self.widened_overlap_at(other, domain, count)
                && !self.widens_before(other, domain, count)
                && !other.widens_before(self, domain, count)
        })
    }

    fn matches_exactly(&self, args: &[TypedValue]) -> bool {
        self.accepts_count(args.len())
            && args.iter().enumerate().all(|(index, arg)| {
                self.param(index)
                    .is_some_and(|param| param.accepts(arg.type_id()))
            })
    }

    fn matches_widened(&self, domain: &TypeDomain, args: &[TypedValue]) -> bool {
        self.accepts_count(args.len())
            && args.iter().enumerate().all(|(index, arg)| {
                self.param(index)
                    .is_some_and(|param| param.accepts_widened(domain, arg.type_id()))
            })
    }

    fn invoke(&self, domain: &Rc<TypeDomain>, args: &[TypedValue]) -> CalcResult<Vec<TypedValue>> {
        let converted = args
            .iter()
            .enumerate()
            .map(|(index, arg)| match self.param(index).and_then(Param::primary) {
                Some(primary) => arg.convert(primary),
                None => Ok(arg.clone()),
            })
            .collect::<CalcResult<Args>>()?;
        (self.body)(domain, &converted)
    }

    fn describe(&self, domain: &TypeDomain) -> String {
        let mut params: Vec<String> = self
            .params
            .iter()
            .map(|param| match param {
                Param::Dispatch(types) => types
                    .iter()
                    .map(|ty| domain.name(*ty))
                    .collect::<Vec<_>>()
                    .join("|"),
                Param::Raw => "*".to_string(),
            })
            .collect();
        let optional_from = self.params.len() - self.optional - usize::from(self.variadic);
        for param in params.iter_mut().skip(optional_from) {
            param.push('?');
        }
        if self.variadic {
            if let Some(last) = params.last_mut() {
                last.push_str("...");
            }
        }
        format!("({})", params.join(", "))
    }
}

/// A named, ambiguity-checked overload set.
pub struct TypedFunction {
    name: String,
    domain: Rc<TypeDomain>,
    variants: Vec<Variant>,
    mandatory: Option<usize>,
}

impl TypedFunction {
    /// Check `variants` against each other and order them so that more
    /// specific variants are tried first.
    pub fn build(
        name: impl Into<String>,
        domain: &Rc<TypeDomain>,
        variants: Vec<Variant>,
    ) -> CalcResult<Self> {
        let name = name.into();
        if variants.is_empty() {
            return Err(CalcError::Setup(format!("function '{name}' has no variants")));
        }
        for variant in &variants {
            variant.validate(&name, domain)?;
        }
        for (index, left) in variants.iter().enumerate() {
            for right in &variants[index + 1..] {
                if left.is_ambiguous_with(right) {
                    return Err(ambiguous_dispatch(format_args!(
                        "'{name}' can't always choose between {} and {}",
                        left.describe(domain),
                        right.describe(domain)
                    )));
                }
                if left.is_ambiguous_widened(right, domain) {
                    return Err(ambiguous_dispatch(format_args!(
                        "'{name}' can't rank {} and {} for converted arguments",
                        left.describe(domain),
                        right.describe(domain)
                    )));
                }
            }
        }

        let first = variants[0].mandatory();
        let mandatory = variants
            .iter()
            .all(|variant| variant.mandatory() == first)
            .then_some(first);

        Ok(TypedFunction {
            variants: order_by_specificity(variants),
            name,
            domain: Rc::clone(domain),
            mandatory,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wrap as a callable symbol.
    pub fn into_symbol(self) -> Symbol<TypedValue> {
        Symbol::callable(self)
    }

    fn resolve(&self, args: &[TypedValue]) -> CalcResult<&Variant> {
        let exact = self.variants.iter().find(|variant| variant.matches_exactly(args));
        let found = exact.or_else(|| {
            self.variants
                .iter()
                .filter(|variant| variant.matches_widened(&self.domain, args))
                .reduce(|best, candidate| {
                    if candidate.widens_before(best, &self.domain, args.len()) {
                        candidate
                    } else {
                        best
                    }
                })
        });
        found.ok_or_else(|| {
            dispatch_failed(format_args!(
                "no variant of '{}' accepts {}",
                self.name,
                describe_args(args)
            ))
        })
    }

    /// Resolve and run against an argument list, bypassing the stack.
    pub fn apply(&self, args: &[TypedValue]) -> CalcResult<Vec<TypedValue>> {
        let variant = self.resolve(args)?;
        tracing::trace!(function = %self.name, variant = %variant.describe(&self.domain), "dispatched");
        variant.invoke(&self.domain, args)
    }
}

/// Repeatedly take the earliest variant nothing remaining is more
/// specific than. Registration order breaks ties.
fn order_by_specificity(mut pending: Vec<Variant>) -> Vec<Variant> {
    let mut ordered = Vec::with_capacity(pending.len());
    while !pending.is_empty() {
        let next = (0..pending.len())
            .find(|&candidate| {
                !pending
                    .iter()
                    .any(|other| other.more_specific_than(&pending[candidate]))
            })
            .unwrap_or(0);
        ordered.push(pending.remove(next));
    }
    ordered
}

fn describe_args(args: &[TypedValue]) -> String {
    if args.is_empty() {
        return "no arguments".to_string();
    }
    args.iter()
        .map(|arg| format!("{arg:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Callable<TypedValue> for TypedFunction {
    fn call(
        &self,
        frame: &mut Frame<TypedValue>,
        args: Option<usize>,
        rets: Option<usize>,
    ) -> CalcResult<()> {
        let count = match (args, self.mandatory) {
            (Some(count), _) | (None, Some(count)) => count,
            (None, None) => {
                return Err(CalcError::StackValidation(format!(
                    "'{}' needs an explicit argument count",
                    self.name
                )))
            }
        };
        let available = frame.stack().len();
        if available < count {
            return Err(arity_mismatch("argument(s)", &self.name, count, available));
        }
        let values = frame.stack_mut().pop_many(count)?;
        let results = self.apply(&values)?;
        if let Some(rets) = rets {
            if rets != results.len() {
                return Err(arity_mismatch("result(s)", &self.name, rets, results.len()));
            }
        }
        frame.stack_mut().extend(results);
        Ok(())
    }
}

impl fmt::Debug for TypedFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variants: Vec<String> = self
            .variants
            .iter()
            .map(|variant| variant.describe(&self.domain))
            .collect();
        f.debug_struct("TypedFunction")
            .field("name", &self.name)
            .field("variants", &variants)
            .finish()
    }
}
