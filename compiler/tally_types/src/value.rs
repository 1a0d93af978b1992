//! Values tagged with a runtime type from a [`TypeDomain`].

use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Rc;

use tally_ir::{invalid_value, CalcResult};

use crate::domain::TypeDomain;

/// An immutable, dynamically typed value.
///
/// Cloning is cheap: the payload is shared. Conversions produce new
/// values in the same domain.
#[derive(Clone)]
pub struct TypedValue {
    domain: Rc<TypeDomain>,
    ty: TypeId,
    payload: Rc<dyn Any>,
}

impl TypedValue {
    /// Wrap `value`; its type must be registered in `domain`.
    pub fn new<T: 'static>(domain: &Rc<TypeDomain>, value: T) -> CalcResult<Self> {
        let ty = TypeId::of::<T>();
        if !domain.is_known(ty) {
            return Err(invalid_value(format_args!(
                "type {} is not part of this domain",
                std::any::type_name::<T>()
            )));
        }
        Ok(TypedValue {
            domain: Rc::clone(domain),
            ty,
            payload: Rc::new(value),
        })
    }

    pub fn domain(&self) -> &Rc<TypeDomain> {
        &self.domain
    }

    pub fn type_id(&self) -> TypeId {
        self.ty
    }

    pub fn type_name(&self) -> &'static str {
        self.domain.name(self.ty)
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.ty == TypeId::of::<T>()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.payload.downcast_ref()
    }

    /// Borrow the payload as `T`, failing with a type error otherwise.
    pub fn get<T: 'static>(&self) -> CalcResult<&T> {
        self.downcast_ref().ok_or_else(|| {
            invalid_value(format_args!(
                "expected {}, got {self:?}",
                std::any::type_name::<T>()
            ))
        })
    }

    /// This value as type `target`, converting if needed.
    pub fn convert(&self, target: TypeId) -> CalcResult<TypedValue> {
        if self.ty == target {
            return Ok(self.clone());
        }
        let payload = self.domain.convert_payload(self.ty, target, self.payload.as_ref())?;
        Ok(TypedValue {
            domain: Rc::clone(&self.domain),
            ty: target,
            payload,
        })
    }

    /// The payload as `T`, converting if needed.
    pub fn unwrap_as<T: Clone + 'static>(&self) -> CalcResult<T> {
        self.convert(TypeId::of::<T>())?.get::<T>().cloned()
    }

    /// `None` for types that are neither true nor false.
    pub fn truthiness(&self) -> Option<bool> {
        self.domain.truth_of(self.ty, self.payload.as_ref())
    }

    /// Truthiness, with undefined truth as an error.
    pub fn is_truthy(&self) -> CalcResult<bool> {
        self.truthiness()
            .ok_or_else(|| invalid_value(format_args!("{self:?} is neither true nor false")))
    }
}

impl PartialEq for TypedValue {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.domain, &other.domain)
            && self.ty == other.ty
            && self
                .domain
                .payload_eq(self.ty, self.payload.as_ref(), other.payload.as_ref())
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.domain.print(self.ty, self.payload.as_ref(), f)
    }
}

impl fmt::Debug for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({self})", self.type_name())
    }
}
