//! Tally Types - a typed value universe with multi-dispatch.
//!
//! A [`TypeDomain`] registers the runtime types, how they convert into
//! each other and how operand pairs coerce. [`TypedValue`] carries a value
//! together with its domain. [`TypedFunction`] and the typed operator
//! builders dispatch on argument types, with overlaps rejected when the
//! table is built rather than when it is called.
//!
//! [`TypedDialect`] bundles a ready-made domain, operator table and
//! function library.

mod cons;
mod dialect;
mod domain;
mod function;
mod operator;
mod value;

pub use cons::{Cons, Null};
pub use dialect::TypedDialect;
pub use domain::{Coercion, TypeDomain};
pub use function::{TypedFunction, Variant};
pub use operator::{TypedBinary, TypedUnary};
pub use value::TypedValue;
