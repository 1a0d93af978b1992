//! Pairs and the empty value they terminate with.

use std::fmt;
use std::rc::Rc;

use tally_ir::CalcResult;

use crate::domain::TypeDomain;
use crate::value::TypedValue;

/// The typed dialect's "nothing". Also terminates proper lists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Null;

impl fmt::Display for Null {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("null")
    }
}

/// A pair of values. Chains ending in [`Null`] are lists.
#[derive(Clone, Debug, PartialEq)]
pub struct Cons {
    pub car: TypedValue,
    pub cdr: TypedValue,
}

impl Cons {
    pub fn new(car: TypedValue, cdr: TypedValue) -> Self {
        Cons { car, cdr }
    }

    /// Build a proper list; an empty slice gives `null`.
    pub fn list(domain: &Rc<TypeDomain>, values: &[TypedValue]) -> CalcResult<TypedValue> {
        values
            .iter()
            .rev()
            .try_fold(TypedValue::new(domain, Null)?, |tail, head| {
                TypedValue::new(domain, Cons::new(head.clone(), tail))
            })
    }

    /// Number of cells in the chain starting here.
    pub fn cell_count(&self) -> usize {
        let mut count = 1;
        let mut rest = &self.cdr;
        while let Some(next) = rest.downcast_ref::<Cons>() {
            count += 1;
            rest = &next.cdr;
        }
        count
    }

    /// Whether the chain ends in `null`.
    pub fn is_list(&self) -> bool {
        let mut rest = &self.cdr;
        while let Some(next) = rest.downcast_ref::<Cons>() {
            rest = &next.cdr;
        }
        rest.is::<Null>()
    }
}

impl fmt::Display for Cons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.car)?;
        let mut rest = &self.cdr;
        loop {
            if let Some(next) = rest.downcast_ref::<Cons>() {
                write!(f, ", {}", next.car)?;
                rest = &next.cdr;
            } else if rest.is::<Null>() {
                break;
            } else {
                write!(f, " . {rest}")?;
                break;
            }
        }
        f.write_str("]")
    }
}
