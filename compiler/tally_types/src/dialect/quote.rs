//! `#form` and `quote(form)`: source text as data.
//!
//! Numbers and strings keep their values, any other token becomes a `str`
//! of its text, and a bracket group becomes a `cons` list ending in
//! `null`. `#()` is `null` itself.

use std::rc::Rc;

use tally_ir::CalcResult;
use tally_parse::{QuoteBuilder, Quoted};

use crate::cons::Cons;
use crate::domain::TypeDomain;
use crate::value::TypedValue;

pub(super) const QUOTE_MODIFIER: &str = "#";
pub(super) const QUOTE_SYMBOL: &str = "quote";

pub(super) struct ConsQuote {
    domain: Rc<TypeDomain>,
}

impl ConsQuote {
    pub fn new(domain: &Rc<TypeDomain>) -> Self {
        ConsQuote {
            domain: Rc::clone(domain),
        }
    }
}

impl QuoteBuilder<TypedValue> for ConsQuote {
    fn build(&self, form: Quoted<TypedValue>) -> CalcResult<TypedValue> {
        match form {
            Quoted::Value(value) => Ok(value),
            Quoted::Symbol(text) => TypedValue::new(&self.domain, text),
            Quoted::List(items) => {
                let items = items
                    .into_iter()
                    .map(|item| self.build(item))
                    .collect::<CalcResult<Vec<_>>>()?;
                Cons::list(&self.domain, &items)
            }
        }
    }
}
