//! The bundled typed-value dialect.
//!
//! Values are `int` (i64, checked), `float`, `bool`, `str`, `<null>` and
//! `cons` pairs. Booleans widen to numbers and ints to floats, so mixed
//! arithmetic like `2 * true` or `1 + 0.5` does what it reads as.
//!
//! `[a, b, c]` builds a list in prefix and infix, and `let` takes `:` or
//! `=` between a name and its value. `#form` and `quote(form)` turn source
//! text into data in every notation.

mod functions;
mod operators;
mod quote;
mod types;

use std::rc::Rc;

use tally_eval::{install_generic_functions, Environment};
use tally_ir::{CalcResult, Token};
use tally_parse::Compilers;

use crate::cons::Null;
use crate::domain::TypeDomain;
use crate::value::TypedValue;

/// Everything a calculator over [`TypedValue`]s needs.
pub struct TypedDialect {
    pub domain: Rc<TypeDomain>,
    pub compilers: Compilers<TypedValue>,
    pub environment: Environment<TypedValue>,
}

impl TypedDialect {
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn new() -> CalcResult<Self> {
        let domain = Rc::new(types::domain()?);
        let operators = Rc::new(operators::dictionary(&domain)?);

        let value_domain = Rc::clone(&domain);
        let mut compilers = Compilers::new(Rc::clone(&operators), move |token: &Token| {
            types::parse_value(&value_domain, token)
        })?;
        compilers.add_container("[", "list")?;
        compilers.add_let("let", &[":", "="])?;
        compilers.add_quote(
            quote::QUOTE_MODIFIER,
            quote::QUOTE_SYMBOL,
            Rc::new(quote::ConsQuote::new(&domain)),
        )?;

        let environment = Environment::new(TypedValue::new(&domain, Null)?);
        install_generic_functions(&environment);
        functions::install(&environment, &domain, &operators)?;

        tracing::debug!(?domain, "typed dialect ready");
        Ok(TypedDialect {
            domain,
            compilers,
            environment,
        })
    }
}
