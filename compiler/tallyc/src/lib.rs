//! Tallyc - the embeddable calculator.
//!
//! [`Calculator`] ties a dialect's compilers to a persistent environment:
//! text in any [`Notation`] compiles to a program, which runs against the
//! global frame. Three dialects come bundled:
//! - [`Calculator::typed`]: ints, floats, bools, strings and lists
//! - [`Calculator::integer`]: checked `i64` arithmetic
//! - [`Calculator::float`]: IEEE `f64` arithmetic with the usual math library
//!
//! Answers of any bundled dialect can be printed in another radix through
//! [`RadixDisplay`].
//!
//! ```text
//! let mut calc = Calculator::typed()?;
//! calc.compile_and_execute(Notation::Infix, "2 * (1 + 0.5)")?; // Some(3.0)
//! ```

mod calculator;
mod float;
mod integer;
mod radix;
mod tracing_setup;

pub use calculator::Calculator;
pub use float::float_dialect;
pub use integer::integer_dialect;
pub use radix::RadixDisplay;
pub use tally_lexer::{PositionalPrinter, DEFAULT_FRACTION_DIGITS};
pub use tally_ir::{CalcError, CalcResult, Notation};
pub use tracing_setup::init_tracing;
