//! The calculator facade.

use tally_eval::{execute, CalcValue, Environment, Frame, Program, Stack, Symbol, LAST_ANSWER};
use tally_ir::{CalcResult, Notation};
use tally_parse::Compilers;
use tally_types::{TypedDialect, TypedValue};

use crate::float::float_dialect;
use crate::integer::integer_dialect;

/// Compilers for every notation plus the global environment they share.
///
/// Dialect tables are fixed once the calculator exists. Only the global
/// frame changes afterwards: through [`set_global_symbol`], through values
/// left on the global stack, and through the `$ans` binding that
/// [`execute_and_pop`] maintains.
///
/// [`set_global_symbol`]: Calculator::set_global_symbol
/// [`execute_and_pop`]: Calculator::execute_and_pop
pub struct Calculator<V> {
    compilers: Compilers<V>,
    env: Environment<V>,
}

impl<V: CalcValue> Calculator<V> {
    pub fn new(compilers: Compilers<V>, env: Environment<V>) -> Self {
        Calculator { compilers, env }
    }

    /// Compile without running. Compile-time folds (`[..]` in postfix,
    /// `const(..)` and a backtick prefix elsewhere) see the current globals.
    pub fn compile(&self, notation: Notation, text: &str) -> CalcResult<Program<V>> {
        self.compilers.compile(notation, text, &self.env)
    }

    /// Run `program` against an arbitrary frame.
    pub fn execute(&self, program: &Program<V>, frame: &mut Frame<V>) -> CalcResult<()> {
        execute(program, frame)
    }

    /// Run against the global frame and pop the answer, binding it as
    /// `$ans`. An empty stack yields `None` and binds the null value.
    pub fn execute_and_pop(&mut self, program: &Program<V>) -> CalcResult<Option<V>> {
        self.env.execute_and_pop(program)
    }

    /// Compile `text` and [`execute_and_pop`](Self::execute_and_pop) it.
    pub fn compile_and_execute(&mut self, notation: Notation, text: &str) -> CalcResult<Option<V>> {
        let program = self.compile(notation, text)?;
        tracing::debug!(%notation, %program, "evaluating");
        self.execute_and_pop(&program)
    }

    /// Bind `name` globally, replacing any previous binding.
    pub fn set_global_symbol(&self, name: impl Into<String>, symbol: Symbol<V>) {
        self.env.set_global_symbol(name, symbol);
    }

    /// Values left behind by earlier evaluations.
    pub fn global_stack(&self) -> &Stack<V> {
        self.env.top_frame().stack()
    }

    /// Drop everything on the global stack.
    pub fn clear_global_stack(&mut self) {
        self.env.top_frame_mut().stack_mut().clear();
    }

    /// The last answer, or the null value before the first evaluation.
    pub fn last_answer(&self) -> CalcResult<V> {
        match self.env.top_frame().lookup(LAST_ANSWER) {
            Ok(symbol) => symbol.get(LAST_ANSWER),
            Err(_) => Ok(self.env.null_value().clone()),
        }
    }

    pub fn environment(&self) -> &Environment<V> {
        &self.env
    }

    pub fn compilers_mut(&mut self) -> &mut Compilers<V> {
        &mut self.compilers
    }
}

impl Calculator<TypedValue> {
    /// A calculator over the typed dialect.
    pub fn typed() -> CalcResult<Self> {
        let dialect = TypedDialect::new()?;
        Ok(Calculator::new(dialect.compilers, dialect.environment))
    }
}

impl Calculator<i64> {
    /// A calculator over checked 64-bit integers.
    pub fn integer() -> CalcResult<Self> {
        let (compilers, env) = integer_dialect()?;
        Ok(Calculator::new(compilers, env))
    }
}

impl Calculator<f64> {
    /// A calculator over IEEE 64-bit floats.
    pub fn float() -> CalcResult<Self> {
        let (compilers, env) = float_dialect()?;
        Ok(Calculator::new(compilers, env))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
