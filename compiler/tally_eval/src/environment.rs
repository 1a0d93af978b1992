//! The persistent top frame of a calculator.

use tally_ir::CalcResult;

use crate::exec::execute;
use crate::frame::Frame;
use crate::instruction::Program;
use crate::symbol::Symbol;
use crate::value::CalcValue;

/// Name bound to the result of the last top-level evaluation.
pub const LAST_ANSWER: &str = "$ans";

/// Global bindings and stack, kept across evaluations.
pub struct Environment<V> {
    top: Frame<V>,
    null_value: V,
}

impl<V: CalcValue> Environment<V> {
    /// `null_value` is what a dialect uses for "nothing" (empty results,
    /// empty folds).
    pub fn new(null_value: V) -> Self {
        Environment {
            top: Frame::new_root(),
            null_value,
        }
    }

    pub fn null_value(&self) -> &V {
        &self.null_value
    }

    pub fn top_frame(&self) -> &Frame<V> {
        &self.top
    }

    pub fn top_frame_mut(&mut self) -> &mut Frame<V> {
        &mut self.top
    }

    /// Install a global binding, replacing any previous one.
    pub fn set_global_symbol(&self, name: impl Into<String>, symbol: Symbol<V>) {
        self.top.define(name, symbol);
    }

    /// Run against the top frame; results stay on the global stack.
    pub fn execute(&mut self, program: &Program<V>) -> CalcResult<()> {
        execute(program, &mut self.top)
    }

    /// Run and pop the single result, binding it as [`LAST_ANSWER`].
    ///
    /// An empty stack binds the null value and yields `None`.
    pub fn execute_and_pop(&mut self, program: &Program<V>) -> CalcResult<Option<V>> {
        self.execute(program)?;
        let answer = if self.top.stack().is_empty() {
            None
        } else {
            Some(self.top.stack_mut().pop()?)
        };
        let bound = answer.clone().unwrap_or_else(|| self.null_value.clone());
        tracing::debug!(answer = %bound, "bound last answer");
        self.set_global_symbol(LAST_ANSWER, Symbol::Value(bound));
        Ok(answer)
    }

    /// Run in a fresh child of the top frame with its own stack and return
    /// whatever it leaves. Global bindings are visible but can't be changed.
    pub fn execute_isolated(&self, program: &Program<V>) -> CalcResult<Vec<V>> {
        let mut frame = self.top.child();
        execute(program, &mut frame)?;
        Ok(frame.into_stack().into_vec())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests {
    use super::*;
    use crate::instruction::{Instruction, SymbolCall};

    fn values(values: &[i64]) -> Program<i64> {
        values.iter().copied().map(Instruction::Value).collect()
    }

    #[test]
    fn test_execute_and_pop_binds_last_answer() {
        let mut env = Environment::new(0);
        assert_eq!(env.execute_and_pop(&values(&[5])).unwrap(), Some(5));
        let ans: Program<i64> = [Instruction::SymbolGet(LAST_ANSWER.to_string())]
            .into_iter()
            .collect();
        assert_eq!(env.execute_and_pop(&ans).unwrap(), Some(5));
    }

    #[test]
    fn test_execute_and_pop_empty_binds_null() {
        let mut env = Environment::new(-1);
        env.execute_and_pop(&values(&[5])).unwrap();
        assert_eq!(env.execute_and_pop(&values(&[])).unwrap(), None);
        let ans = env
            .top_frame()
            .lookup(LAST_ANSWER)
            .unwrap()
            .get(LAST_ANSWER)
            .unwrap();
        assert_eq!(ans, -1);
    }

    #[test]
    fn test_execute_and_pop_leaves_rest_of_stack() {
        let mut env = Environment::new(0);
        assert_eq!(env.execute_and_pop(&values(&[1, 2, 3])).unwrap(), Some(3));
        assert_eq!(env.top_frame().stack().as_slice(), &[1, 2]);
    }

    #[test]
    fn test_execute_isolated_does_not_touch_globals() {
        let mut env = Environment::new(0);
        env.set_global_symbol("g", Symbol::Value(9));
        env.execute(&values(&[1])).unwrap();
        let program: Program<i64> = [
            Instruction::Value(2),
            Instruction::SymbolCall(SymbolCall::inferred("g")),
        ]
        .into_iter()
        .collect();
        assert_eq!(env.execute_isolated(&program).unwrap(), vec![2, 9]);
        assert_eq!(env.top_frame().stack().as_slice(), &[1]);
    }

    #[test]
    fn test_set_global_symbol_replaces() {
        let env = Environment::new(0);
        env.set_global_symbol("x", Symbol::Value(1));
        env.set_global_symbol("x", Symbol::Value(2));
        assert_eq!(env.top_frame().lookup("x").unwrap().get("x").unwrap(), 2);
    }
}
