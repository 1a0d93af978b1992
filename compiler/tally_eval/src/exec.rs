//! The interpreter loop.

use tally_ir::CalcResult;

use crate::frame::Frame;
use crate::instruction::Program;
use crate::stack::ensure_sufficient_stack;
use crate::value::CalcValue;

/// Run `program` against `frame`, stopping at the first error.
///
/// Values pushed before the failing instruction stay on the stack; callers
/// that need all-or-nothing behaviour run against a child frame.
pub fn execute<V: CalcValue>(program: &Program<V>, frame: &mut Frame<V>) -> CalcResult<()> {
    ensure_sufficient_stack(|| {
        for instruction in program {
            tracing::trace!(instruction = %instruction.serialize(), depth = frame.stack().len(), "exec");
            instruction.execute(frame)?;
        }
        Ok(())
    })
}
