//! Stack functions every dialect installs, and the accumulator builder
//! dialects use for their n-ary folds.

use tally_ir::{arity_mismatch, CalcError, CalcResult};

use crate::environment::Environment;
use crate::frame::Frame;
use crate::symbol::{check_count, Symbol};
use crate::value::CalcValue;

/// Install `swap`, `pop`, `dup` and `fail`.
pub fn install_generic_functions<V: CalcValue>(env: &Environment<V>) {
    env.set_global_symbol(
        "swap",
        Symbol::fixed("swap", 2, 2, |frame: &mut Frame<V>| {
            let stack = frame.stack_mut();
            let first = stack.pop()?;
            let second = stack.pop()?;
            stack.push(first);
            stack.push(second);
            Ok(())
        }),
    );

    env.set_global_symbol(
        "pop",
        Symbol::native(|frame: &mut Frame<V>, args, rets| {
            check_count("result(s)", "pop", 0, rets)?;
            let count = args.unwrap_or(1);
            frame.stack_mut().pop_many(count)?;
            Ok(())
        }),
    );

    // dup@K,L: repeat the top K values cyclically until L values are out.
    env.set_global_symbol(
        "dup",
        Symbol::native(|frame: &mut Frame<V>, args, rets| {
            let count = args.unwrap_or(1);
            let out = rets.unwrap_or(2 * count);
            if count == 0 {
                return match out {
                    0 => Ok(()),
                    _ => Err(arity_mismatch("argument(s)", "dup", 1, 0)),
                };
            }
            let values = frame.stack_mut().pop_many(count)?;
            let stack = frame.stack_mut();
            stack.extend(values.iter().cycle().take(out).cloned());
            Ok(())
        }),
    );

    env.set_global_symbol(
        "fail",
        Symbol::native(|frame: &mut Frame<V>, args, _rets| match args.unwrap_or(0) {
            0 => Err(CalcError::Execution(None)),
            1 => {
                let message = frame.stack_mut().pop()?;
                Err(CalcError::Execution(Some(message.to_string())))
            }
            given => Err(arity_mismatch("argument(s)", "fail", 1, given)),
        }),
    );
}

/// An n-ary fold: `args` values (default 2) are combined left to right and
/// passed through `finish` together with the count. Zero arguments push
/// `null`. Always exactly one result.
pub fn accumulator<V: CalcValue>(
    name: &'static str,
    null: V,
    combine: impl Fn(V, V) -> CalcResult<V> + 'static,
    finish: impl Fn(V, usize) -> CalcResult<V> + 'static,
) -> Symbol<V> {
    Symbol::native(move |frame: &mut Frame<V>, args, rets| {
        check_count("result(s)", name, 1, rets)?;
        let count = args.unwrap_or(2);
        if count == 0 {
            frame.stack_mut().push(null.clone());
            return Ok(());
        }
        let mut values = frame.stack_mut().pop_many(count)?.into_iter();
        let mut result = match values.next() {
            Some(first) => first,
            None => null.clone(),
        };
        for value in values {
            result = combine(result, value)?;
        }
        frame.stack_mut().push(finish(result, count)?);
        Ok(())
    })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
