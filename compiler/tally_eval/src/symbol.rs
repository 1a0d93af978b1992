//! Bound names and the call contract.
//!
//! Every callee, native or user-defined, is invoked through one contract:
//! `call(frame, args, rets)`, where `None` lets the callee decide and
//! `Some(n)` must be honoured exactly or rejected.

use std::fmt;
use std::rc::Rc;

use tally_ir::{arity_mismatch, stack_validation, CalcResult};

use crate::frame::Frame;

/// Something that can be invoked from a symbol-call instruction.
///
/// Callees operate on the caller's frame: they pop their arguments from
/// its stack and push their results onto it.
pub trait Callable<V> {
    fn call(&self, frame: &mut Frame<V>, args: Option<usize>, rets: Option<usize>)
        -> CalcResult<()>;
}

/// A value computed each time the symbol is read.
pub trait Gettable<V> {
    fn get(&self) -> CalcResult<V>;
}

/// What a name is bound to.
pub enum Symbol<V> {
    /// A plain value.
    Value(V),
    /// A value recomputed on every read.
    Gettable(Rc<dyn Gettable<V>>),
    /// A function.
    Callable(Rc<dyn Callable<V>>),
}

impl<V> Clone for Symbol<V>
where
    V: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Symbol::Value(value) => Symbol::Value(value.clone()),
            Symbol::Gettable(getter) => Symbol::Gettable(Rc::clone(getter)),
            Symbol::Callable(callable) => Symbol::Callable(Rc::clone(callable)),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Symbol<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Symbol::Gettable(_) => f.write_str("Gettable(..)"),
            Symbol::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

struct NativeGettable<F>(F);

impl<V, F> Gettable<V> for NativeGettable<F>
where
    F: Fn() -> CalcResult<V>,
{
    fn get(&self) -> CalcResult<V> {
        (self.0)()
    }
}

struct NativeCallable<F>(F);

impl<V, F> Callable<V> for NativeCallable<F>
where
    F: Fn(&mut Frame<V>, Option<usize>, Option<usize>) -> CalcResult<()>,
{
    fn call(
        &self,
        frame: &mut Frame<V>,
        args: Option<usize>,
        rets: Option<usize>,
    ) -> CalcResult<()> {
        (self.0)(frame, args, rets)
    }
}

impl<V: Clone + 'static> Symbol<V> {
    pub fn gettable(getter: impl Gettable<V> + 'static) -> Self {
        Symbol::Gettable(Rc::new(getter))
    }

    pub fn callable(callable: impl Callable<V> + 'static) -> Self {
        Symbol::Callable(Rc::new(callable))
    }

    /// A gettable backed by a closure.
    pub fn getter(f: impl Fn() -> CalcResult<V> + 'static) -> Self {
        Symbol::gettable(NativeGettable(f))
    }

    /// A callable backed by a closure that handles the counts itself.
    pub fn native(
        f: impl Fn(&mut Frame<V>, Option<usize>, Option<usize>) -> CalcResult<()> + 'static,
    ) -> Self {
        Symbol::callable(NativeCallable(f))
    }

    /// A fixed-arity callable; counts are checked before `f` runs.
    pub fn fixed(
        name: impl Into<String>,
        args: usize,
        rets: usize,
        f: impl Fn(&mut Frame<V>) -> CalcResult<()> + 'static,
    ) -> Self {
        Symbol::callable(FixedCallable::new(name, args, rets, f))
    }

    /// Read the symbol as a value. Functions can't be read.
    pub fn get(&self, name: &str) -> CalcResult<V> {
        match self {
            Symbol::Value(value) => Ok(value.clone()),
            Symbol::Gettable(getter) => getter.get(),
            Symbol::Callable(_) => Err(stack_validation(format_args!(
                "'{name}' is a function and can't be read as a value"
            ))),
        }
    }

    /// Invoke the symbol.
    ///
    /// Values may be "called" with no arguments and one result, which
    /// pushes the value; any other counts are a contract violation.
    pub fn call(
        &self,
        name: &str,
        frame: &mut Frame<V>,
        args: Option<usize>,
        rets: Option<usize>,
    ) -> CalcResult<()> {
        match self {
            Symbol::Callable(callable) => callable.call(frame, args, rets),
            Symbol::Value(_) | Symbol::Gettable(_) => {
                check_count("argument(s)", name, 0, args)?;
                check_count("result(s)", name, 1, rets)?;
                let value = self.get(name)?;
                frame.stack_mut().push(value);
                Ok(())
            }
        }
    }
}

/// Resolve an optional count against the only count a callee accepts.
pub fn check_count(
    what: &str,
    name: &str,
    expected: usize,
    given: Option<usize>,
) -> CalcResult<usize> {
    match given {
        Some(given) if given != expected => Err(arity_mismatch(what, name, expected, given)),
        _ => Ok(expected),
    }
}

/// A callable with exact argument and result counts.
///
/// Counts given at the call site are checked up front, and the number of
/// values the body leaves behind is checked afterwards.
pub struct FixedCallable<F> {
    name: String,
    args: usize,
    rets: usize,
    body: F,
}

impl<F> FixedCallable<F> {
    pub fn new(name: impl Into<String>, args: usize, rets: usize, body: F) -> Self {
        FixedCallable {
            name: name.into(),
            args,
            rets,
            body,
        }
    }
}

impl<V, F> Callable<V> for FixedCallable<F>
where
    F: Fn(&mut Frame<V>) -> CalcResult<()>,
{
    fn call(
        &self,
        frame: &mut Frame<V>,
        args: Option<usize>,
        rets: Option<usize>,
    ) -> CalcResult<()> {
        check_count("argument(s)", &self.name, self.args, args)?;
        check_count("result(s)", &self.name, self.rets, rets)?;
        let available = frame.stack().len();
        if available < self.args {
            return Err(arity_mismatch("argument(s)", &self.name, self.args, available));
        }
        let floor = available - self.args;
        (self.body)(frame)?;
        let remaining = frame.stack().len();
        if remaining < floor {
            return Err(stack_validation(format_args!(
                "'{}' consumed {} value(s) below its {} argument(s)",
                self.name,
                floor - remaining,
                self.args
            )));
        }
        let produced = remaining - floor;
        if produced != self.rets {
            return Err(arity_mismatch("result(s)", &self.name, self.rets, produced));
        }
        Ok(())
    }
}
