//! Runtime of `let` blocks.
//!
//! A block binds names in a fresh scope layer over the frame it runs in,
//! runs its body there and appends whatever the body leaves to the outer
//! stack. Bindings are created against the outer scope, so they can't
//! see each other or themselves.

use std::cell::OnceCell;
use std::rc::Rc;

use tally_ir::{arity_mismatch, stack_validation, CalcResult};

use crate::exec::execute;
use crate::frame::Frame;
use crate::instruction::Program;
use crate::scope::{LocalScope, SymbolTable};
use crate::symbol::{check_count, Callable, Gettable, Symbol};
use crate::value::CalcValue;

/// What a `let` name is bound to.
pub enum LetBindingKind<V> {
    /// `name: expr`, evaluated once on first read.
    Constant(Rc<Program<V>>),
    /// `name(a, b): expr`, a fixed-arity local function.
    Function {
        params: Rc<[String]>,
        body: Rc<Program<V>>,
    },
}

pub struct LetBinding<V> {
    pub name: String,
    pub kind: LetBindingKind<V>,
}

impl<V> LetBinding<V> {
    pub fn constant(name: impl Into<String>, value: Program<V>) -> Self {
        LetBinding {
            name: name.into(),
            kind: LetBindingKind::Constant(Rc::new(value)),
        }
    }

    pub fn function(name: impl Into<String>, params: Vec<String>, body: Program<V>) -> Self {
        LetBinding {
            name: name.into(),
            kind: LetBindingKind::Function {
                params: params.into(),
                body: Rc::new(body),
            },
        }
    }
}

/// Bindings plus the body they are visible in.
pub struct LetBlock<V> {
    bindings: Vec<LetBinding<V>>,
    body: Program<V>,
}

impl<V: CalcValue> LetBlock<V> {
    pub fn new(bindings: Vec<LetBinding<V>>, body: Program<V>) -> Self {
        LetBlock { bindings, body }
    }

    pub fn bindings(&self) -> &[LetBinding<V>] {
        &self.bindings
    }

    pub fn execute(&self, frame: &mut Frame<V>) -> CalcResult<()> {
        let bind_site = frame.scope();
        let mut let_frame = frame.child();
        for binding in &self.bindings {
            let symbol = match &binding.kind {
                LetBindingKind::Constant(program) => Symbol::gettable(LazyConstant {
                    name: binding.name.clone(),
                    scope: bind_site.clone(),
                    program: Rc::clone(program),
                    value: OnceCell::new(),
                }),
                LetBindingKind::Function { params, body } => Symbol::callable(LocalFunction {
                    name: binding.name.clone(),
                    params: Rc::clone(params),
                    body: Rc::clone(body),
                    scope: bind_site.clone(),
                }),
            };
            let_frame.define(binding.name.clone(), symbol);
        }
        execute(&self.body, &mut let_frame)?;
        frame.stack_mut().extend(let_frame.into_stack().into_vec());
        Ok(())
    }
}

struct LazyConstant<V> {
    name: String,
    scope: LocalScope<SymbolTable<V>>,
    program: Rc<Program<V>>,
    value: OnceCell<V>,
}

impl<V: CalcValue> Gettable<V> for LazyConstant<V> {
    fn get(&self) -> CalcResult<V> {
        if let Some(value) = self.value.get() {
            return Ok(value.clone());
        }
        let mut frame = Frame::with_parent(&self.scope);
        execute(&self.program, &mut frame)?;
        let produced = frame.stack().len();
        if produced != 1 {
            return Err(stack_validation(format_args!(
                "'{}' must evaluate to exactly one value, got {produced}",
                self.name
            )));
        }
        let value = frame.stack_mut().pop()?;
        Ok(self.value.get_or_init(|| value).clone())
    }
}

struct LocalFunction<V> {
    name: String,
    params: Rc<[String]>,
    body: Rc<Program<V>>,
    scope: LocalScope<SymbolTable<V>>,
}

impl<V: CalcValue> Callable<V> for LocalFunction<V> {
    fn call(
        &self,
        frame: &mut Frame<V>,
        args: Option<usize>,
        rets: Option<usize>,
    ) -> CalcResult<()> {
        let arity = check_count("argument(s)", &self.name, self.params.len(), args)?;
        let available = frame.stack().len();
        if available < arity {
            return Err(arity_mismatch("argument(s)", &self.name, arity, available));
        }
        let values = frame.stack_mut().pop_many(arity)?;

        let mut local = Frame::with_parent(&self.scope);
        for (param, value) in self.params.iter().zip(values) {
            local.define(param.clone(), Symbol::Value(value));
        }
        execute(&self.body, &mut local)?;

        let produced = local.stack().len();
        if let Some(expected) = rets {
            if produced != expected {
                return Err(arity_mismatch("result(s)", &self.name, expected, produced));
            }
        }
        frame.stack_mut().extend(local.into_stack().into_vec());
        Ok(())
    }
}
