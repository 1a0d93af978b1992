//! Execution frames: one scope layer plus one value stack.

use tally_ir::{unknown_symbol, CalcResult};

use crate::operand_stack::Stack;
use crate::scope::{LocalScope, SymbolTable};
use crate::symbol::Symbol;

/// A scope layer and the stack that code running in it works on.
///
/// Frames live only as long as the code they run: the top frame for the
/// lifetime of the environment, every other frame for one call, `let`
/// block or fold.
pub struct Frame<V> {
    scope: LocalScope<SymbolTable<V>>,
    stack: Stack<V>,
}

impl<V> Frame<V> {
    /// A frame with a fresh root scope.
    pub fn new_root() -> Self {
        Frame {
            scope: LocalScope::new(SymbolTable::new()),
            stack: Stack::new(),
        }
    }

    /// A frame whose scope is a new layer over `parent`, with an empty stack.
    pub fn with_parent(parent: &LocalScope<SymbolTable<V>>) -> Self {
        Frame {
            scope: LocalScope::new(SymbolTable::with_parent(parent.clone())),
            stack: Stack::new(),
        }
    }

    /// A child of this frame's scope, with an empty stack.
    pub fn child(&self) -> Self {
        Frame::with_parent(&self.scope)
    }

    #[inline]
    pub fn scope(&self) -> &LocalScope<SymbolTable<V>> {
        &self.scope
    }

    #[inline]
    pub fn stack(&self) -> &Stack<V> {
        &self.stack
    }

    #[inline]
    pub fn stack_mut(&mut self) -> &mut Stack<V> {
        &mut self.stack
    }

    pub fn into_stack(self) -> Stack<V> {
        self.stack
    }

    /// Bind `name` in this frame's own layer.
    pub fn define(&self, name: impl Into<String>, symbol: Symbol<V>) {
        self.scope.borrow_mut().define(name, symbol);
    }
}

impl<V: Clone> Frame<V> {
    /// Resolve `name` through the scope chain.
    pub fn lookup(&self, name: &str) -> CalcResult<Symbol<V>> {
        self.scope
            .borrow()
            .lookup(name)
            .ok_or_else(|| unknown_symbol(name))
    }
}

impl<V> Default for Frame<V> {
    fn default() -> Self {
        Self::new_root()
    }
}
