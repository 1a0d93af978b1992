//! Symbol scopes.
//!
//! Each frame owns one [`SymbolTable`] layer; layers chain to the layer
//! they were created from. Definitions always go into the owning layer and
//! lookups walk outward, so an inner scope can shadow but never mutate an
//! outer one.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use crate::symbol::Symbol;

/// A single-threaded shared scope handle.
///
/// Wraps `Rc<RefCell<T>>` so that closures (local functions, lazy
/// constants) can keep their defining scope alive after the defining frame
/// has finished executing. Scope chains only ever point outward, so no
/// reference cycles can form.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

impl<T: Default> Default for LocalScope<T> {
    fn default() -> Self {
        LocalScope::new(T::default())
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// One layer of name bindings.
pub struct SymbolTable<V> {
    symbols: FxHashMap<String, Symbol<V>>,
    parent: Option<LocalScope<SymbolTable<V>>>,
}

impl<V> SymbolTable<V> {
    /// A root layer with no parent.
    pub fn new() -> Self {
        SymbolTable {
            symbols: FxHashMap::default(),
            parent: None,
        }
    }

    pub fn with_parent(parent: LocalScope<SymbolTable<V>>) -> Self {
        SymbolTable {
            symbols: FxHashMap::default(),
            parent: Some(parent),
        }
    }

    /// Bind `name` in this layer, replacing any previous local binding.
    #[inline]
    pub fn define(&mut self, name: impl Into<String>, symbol: Symbol<V>) {
        self.symbols.insert(name.into(), symbol);
    }

    /// Remove a local binding. Outer layers are untouched.
    pub fn remove(&mut self, name: &str) -> Option<Symbol<V>> {
        self.symbols.remove(name)
    }

    #[inline]
    pub fn contains_local(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Names bound in this layer only, sorted.
    pub fn local_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.symbols.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<V: Clone> SymbolTable<V> {
    /// Look `name` up in this layer, then outward through the parents.
    pub fn lookup(&self, name: &str) -> Option<Symbol<V>> {
        if let Some(symbol) = self.symbols.get(name) {
            return Some(symbol.clone());
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.borrow().lookup(name))
    }
}

impl<V> Default for SymbolTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for SymbolTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolTable")
            .field("symbols", &self.local_names())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}
