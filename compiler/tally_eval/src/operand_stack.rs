//! The value stack of a frame.

use std::fmt;
use tally_ir::{stack_underflow, CalcResult};

/// LIFO value stack. Popping past the bottom is an error, never a default.
#[derive(Clone, PartialEq)]
pub struct Stack<V> {
    values: Vec<V>,
}

impl<V> Stack<V> {
    pub fn new() -> Self {
        Stack { values: Vec::new() }
    }

    #[inline]
    pub fn push(&mut self, value: V) {
        self.values.push(value);
    }

    #[inline]
    pub fn pop(&mut self) -> CalcResult<V> {
        self.values
            .pop()
            .ok_or_else(|| stack_underflow("pop from empty stack"))
    }

    /// Pop the top `count` values, returned bottom-first.
    pub fn pop_many(&mut self, count: usize) -> CalcResult<Vec<V>> {
        let len = self.values.len();
        if count > len {
            return Err(stack_underflow(format_args!(
                "need {count} value(s), stack holds {len}"
            )));
        }
        Ok(self.values.split_off(len - count))
    }

    pub fn peek(&self) -> CalcResult<&V> {
        self.values
            .last()
            .ok_or_else(|| stack_underflow("peek at empty stack"))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Values bottom-first.
    pub fn as_slice(&self) -> &[V] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.values.iter()
    }

    pub fn into_vec(self) -> Vec<V> {
        self.values
    }
}

impl<V> Default for Stack<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Extend<V> for Stack<V> {
    fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        self.values.extend(iter);
    }
}

impl<V> FromIterator<V> for Stack<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Stack {
            values: iter.into_iter().collect(),
        }
    }
}

impl<'a, V> IntoIterator for &'a Stack<V> {
    type Item = &'a V;
    type IntoIter = std::slice::Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<V: fmt::Debug> fmt::Debug for Stack<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.values).finish()
    }
}
