//! Compiled instructions.

use std::fmt;
use std::rc::Rc;

use tally_ir::{CalcResult, ParseError};

use crate::frame::Frame;
use crate::let_block::LetBlock;
use crate::operator::{BinaryOperator, UnaryOperator};
use crate::value::CalcValue;

/// A named call with optional explicit counts: `name`, `name@2`, `name@2,1`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SymbolCall {
    pub name: String,
    pub args: Option<usize>,
    pub rets: Option<usize>,
}

impl SymbolCall {
    pub fn new(name: impl Into<String>, args: Option<usize>, rets: Option<usize>) -> Self {
        SymbolCall {
            name: name.into(),
            args,
            rets,
        }
    }

    /// A call that lets the callee pick both counts.
    pub fn inferred(name: impl Into<String>) -> Self {
        Self::new(name, None, None)
    }

    /// Parse the `name@args,rets` form. Either count may be left empty.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let malformed = || ParseError::MalformedCallCounts(text.to_string());
        let Some((name, counts)) = text.split_once('@') else {
            return Ok(Self::inferred(text));
        };
        if name.is_empty() {
            return Err(malformed());
        }
        let (args, rets) = match counts.split_once(',') {
            Some((args, rets)) => (args, Some(rets)),
            None if counts.is_empty() => return Err(malformed()),
            None => (counts, None),
        };
        let count = |part: &str| -> Result<Option<usize>, ParseError> {
            if part.is_empty() {
                Ok(None)
            } else {
                part.parse().map(Some).map_err(|_| malformed())
            }
        };
        Ok(Self::new(name, count(args)?, rets.map(count).transpose()?.flatten()))
    }

    /// Canonical postfix text: the name plus a count suffix when any
    /// count is explicit.
    pub fn serialize(&self) -> String {
        match (self.args, self.rets) {
            (None, None) => self.name.clone(),
            (Some(args), None) => format!("{}@{args}", self.name),
            (None, Some(rets)) => format!("{}@,{rets}", self.name),
            (Some(args), Some(rets)) => format!("{}@{args},{rets}", self.name),
        }
    }
}

impl fmt::Display for SymbolCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

/// One directly runnable step.
pub enum Instruction<V> {
    /// Push a constant.
    Value(V),
    /// Push the value bound to a name.
    SymbolGet(String),
    /// Invoke a named callable.
    SymbolCall(SymbolCall),
    UnaryOp(Rc<UnaryOperator<V>>),
    BinaryOp(Rc<BinaryOperator<V>>),
    /// Run a body with extra local bindings.
    Let(Rc<LetBlock<V>>),
}

impl<V: CalcValue> Instruction<V> {
    pub fn execute(&self, frame: &mut Frame<V>) -> CalcResult<()> {
        match self {
            Instruction::Value(value) => {
                frame.stack_mut().push(value.clone());
                Ok(())
            }
            Instruction::SymbolGet(name) => {
                let value = frame.lookup(name)?.get(name)?;
                frame.stack_mut().push(value);
                Ok(())
            }
            Instruction::SymbolCall(call) => {
                let symbol = frame.lookup(&call.name)?;
                symbol.call(&call.name, frame, call.args, call.rets)
            }
            Instruction::UnaryOp(op) => op.execute(frame.stack_mut()),
            Instruction::BinaryOp(op) => op.execute(frame.stack_mut()),
            Instruction::Let(block) => block.execute(frame),
        }
    }
}

impl<V: fmt::Display> Instruction<V> {
    /// Postfix-style text for this instruction.
    pub fn serialize(&self) -> String {
        match self {
            Instruction::Value(value) => value.to_string(),
            Instruction::SymbolGet(name) => format!("@{name}"),
            Instruction::SymbolCall(call) => call.serialize(),
            Instruction::UnaryOp(op) => op.id.clone(),
            Instruction::BinaryOp(op) => op.id.clone(),
            Instruction::Let(_) => "<let>".to_string(),
        }
    }
}

impl<V: Clone> Clone for Instruction<V> {
    fn clone(&self) -> Self {
        match self {
            Instruction::Value(value) => Instruction::Value(value.clone()),
            Instruction::SymbolGet(name) => Instruction::SymbolGet(name.clone()),
            Instruction::SymbolCall(call) => Instruction::SymbolCall(call.clone()),
            Instruction::UnaryOp(op) => Instruction::UnaryOp(Rc::clone(op)),
            Instruction::BinaryOp(op) => Instruction::BinaryOp(Rc::clone(op)),
            Instruction::Let(block) => Instruction::Let(Rc::clone(block)),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Instruction<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Instruction::SymbolGet(name) => f.debug_tuple("SymbolGet").field(name).finish(),
            Instruction::SymbolCall(call) => write!(f, "SymbolCall({call})"),
            Instruction::UnaryOp(op) => write!(f, "UnaryOp({})", op.id),
            Instruction::BinaryOp(op) => write!(f, "BinaryOp({})", op.id),
            Instruction::Let(_) => f.write_str("Let(..)"),
        }
    }
}

/// Operators compare by identity; everything else structurally.
impl<V: PartialEq> PartialEq for Instruction<V> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Instruction::Value(a), Instruction::Value(b)) => a == b,
            (Instruction::SymbolGet(a), Instruction::SymbolGet(b)) => a == b,
            (Instruction::SymbolCall(a), Instruction::SymbolCall(b)) => a == b,
            (Instruction::UnaryOp(a), Instruction::UnaryOp(b)) => Rc::ptr_eq(a, b),
            (Instruction::BinaryOp(a), Instruction::BinaryOp(b)) => Rc::ptr_eq(a, b),
            (Instruction::Let(a), Instruction::Let(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A compiled sequence of instructions.
pub struct Program<V> {
    instructions: Vec<Instruction<V>>,
}

impl<V> Program<V> {
    pub fn new() -> Self {
        Program {
            instructions: Vec::new(),
        }
    }

    #[inline]
    pub fn push(&mut self, instruction: Instruction<V>) {
        self.instructions.push(instruction);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction<V>> {
        self.instructions.iter()
    }

    pub fn as_slice(&self) -> &[Instruction<V>] {
        &self.instructions
    }
}

impl<V> Default for Program<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Clone for Program<V> {
    fn clone(&self) -> Self {
        Program {
            instructions: self.instructions.clone(),
        }
    }
}

impl<V: PartialEq> PartialEq for Program<V> {
    fn eq(&self, other: &Self) -> bool {
        self.instructions == other.instructions
    }
}

impl<V: fmt::Debug> fmt::Debug for Program<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.instructions).finish()
    }
}

/// Space-separated postfix text.
impl<V: fmt::Display> fmt::Display for Program<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, instruction) in self.instructions.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(&instruction.serialize())?;
        }
        Ok(())
    }
}

impl<V> FromIterator<Instruction<V>> for Program<V> {
    fn from_iter<I: IntoIterator<Item = Instruction<V>>>(iter: I) -> Self {
        Program {
            instructions: iter.into_iter().collect(),
        }
    }
}

impl<V> Extend<Instruction<V>> for Program<V> {
    fn extend<I: IntoIterator<Item = Instruction<V>>>(&mut self, iter: I) {
        self.instructions.extend(iter);
    }
}

impl<V> IntoIterator for Program<V> {
    type Item = Instruction<V>;
    type IntoIter = std::vec::IntoIter<Instruction<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a Program<V> {
    type Item = &'a Instruction<V>;
    type IntoIter = std::slice::Iter<'a, Instruction<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}
