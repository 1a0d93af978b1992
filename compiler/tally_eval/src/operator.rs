//! Unary and binary operators and the per-dialect operator dictionary.

use rustc_hash::FxHashMap;
use std::fmt;
use std::rc::Rc;

use tally_ir::{Associativity, CalcError, CalcResult};

use crate::operand_stack::Stack;

type UnaryFn<V> = dyn Fn(V) -> CalcResult<V>;
type BinaryFn<V> = dyn Fn(V, V) -> CalcResult<V>;

/// A prefix operator such as `-x` or `!x`.
pub struct UnaryOperator<V> {
    pub id: String,
    apply: Box<UnaryFn<V>>,
}

impl<V> UnaryOperator<V> {
    pub fn new(id: impl Into<String>, apply: impl Fn(V) -> CalcResult<V> + 'static) -> Self {
        UnaryOperator {
            id: id.into(),
            apply: Box::new(apply),
        }
    }

    #[inline]
    pub fn apply(&self, value: V) -> CalcResult<V> {
        (self.apply)(value)
    }

    /// Pop one operand, push the result.
    pub fn execute(&self, stack: &mut Stack<V>) -> CalcResult<()> {
        let value = stack.pop()?;
        stack.push(self.apply(value)?);
        Ok(())
    }
}

/// An infix operator with a precedence and associativity.
///
/// Marker operators have no behaviour of their own; they only exist so
/// that special forms (`let` bindings) can be written with operator
/// syntax. Executing one is an error.
pub struct BinaryOperator<V> {
    pub id: String,
    pub precedence: u32,
    pub associativity: Associativity,
    apply: Option<Box<BinaryFn<V>>>,
}

impl<V> BinaryOperator<V> {
    pub fn new(
        id: impl Into<String>,
        precedence: u32,
        associativity: Associativity,
        apply: impl Fn(V, V) -> CalcResult<V> + 'static,
    ) -> Self {
        BinaryOperator {
            id: id.into(),
            precedence,
            associativity,
            apply: Some(Box::new(apply)),
        }
    }

    pub fn left(
        id: impl Into<String>,
        precedence: u32,
        apply: impl Fn(V, V) -> CalcResult<V> + 'static,
    ) -> Self {
        Self::new(id, precedence, Associativity::Left, apply)
    }

    pub fn right(
        id: impl Into<String>,
        precedence: u32,
        apply: impl Fn(V, V) -> CalcResult<V> + 'static,
    ) -> Self {
        Self::new(id, precedence, Associativity::Right, apply)
    }

    pub fn marker(id: impl Into<String>, precedence: u32) -> Self {
        BinaryOperator {
            id: id.into(),
            precedence,
            associativity: Associativity::Left,
            apply: None,
        }
    }

    #[inline]
    pub fn is_marker(&self) -> bool {
        self.apply.is_none()
    }

    pub fn apply(&self, left: V, right: V) -> CalcResult<V> {
        match &self.apply {
            Some(apply) => apply(left, right),
            None => Err(CalcError::Type(format!(
                "operator '{}' can't be evaluated outside of its special form",
                self.id
            ))),
        }
    }

    /// Pop right then left operand, push the result.
    pub fn execute(&self, stack: &mut Stack<V>) -> CalcResult<()> {
        let right = stack.pop()?;
        let left = stack.pop()?;
        stack.push(self.apply(left, right)?);
        Ok(())
    }
}

impl<V> fmt::Debug for UnaryOperator<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnaryOperator({})", self.id)
    }
}

impl<V> fmt::Debug for BinaryOperator<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BinaryOperator({}, {}, {:?})",
            self.id, self.precedence, self.associativity
        )
    }
}

/// Either flavour of operator, as seen by the infix operator stack.
pub enum OperatorRef<V> {
    Unary(Rc<UnaryOperator<V>>),
    Binary(Rc<BinaryOperator<V>>),
}

impl<V> OperatorRef<V> {
    pub fn id(&self) -> &str {
        match self {
            OperatorRef::Unary(op) => &op.id,
            OperatorRef::Binary(op) => &op.id,
        }
    }

    /// Whether `top`, already on the operator stack, must be applied
    /// before `self` is pushed.
    ///
    /// Unary operators bind tighter than any binary operator and are
    /// right-associative among themselves.
    pub fn yields_to(&self, top: &OperatorRef<V>) -> bool {
        match (self, top) {
            (OperatorRef::Unary(_), _) => false,
            (OperatorRef::Binary(_), OperatorRef::Unary(_)) => true,
            (OperatorRef::Binary(this), OperatorRef::Binary(top)) => match this.associativity {
                Associativity::Left => this.precedence <= top.precedence,
                Associativity::Right => this.precedence < top.precedence,
            },
        }
    }
}

impl<V> Clone for OperatorRef<V> {
    fn clone(&self) -> Self {
        match self {
            OperatorRef::Unary(op) => OperatorRef::Unary(Rc::clone(op)),
            OperatorRef::Binary(op) => OperatorRef::Binary(Rc::clone(op)),
        }
    }
}

impl<V> fmt::Debug for OperatorRef<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorRef::Unary(op) => op.fmt(f),
            OperatorRef::Binary(op) => op.fmt(f),
        }
    }
}

/// All operators of a dialect, plus its juxtaposition operator.
///
/// Built once during dialect setup and read-only afterwards.
pub struct OperatorDictionary<V> {
    unary: FxHashMap<String, Rc<UnaryOperator<V>>>,
    binary: FxHashMap<String, Rc<BinaryOperator<V>>>,
    default_binary: Option<Rc<BinaryOperator<V>>>,
}

impl<V> OperatorDictionary<V> {
    pub fn new() -> Self {
        OperatorDictionary {
            unary: FxHashMap::default(),
            binary: FxHashMap::default(),
            default_binary: None,
        }
    }

    pub fn add_unary(&mut self, op: UnaryOperator<V>) -> CalcResult<Rc<UnaryOperator<V>>> {
        if self.unary.contains_key(&op.id) {
            return Err(duplicate("unary", &op.id));
        }
        let op = Rc::new(op);
        self.unary.insert(op.id.clone(), Rc::clone(&op));
        Ok(op)
    }

    pub fn add_binary(&mut self, op: BinaryOperator<V>) -> CalcResult<Rc<BinaryOperator<V>>> {
        if self.binary.contains_key(&op.id) {
            return Err(duplicate("binary", &op.id));
        }
        let op = Rc::new(op);
        self.binary.insert(op.id.clone(), Rc::clone(&op));
        Ok(op)
    }

    /// Choose the operator inserted between juxtaposed operands (`2x`).
    pub fn set_default_binary(&mut self, id: &str) -> CalcResult<()> {
        let op = self
            .binary
            .get(id)
            .ok_or_else(|| CalcError::Setup(format!("no binary operator '{id}'")))?;
        self.default_binary = Some(Rc::clone(op));
        Ok(())
    }

    pub fn unary(&self, id: &str) -> Option<&Rc<UnaryOperator<V>>> {
        self.unary.get(id)
    }

    pub fn binary(&self, id: &str) -> Option<&Rc<BinaryOperator<V>>> {
        self.binary.get(id)
    }

    pub fn default_binary(&self) -> Option<&Rc<BinaryOperator<V>>> {
        self.default_binary.as_ref()
    }

    /// Look up either flavour; the binary variant wins when both exist.
    pub fn any(&self, id: &str) -> Option<OperatorRef<V>> {
        self.binary
            .get(id)
            .map(|op| OperatorRef::Binary(Rc::clone(op)))
            .or_else(|| self.unary.get(id).map(|op| OperatorRef::Unary(Rc::clone(op))))
    }

    /// Every distinct operator glyph, sorted. Used to seed the tokenizer.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .unary
            .keys()
            .chain(self.binary.keys())
            .map(String::as_str)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

impl<V> Default for OperatorDictionary<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cold]
fn duplicate(kind: &str, id: &str) -> CalcError {
    CalcError::Setup(format!("duplicate {kind} operator '{id}'"))
}
