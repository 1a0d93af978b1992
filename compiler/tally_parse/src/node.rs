//! Expression tree built by the prefix and infix parsers.
//!
//! Nodes exist only between parsing and flattening. Flattening walks the
//! tree in post-order, so operands always precede the instruction that
//! consumes them.

use std::fmt;
use std::rc::Rc;

use tally_eval::{
    ensure_sufficient_stack, BinaryOperator, CalcValue, Instruction, LetBlock, Program, SymbolCall,
    UnaryOperator,
};

/// One node of a parsed expression.
pub enum ExprNode<V> {
    /// A literal.
    Value(V),
    /// Values computed at compile time (`const(..)`, `` `expr ``).
    Values(Vec<V>),
    /// Plain read of a symbol: `x`.
    SymbolGet(String),
    /// `f(a, b)`: arguments first, then a call expecting one result.
    SymbolCall { name: String, args: Vec<ExprNode<V>> },
    Unary {
        op: Rc<UnaryOperator<V>>,
        operand: Box<ExprNode<V>>,
    },
    Binary {
        op: Rc<BinaryOperator<V>>,
        left: Box<ExprNode<V>>,
        right: Box<ExprNode<V>>,
    },
    /// Grouping with no call attached; flattens to its children in order.
    Bracket {
        open: String,
        children: Vec<ExprNode<V>>,
    },
    /// Bracket a dialect maps to a constructor: `[1, 2]` calls `list@2,1`.
    Container {
        open: String,
        function: String,
        children: Vec<ExprNode<V>>,
    },
    /// Sub-expression parsed under a different notation.
    Wrapped(Box<ExprNode<V>>),
    Let(Rc<LetBlock<V>>),
}

impl<V: CalcValue> ExprNode<V> {
    /// Append this node's instructions to `out`.
    pub fn flatten(&self, out: &mut Program<V>) {
        ensure_sufficient_stack(|| self.flatten_inner(out));
    }

    fn flatten_inner(&self, out: &mut Program<V>) {
        match self {
            ExprNode::Value(value) => out.push(Instruction::Value(value.clone())),
            ExprNode::Values(values) => out.extend(values.iter().cloned().map(Instruction::Value)),
            ExprNode::SymbolGet(name) => out.push(Instruction::SymbolGet(name.clone())),
            ExprNode::SymbolCall { name, args } => {
                flatten_all(args, out);
                out.push(call(name, args.len()));
            }
            ExprNode::Unary { op, operand } => {
                operand.flatten(out);
                out.push(Instruction::UnaryOp(Rc::clone(op)));
            }
            ExprNode::Binary { op, left, right } => {
                left.flatten(out);
                right.flatten(out);
                out.push(Instruction::BinaryOp(Rc::clone(op)));
            }
            ExprNode::Bracket { children, .. } => flatten_all(children, out),
            ExprNode::Container {
                function, children, ..
            } => {
                flatten_all(children, out);
                out.push(call(function, children.len()));
            }
            ExprNode::Wrapped(inner) => inner.flatten(out),
            ExprNode::Let(block) => out.push(Instruction::Let(Rc::clone(block))),
        }
    }

    /// Flatten into a fresh program.
    pub fn to_program(&self) -> Program<V> {
        let mut program = Program::new();
        self.flatten(&mut program);
        program
    }

    /// Opening glyph for bracket-like nodes.
    pub fn bracket(&self) -> Option<&str> {
        match self {
            ExprNode::Bracket { open, .. } | ExprNode::Container { open, .. } => Some(open),
            _ => None,
        }
    }

    /// Children of bracket-like nodes.
    pub fn children(&self) -> &[ExprNode<V>] {
        match self {
            ExprNode::Bracket { children, .. } | ExprNode::Container { children, .. } => children,
            ExprNode::SymbolCall { args, .. } => args,
            _ => &[],
        }
    }
}

fn flatten_all<V: CalcValue>(nodes: &[ExprNode<V>], out: &mut Program<V>) {
    for node in nodes {
        node.flatten(out);
    }
}

fn call<V>(name: &str, args: usize) -> Instruction<V> {
    Instruction::SymbolCall(SymbolCall::new(name, Some(args), Some(1)))
}

impl<V: CalcValue> fmt::Debug for ExprNode<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprNode::Value(value) => write!(f, "Value({value:?})"),
            ExprNode::Values(values) => write!(f, "Values({values:?})"),
            ExprNode::SymbolGet(name) => write!(f, "SymbolGet({name})"),
            ExprNode::SymbolCall { name, args } => {
                f.debug_struct("SymbolCall").field("name", name).field("args", args).finish()
            }
            ExprNode::Unary { op, operand } => f
                .debug_struct("Unary")
                .field("op", &op.id)
                .field("operand", operand)
                .finish(),
            ExprNode::Binary { op, left, right } => f
                .debug_struct("Binary")
                .field("op", &op.id)
                .field("left", left)
                .field("right", right)
                .finish(),
            ExprNode::Bracket { open, children } => f
                .debug_struct("Bracket")
                .field("open", open)
                .field("children", children)
                .finish(),
            ExprNode::Container {
                open,
                function,
                children,
            } => f
                .debug_struct("Container")
                .field("open", open)
                .field("function", function)
                .field("children", children)
                .finish(),
            ExprNode::Wrapped(inner) => write!(f, "Wrapped({inner:?})"),
            ExprNode::Let(block) => write!(f, "Let({} binding(s))", block.bindings().len()),
        }
    }
}
