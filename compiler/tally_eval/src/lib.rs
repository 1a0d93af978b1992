//! Tally Eval - the stack machine every notation compiles to.
//!
//! A compiled [`Program`] is a flat list of [`Instruction`]s executed
//! against a [`Frame`]: one scope layer of symbols plus a value stack.
//! Scopes chain to their lexical parent, so lookups fall through outward
//! and definitions never leak inward.
//!
//! The engine is generic over the value type. Anything that is
//! `Clone + Debug + Display + PartialEq` can be computed with; dialects
//! supply the operators and functions that give values meaning.

mod environment;
mod exec;
mod frame;
mod functions;
mod instruction;
mod let_block;
mod operand_stack;
mod operator;
mod scope;
mod stack;
mod symbol;
mod value;

pub use environment::{Environment, LAST_ANSWER};
pub use exec::execute;
pub use frame::Frame;
pub use functions::{accumulator, install_generic_functions};
pub use instruction::{Instruction, Program, SymbolCall};
pub use let_block::{LetBinding, LetBindingKind, LetBlock};
pub use operand_stack::Stack;
pub use operator::{BinaryOperator, OperatorDictionary, OperatorRef, UnaryOperator};
pub use scope::{LocalScope, SymbolTable};
pub use stack::ensure_sufficient_stack;
pub use symbol::{check_count, Callable, FixedCallable, Gettable, Symbol};
pub use value::CalcValue;
