//! Tally Parse - compilers from text to [`Program`](tally_eval::Program)s.
//!
//! Three notations share one pipeline:
//! - prefix `(+ 1 (* 2 3))` and infix `1 + 2 * 3` build an [`ExprNode`]
//!   tree, which is flattened into instructions
//! - postfix `1 2 3 * +` maps tokens straight onto instructions
//!
//! Symbols can redirect how their argument list is parsed through
//! [`SymbolTransition`]s (`let`, `const`, `infix(..)`, `prefix(..)`), and
//! modifiers through [`ModifierTransition`]s. Both AST parsers consult the
//! same per-notation [`ParserState`]. A quote symbol or modifier reads its
//! operand as a raw [`Quoted`] form, in all three notations.

mod compiler;
mod factory;
mod infix;
mod node;
mod postfix;
mod prefix;
mod quote;
mod session;
mod special;
mod state;

#[cfg(test)]
mod test_support;

pub use compiler::{Compilers, FOLD_BRACKET, FOLD_MODIFIER, SYMBOL_GET_MODIFIER};
pub use factory::{NodeFactory, ValueParser};
pub use node::ExprNode;
pub use quote::{QuoteBuilder, Quoted};
pub use special::{ConstTransition, FoldModifier, LetTransition, ParserSwitch};
pub use state::{ModifierTransition, ParserState, SymbolTransition};
