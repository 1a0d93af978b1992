//! Tally IR - shared vocabulary of the expression engine.
//!
//! This crate holds the pieces every stage agrees on:
//! - Tokens, token kinds and their classification flags
//! - The bracket table used by the tokenizer and all three parsers
//! - Surface notations (prefix, infix, postfix)
//! - Operator associativity
//! - The error taxonomy (`CalcError` and its compile-time detail enums)
//!
//! Nothing here executes code; execution lives in `tally_eval`.

mod bracket;
mod error;
mod notation;
mod operator;
mod token;

pub use bracket::{closing_bracket, is_closing_bracket, is_opening_bracket, is_valid_bracket_pair};
pub use error::{
    ambiguous_dispatch, arity_mismatch, dispatch_failed, invalid_value, stack_underflow,
    stack_validation, unknown_symbol, CalcError, CalcResult, ParseError, TokenizeError,
};
pub use notation::Notation;
pub use operator::Associativity;
pub use token::{Token, TokenClass, TokenKind};
