//! Error taxonomy shared by every stage.
//!
//! Compile-time failures carry a detail enum ([`TokenizeError`],
//! [`ParseError`]); run-time failures are flat variants of [`CalcError`].
//! Nothing in the engine recovers from an error: every failure unwinds out
//! of `compile` or `execute` to the embedder.

use std::fmt;

/// Result alias used across the workspace.
pub type CalcResult<T> = Result<T, CalcError>;

/// Failure while splitting text into tokens.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenizeError {
    /// Nothing recognisable at the current position.
    #[error("unknown token at '{remaining}'")]
    UnknownToken { remaining: String },
    /// A string literal ran into the end of input.
    #[error("unterminated string: '{partial}'")]
    UnterminatedString { partial: String },
    /// A backslash was the last character of the input.
    #[error("unterminated escape sequence after '{partial}'")]
    UnterminatedEscape { partial: String },
    /// A backslash followed by a character with no escape meaning.
    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(char),
    /// `\x`, `\u` or `\U` with bad hex digits or an invalid scalar value.
    #[error("invalid code point escape '{0}'")]
    InvalidCodePoint(String),
}

/// Failure while turning tokens into a program.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A group was closed with the wrong glyph.
    #[error("unmatched brackets: '{open}' and '{close}'")]
    UnmatchedBrackets { open: String, close: String },
    /// A group was never closed.
    #[error("bracket '{open}' is never closed")]
    UnclosedBracket { open: String },
    /// Parsing finished with other than exactly one pending node.
    #[error("expected single expression, got {nodes} node(s)")]
    NonExpression { nodes: usize },
    /// Input ended in the middle of an expression.
    #[error("unexpected end of expression")]
    UnfinishedExpression,
    /// Operator used in unary position with no unary variant.
    #[error("no unary version of operator '{0}'")]
    NoUnaryOperator(String),
    /// Operator used in binary position with no binary variant.
    #[error("no binary version of operator '{0}'")]
    NoBinaryOperator(String),
    /// Operator text not present in the dictionary at all.
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),
    /// Prefix `(op)` with nothing to apply it to.
    #[error("operator '{0}' called without arguments")]
    OperatorWithoutArguments(String),
    /// A token the current grammar state cannot accept.
    #[error("unexpected token '{token}' {context}")]
    UnexpectedToken { token: String, context: &'static str },
    /// Tokens left over after a complete parse.
    #[error("unconsumed tokens: {}", .0.join(" "))]
    UnconsumedTokens(Vec<String>),
    /// Arity suffix that is not `@args`, `@args,rets` or a half of it.
    #[error("can't parse call counts on token '{0}'")]
    MalformedCallCounts(String),
    /// Numeric literal whose digits are invalid for its radix.
    #[error("invalid number '{literal}': {reason}")]
    InvalidNumber { literal: String, reason: String },
    /// A special form (`let`, `const`, parser switch) with the wrong shape.
    #[error("malformed '{form}' expression: {reason}")]
    MalformedForm { form: &'static str, reason: String },
    /// Modifier with no parser state registered for it.
    #[error("modifier '{0}' is not supported here")]
    UnsupportedModifier(String),
    /// Bracket with no parser state registered for it.
    #[error("bracket '{0}' is not supported here")]
    UnsupportedBracket(String),
}

/// Every failure the engine can report.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CalcError {
    #[error("tokenize error: {0}")]
    Tokenize(#[from] TokenizeError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    /// Name missing from the whole scope chain at execution time.
    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),
    /// Declared and supplied argument/return counts disagree.
    #[error("stack validation failed: {0}")]
    StackValidation(String),
    /// Popped more values than the stack window holds.
    #[error("stack underflow: {0}")]
    StackUnderflow(String),
    /// No typed variant accepts the arguments, even after coercion.
    #[error("dispatch failed: {0}")]
    Dispatch(String),
    /// Two typed variants overlap without an ordering (raised at build time).
    #[error("ambiguous dispatch: {0}")]
    AmbiguousDispatch(String),
    /// Raised by the `fail` primitive.
    #[error("{}", describe_failure(.0.as_deref()))]
    Execution(Option<String>),
    /// Value-level failures: conversions, truthiness, arithmetic.
    #[error("type error: {0}")]
    Type(String),
    /// Duplicate or inconsistent registrations while building a dialect.
    #[error("setup error: {0}")]
    Setup(String),
}

fn describe_failure(message: Option<&str>) -> String {
    match message {
        Some(message) => format!("execution failed: {message}"),
        None => "execution failed".to_string(),
    }
}

impl CalcError {
    /// Short category name, used by the REPL when reporting.
    pub fn category(&self) -> &'static str {
        match self {
            CalcError::Tokenize(_) => "tokenize",
            CalcError::Parse(_) => "parse",
            CalcError::UnknownSymbol(_) => "symbol",
            CalcError::StackValidation(_) => "arity",
            CalcError::StackUnderflow(_) => "underflow",
            CalcError::Dispatch(_) => "dispatch",
            CalcError::AmbiguousDispatch(_) => "ambiguous",
            CalcError::Execution(_) => "fail",
            CalcError::Type(_) => "type",
            CalcError::Setup(_) => "setup",
        }
    }
}

// Constructors

#[cold]
pub fn unknown_symbol(name: &str) -> CalcError {
    CalcError::UnknownSymbol(name.to_string())
}

#[cold]
pub fn stack_underflow(message: impl fmt::Display) -> CalcError {
    CalcError::StackUnderflow(message.to_string())
}

#[cold]
pub fn stack_validation(message: impl fmt::Display) -> CalcError {
    CalcError::StackValidation(message.to_string())
}

/// Arity mismatch for a named callee.
#[cold]
pub fn arity_mismatch(what: &str, name: &str, expected: usize, actual: usize) -> CalcError {
    CalcError::StackValidation(format!(
        "'{name}' expects {expected} {what}, got {actual}"
    ))
}

#[cold]
pub fn dispatch_failed(message: impl fmt::Display) -> CalcError {
    CalcError::Dispatch(message.to_string())
}

#[cold]
pub fn ambiguous_dispatch(message: impl fmt::Display) -> CalcError {
    CalcError::AmbiguousDispatch(message.to_string())
}

#[cold]
pub fn invalid_value(message: impl fmt::Display) -> CalcError {
    CalcError::Type(message.to_string())
}

#[cfg(test)]
mod tests;
