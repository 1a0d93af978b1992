//! Postfix compiler: tokens map directly onto instructions.
//!
//! Two constructs nest:
//! - `@name` reads a symbol instead of calling it
//! - `[ ... ]` runs its contents at compile time and splices the
//!   resulting values in as constants
//!
//! A quote modifier, when the dialect installs one, reads the next form
//! raw and pushes the value it builds.
//!
//! Nesting is tracked with an explicit stack of pending states; a state
//! that completes hands its instructions to the one below it.

use tally_eval::{CalcValue, Environment, Instruction, OperatorRef, Program, SymbolCall};
use tally_ir::{CalcResult, ParseError, Token, TokenKind};
use tally_lexer::{TokenStream, Tokenizer};

use crate::compiler::{FOLD_BRACKET, SYMBOL_GET_MODIFIER};
use crate::quote;
use crate::session::{expect_closing, AstParsers};

enum Pending<V> {
    /// After `@`: expects exactly one symbol.
    SymbolGet,
    /// Inside `[`: collects instructions until the matching `]`.
    Fold { open: String, program: Program<V> },
}

pub(crate) fn compile<V: CalcValue>(
    parsers: &AstParsers<V>,
    tokenizer: &Tokenizer,
    text: &str,
    env: &Environment<V>,
) -> CalcResult<Program<V>> {
    let mut root = Program::new();
    let mut pending: Vec<Pending<V>> = Vec::new();
    let mut tokens = tokenizer.tokenize(text);

    while let Some(token) = tokens.next_token()? {
        match token.kind {
            TokenKind::Modifier if token.text == SYMBOL_GET_MODIFIER => {
                pending.push(Pending::SymbolGet);
                continue;
            }
            TokenKind::Modifier => {
                let value = quoted(parsers, &mut tokens, token.text, &pending)?;
                match pending.last_mut() {
                    Some(Pending::Fold { program, .. }) => program.push(Instruction::Value(value)),
                    _ => root.push(Instruction::Value(value)),
                }
                continue;
            }
            TokenKind::LeftBracket if token.text == FOLD_BRACKET => {
                pending.push(Pending::Fold {
                    open: token.text,
                    program: Program::new(),
                });
                continue;
            }
            TokenKind::LeftBracket => return Err(ParseError::UnsupportedBracket(token.text).into()),
            _ => {}
        }

        let completed = match pending.last_mut() {
            None => {
                root.push(instruction(parsers, token)?);
                None
            }
            Some(Pending::SymbolGet) => Some(symbol_get(token)?),
            Some(Pending::Fold { open, program }) => {
                if token.kind == TokenKind::RightBracket {
                    expect_closing(open, &token.text)?;
                    let values = env.execute_isolated(program)?;
                    tracing::debug!(values = values.len(), "folded bracket");
                    Some(values.into_iter().map(Instruction::Value).collect())
                } else {
                    program.push(instruction(parsers, token)?);
                    None
                }
            }
        };

        if let Some(completed) = completed {
            pending.pop();
            match pending.last_mut() {
                None => root.extend(completed),
                Some(Pending::Fold { program, .. }) => program.extend(completed),
                Some(Pending::SymbolGet) => {
                    return Err(ParseError::UnexpectedToken {
                        token: completed.to_string(),
                        context: "after '@', which expects a symbol",
                    }
                    .into())
                }
            }
        }
    }

    match pending.last() {
        None => Ok(root),
        Some(Pending::Fold { open, .. }) => Err(ParseError::UnclosedBracket { open: open.clone() }.into()),
        Some(Pending::SymbolGet) => Err(ParseError::UnfinishedExpression.into()),
    }
}

/// Value of the form quoted by `modifier`.
fn quoted<V>(
    parsers: &AstParsers<V>,
    tokens: &mut TokenStream<'_>,
    modifier: String,
    pending: &[Pending<V>],
) -> CalcResult<V> {
    let Some(builder) = parsers.postfix_quotes.get(&modifier) else {
        return Err(ParseError::UnsupportedModifier(modifier).into());
    };
    if matches!(pending.last(), Some(Pending::SymbolGet)) {
        return Err(ParseError::UnexpectedToken {
            token: modifier,
            context: "after '@', which expects a symbol",
        }
        .into());
    }
    let first = tokens.next_token()?.ok_or(ParseError::UnfinishedExpression)?;
    builder.build(quote::read(tokens, &parsers.factory, first)?)
}

fn symbol_get<V>(token: Token) -> CalcResult<Program<V>> {
    match token.kind {
        TokenKind::Symbol | TokenKind::Constant => {
            Ok(std::iter::once(Instruction::SymbolGet(token.text)).collect())
        }
        _ => Err(ParseError::UnexpectedToken {
            token: token.text,
            context: "after '@', which expects a symbol",
        }
        .into()),
    }
}

fn instruction<V: CalcValue>(parsers: &AstParsers<V>, token: Token) -> CalcResult<Instruction<V>> {
    Ok(match token.kind {
        TokenKind::Operator => match parsers.operators.any(&token.text) {
            Some(OperatorRef::Binary(op)) => Instruction::BinaryOp(op),
            Some(OperatorRef::Unary(op)) => Instruction::UnaryOp(op),
            None => return Err(ParseError::UnknownOperator(token.text).into()),
        },
        TokenKind::Symbol => Instruction::SymbolCall(SymbolCall::inferred(token.text)),
        TokenKind::SymbolWithArgs => Instruction::SymbolCall(SymbolCall::parse(&token.text)?),
        TokenKind::Constant => Instruction::SymbolGet(token.text),
        kind if kind.is_value() => Instruction::Value(parsers.factory.parse_value(&token)?),
        _ => {
            return Err(ParseError::UnexpectedToken {
                token: token.text,
                context: "in postfix expression",
            }
            .into())
        }
    })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
