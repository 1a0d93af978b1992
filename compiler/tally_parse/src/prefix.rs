//! Prefix parser: `(op args...)`, `(f args...)` and bare atoms.
//!
//! Inside a group, arguments are separated by whitespace; commas are
//! accepted and ignored. A group headed by neither a symbol nor an
//! operator applies the default operator to the head and the rest of the
//! group: `(2 3)` is `2 * 3` in a dialect where `*` is the default.

use std::rc::Rc;

use tally_eval::CalcValue;
use tally_ir::{closing_bracket, CalcResult, Notation, ParseError, Token, TokenKind};

use crate::node::ExprNode;
use crate::session::{expect_closing, unclosed, Session};

pub(crate) fn parse<V: CalcValue>(session: &mut Session<'_, V>) -> CalcResult<ExprNode<V>> {
    let token = session.next()?;
    node(session, token)
}

fn node<V: CalcValue>(session: &mut Session<'_, V>, token: Token) -> CalcResult<ExprNode<V>> {
    match token.kind {
        kind if kind.is_value() => session.factory().value_node(&token),
        TokenKind::Symbol | TokenKind::Constant => Ok(ExprNode::SymbolGet(token.text)),
        TokenKind::Modifier => session.modifier_node(Notation::Prefix, &token.text),
        TokenKind::LeftBracket => group(session, &token.text),
        _ => Err(ParseError::UnexpectedToken {
            token: token.text,
            context: "in prefix expression",
        }
        .into()),
    }
}

fn group<V: CalcValue>(session: &mut Session<'_, V>, open: &str) -> CalcResult<ExprNode<V>> {
    let close = closing_bracket(open).unwrap_or_default();
    if open != "(" {
        let children = collect_args(session, open, Notation::Prefix)?;
        return session.factory().bracket_node(open, close, children);
    }

    let head = session.next_in(open)?;
    match head.kind {
        TokenKind::Symbol | TokenKind::Constant => {
            if let Some(quoted) = session.quoted_call(Notation::Prefix, &head.text, open)? {
                return Ok(quoted);
            }
            let target = session.symbol_target(Notation::Prefix, &head.text)?;
            let args = collect_args(session, open, target)?;
            session.symbol_node(Notation::Prefix, &head.text, args)
        }
        TokenKind::Operator => {
            let args = collect_args(session, open, Notation::Prefix)?;
            operator_node(session, &head.text, args)
        }
        _ => {
            let text = head.text.clone();
            let target = node(session, head)?;
            let args = collect_args(session, open, Notation::Prefix)?;
            let op = session.default_operator(&text)?;
            let rest = session.factory().bracket_node(open, close, args)?;
            Ok(ExprNode::Binary {
                op,
                left: Box::new(target),
                right: Box::new(rest),
            })
        }
    }
}

/// `(op x)` is unary; `(op x y z)` folds the binary operator along its
/// associativity.
fn operator_node<V: CalcValue>(
    session: &Session<'_, V>,
    id: &str,
    args: Vec<ExprNode<V>>,
) -> CalcResult<ExprNode<V>> {
    if args.len() == 1 {
        let op = session
            .operators()
            .unary(id)
            .cloned()
            .ok_or_else(|| ParseError::NoUnaryOperator(id.to_string()))?;
        let operand = args.into_iter().next().ok_or(ParseError::UnfinishedExpression)?;
        return Ok(ExprNode::Unary {
            op,
            operand: Box::new(operand),
        });
    }
    if args.is_empty() {
        return Err(ParseError::OperatorWithoutArguments(id.to_string()).into());
    }

    let op = session
        .operators()
        .binary(id)
        .cloned()
        .ok_or_else(|| ParseError::NoBinaryOperator(id.to_string()))?;
    let binary = |left: ExprNode<V>, right: ExprNode<V>| ExprNode::Binary {
        op: Rc::clone(&op),
        left: Box::new(left),
        right: Box::new(right),
    };

    let folded = if op.associativity.is_left() {
        let mut args = args.into_iter();
        let first = args.next().ok_or(ParseError::UnfinishedExpression)?;
        args.fold(first, binary)
    } else {
        let mut args = args.into_iter().rev();
        let last = args.next().ok_or(ParseError::UnfinishedExpression)?;
        args.fold(last, |acc, arg| binary(arg, acc))
    };
    Ok(folded)
}

/// Whitespace-separated expressions up to the bracket closing `open`.
fn collect_args<V: CalcValue>(
    session: &mut Session<'_, V>,
    open: &str,
    notation: Notation,
) -> CalcResult<Vec<ExprNode<V>>> {
    let mut args = Vec::new();
    loop {
        match session.peek_kind()? {
            None => return Err(unclosed(open)),
            Some(TokenKind::Separator) => {
                session.next()?;
            }
            Some(TokenKind::RightBracket) => {
                let close = session.next()?;
                expect_closing(open, &close.text)?;
                return Ok(args);
            }
            Some(_) => args.push(session.parse(notation)?),
        }
    }
}
