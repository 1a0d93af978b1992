//! Infix parser: operator precedence with an explicit operator stack.
//!
//! Operands and operators alternate. An operator seen where an operand is
//! expected is unary; two operands in a row get the dialect's default
//! operator between them (`2x`, `2(3)`). The parser stops without
//! consuming at a separator or a closing bracket, so the same routine
//! parses top-level input and every comma-separated argument.

use std::rc::Rc;

use tally_eval::{CalcValue, OperatorRef};
use tally_ir::{CalcResult, Notation, ParseError, Token, TokenKind};

use crate::node::ExprNode;
use crate::session::{expect_closing, unclosed, Session};

pub(crate) fn parse<V: CalcValue>(session: &mut Session<'_, V>) -> CalcResult<ExprNode<V>> {
    let mut nodes: Vec<ExprNode<V>> = Vec::new();
    let mut operators: Vec<OperatorRef<V>> = Vec::new();
    let mut after_operand = false;

    loop {
        match session.peek_kind()? {
            None => break,
            Some(kind) if kind.is_expression_terminator() => break,
            Some(_) => {}
        }
        let token = session.next()?;

        if token.kind == TokenKind::Operator {
            let op = if after_operand {
                session
                    .operators()
                    .binary(&token.text)
                    .map(|op| OperatorRef::Binary(Rc::clone(op)))
                    .ok_or_else(|| ParseError::NoBinaryOperator(token.text.clone()))?
            } else {
                session
                    .operators()
                    .unary(&token.text)
                    .map(|op| OperatorRef::Unary(Rc::clone(op)))
                    .ok_or_else(|| ParseError::NoUnaryOperator(token.text.clone()))?
            };
            push_operator(&mut nodes, &mut operators, op)?;
            after_operand = false;
            continue;
        }

        if after_operand {
            let default = session.default_operator(&token.text)?;
            push_operator(&mut nodes, &mut operators, OperatorRef::Binary(default))?;
        }
        nodes.push(operand(session, token)?);
        after_operand = true;
    }

    while let Some(op) = operators.pop() {
        reduce(&mut nodes, op)?;
    }

    match nodes.pop() {
        Some(node) if nodes.is_empty() => Ok(node),
        Some(_) => Err(ParseError::NonExpression {
            nodes: nodes.len() + 1,
        }
        .into()),
        None => Err(ParseError::NonExpression { nodes: 0 }.into()),
    }
}

fn operand<V: CalcValue>(session: &mut Session<'_, V>, token: Token) -> CalcResult<ExprNode<V>> {
    match token.kind {
        kind if kind.is_value() => session.factory().value_node(&token),
        TokenKind::Symbol | TokenKind::Constant => {
            if session.peek_is(TokenKind::LeftBracket, "(")? {
                session.next()?;
                if let Some(quoted) = session.quoted_call(Notation::Infix, &token.text, "(")? {
                    return Ok(quoted);
                }
                let target = session.symbol_target(Notation::Infix, &token.text)?;
                let children = collect_children(session, "(", target)?;
                session.symbol_node(Notation::Infix, &token.text, children)
            } else {
                Ok(ExprNode::SymbolGet(token.text))
            }
        }
        TokenKind::Modifier => session.modifier_node(Notation::Infix, &token.text),
        TokenKind::LeftBracket => {
            let children = collect_children(session, &token.text, Notation::Infix)?;
            let close = tally_ir::closing_bracket(&token.text).unwrap_or_default();
            session.factory().bracket_node(&token.text, close, children)
        }
        _ => Err(ParseError::UnexpectedToken {
            token: token.text,
            context: "in infix expression",
        }
        .into()),
    }
}

/// Comma-separated expressions up to the bracket closing `open`.
fn collect_children<V: CalcValue>(
    session: &mut Session<'_, V>,
    open: &str,
    notation: Notation,
) -> CalcResult<Vec<ExprNode<V>>> {
    let mut children = Vec::new();
    match session.peek_kind()? {
        None => return Err(unclosed(open)),
        Some(TokenKind::RightBracket) => {
            let close = session.next()?;
            expect_closing(open, &close.text)?;
            return Ok(children);
        }
        Some(_) => {}
    }

    loop {
        children.push(session.parse(notation)?);
        let token = session.next_in(open)?;
        match token.kind {
            TokenKind::RightBracket => {
                expect_closing(open, &token.text)?;
                return Ok(children);
            }
            TokenKind::Separator => {}
            _ => {
                return Err(ParseError::UnexpectedToken {
                    token: token.text,
                    context: "where a separator or closing bracket was expected",
                }
                .into())
            }
        }
    }
}

/// Push `op`, first reducing every stacked operator it yields to.
fn push_operator<V>(
    nodes: &mut Vec<ExprNode<V>>,
    operators: &mut Vec<OperatorRef<V>>,
    op: OperatorRef<V>,
) -> CalcResult<()> {
    while let Some(top) = operators.last() {
        if !op.yields_to(top) {
            break;
        }
        if let Some(top) = operators.pop() {
            reduce(nodes, top)?;
        }
    }
    operators.push(op);
    Ok(())
}

fn reduce<V>(nodes: &mut Vec<ExprNode<V>>, op: OperatorRef<V>) -> CalcResult<()> {
    let missing = || ParseError::UnfinishedExpression;
    let node = match op {
        OperatorRef::Unary(op) => {
            let operand = nodes.pop().ok_or_else(missing)?;
            ExprNode::Unary {
                op,
                operand: Box::new(operand),
            }
        }
        OperatorRef::Binary(op) => {
            let right = nodes.pop().ok_or_else(missing)?;
            let left = nodes.pop().ok_or_else(missing)?;
            ExprNode::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            }
        }
    };
    nodes.push(node);
    Ok(())
}
