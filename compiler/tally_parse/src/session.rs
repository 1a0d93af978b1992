//! State shared by the prefix and infix parsers during one compile.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use tally_eval::{ensure_sufficient_stack, BinaryOperator, CalcValue, Environment, OperatorDictionary};
use tally_ir::{CalcResult, Notation, ParseError, Token, TokenKind};
use tally_lexer::TokenStream;

use crate::factory::NodeFactory;
use crate::node::ExprNode;
use crate::quote::{self, QuoteBuilder};
use crate::state::ParserState;
use crate::{infix, prefix};

/// Everything the AST parsers consult besides the tokens.
pub(crate) struct AstParsers<V> {
    pub operators: Rc<OperatorDictionary<V>>,
    pub factory: NodeFactory<V>,
    pub prefix: ParserState<V>,
    pub infix: ParserState<V>,
    /// Quote modifiers of the postfix compiler.
    pub postfix_quotes: FxHashMap<String, Rc<dyn QuoteBuilder<V>>>,
}

impl<V> AstParsers<V> {
    pub fn state(&self, notation: Notation) -> CalcResult<&ParserState<V>> {
        match notation {
            Notation::Prefix => Ok(&self.prefix),
            Notation::Infix => Ok(&self.infix),
            Notation::Postfix => Err(nested_postfix()),
        }
    }

    pub fn state_mut(&mut self, notation: Notation) -> CalcResult<&mut ParserState<V>> {
        match notation {
            Notation::Prefix => Ok(&mut self.prefix),
            Notation::Infix => Ok(&mut self.infix),
            Notation::Postfix => Err(nested_postfix()),
        }
    }
}

#[cold]
fn nested_postfix() -> tally_ir::CalcError {
    ParseError::MalformedForm {
        form: "postfix",
        reason: "postfix can't be nested inside an expression".to_string(),
    }
    .into()
}

pub(crate) struct Session<'a, V> {
    parsers: &'a AstParsers<V>,
    env: &'a Environment<V>,
    tokens: TokenStream<'a>,
}

impl<'a, V: CalcValue> Session<'a, V> {
    pub fn new(parsers: &'a AstParsers<V>, env: &'a Environment<V>, tokens: TokenStream<'a>) -> Self {
        Session {
            parsers,
            env,
            tokens,
        }
    }

    /// Parse one expression in `notation`.
    pub fn parse(&mut self, notation: Notation) -> CalcResult<ExprNode<V>> {
        ensure_sufficient_stack(|| match notation {
            Notation::Prefix => prefix::parse(self),
            Notation::Infix => infix::parse(self),
            Notation::Postfix => Err(nested_postfix()),
        })
    }

    pub fn factory(&self) -> &NodeFactory<V> {
        &self.parsers.factory
    }

    pub fn operators(&self) -> &OperatorDictionary<V> {
        &self.parsers.operators
    }

    /// Operator inserted between two juxtaposed operands.
    pub fn default_operator(&self, before: &str) -> CalcResult<Rc<BinaryOperator<V>>> {
        self.operators().default_binary().map(Rc::clone).ok_or_else(|| {
            ParseError::UnexpectedToken {
                token: before.to_string(),
                context: "after an operand, and there is no default operator",
            }
            .into()
        })
    }

    /// Consume the next token; running out is an unfinished expression.
    pub fn next(&mut self) -> CalcResult<Token> {
        self.tokens
            .next_token()?
            .ok_or_else(|| ParseError::UnfinishedExpression.into())
    }

    /// Consume the next token inside a group opened by `open`.
    pub fn next_in(&mut self, open: &str) -> CalcResult<Token> {
        self.tokens.next_token()?.ok_or_else(|| unclosed(open))
    }

    pub fn peek_kind(&mut self) -> CalcResult<Option<TokenKind>> {
        Ok(self.tokens.peek()?.map(|token| token.kind))
    }

    pub fn peek_is(&mut self, kind: TokenKind, text: &str) -> CalcResult<bool> {
        Ok(self.tokens.peek()?.is_some_and(|token| token.is(kind, text)))
    }

    /// Notation the arguments of `symbol(...)` are parsed in.
    pub fn symbol_target(&self, current: Notation, symbol: &str) -> CalcResult<Notation> {
        let state = self.parsers.state(current)?;
        Ok(state
            .symbol_transition(symbol)
            .map_or(current, |transition| transition.target(current)))
    }

    /// Node for `symbol(children...)`; a plain call unless a transition
    /// is registered.
    pub fn symbol_node(
        &self,
        current: Notation,
        symbol: &str,
        children: Vec<ExprNode<V>>,
    ) -> CalcResult<ExprNode<V>> {
        match self.parsers.state(current)?.symbol_transition(symbol) {
            Some(transition) => transition.create_node(self.env, symbol, children),
            None => Ok(ExprNode::SymbolCall {
                name: symbol.to_string(),
                args: children,
            }),
        }
    }

    /// Parse the expression following `modifier` and wrap it, or read
    /// a quoted form when `modifier` quotes.
    pub fn modifier_node(&mut self, current: Notation, modifier: &str) -> CalcResult<ExprNode<V>> {
        let parsers = self.parsers;
        let state = parsers.state(current)?;
        if let Some(builder) = state.quote_modifier(modifier) {
            return self.quoted_node(builder.as_ref());
        }
        let transition = state.modifier_transition(modifier)?;
        let child = self.parse(transition.target(current))?;
        transition.create_node(self.env, child)
    }

    /// `symbol(form)` where `symbol` quotes in `current`: read the single
    /// form and the bracket closing `open`. `None` for any other symbol.
    pub fn quoted_call(
        &mut self,
        current: Notation,
        symbol: &str,
        open: &str,
    ) -> CalcResult<Option<ExprNode<V>>> {
        let parsers = self.parsers;
        let Some(builder) = parsers.state(current)?.quote_symbol(symbol) else {
            return Ok(None);
        };
        let node = self.quoted_node(builder.as_ref())?;
        let close = self.next_in(open)?;
        if close.kind != TokenKind::RightBracket {
            return Err(ParseError::UnexpectedToken {
                token: close.text,
                context: "after a quoted form, where a closing bracket was expected",
            }
            .into());
        }
        expect_closing(open, &close.text)?;
        Ok(Some(node))
    }

    fn quoted_node(&mut self, builder: &dyn QuoteBuilder<V>) -> CalcResult<ExprNode<V>> {
        let first = self.next()?;
        let form = quote::read(&mut self.tokens, &self.parsers.factory, first)?;
        Ok(ExprNode::Value(builder.build(form)?))
    }

    /// Texts of every token left in the stream.
    pub fn remaining(mut self) -> CalcResult<Vec<String>> {
        let mut rest = Vec::new();
        while let Some(token) = self.tokens.next_token()? {
            rest.push(token.text);
        }
        Ok(rest)
    }
}

#[cold]
pub(crate) fn unclosed(open: &str) -> tally_ir::CalcError {
    ParseError::UnclosedBracket {
        open: open.to_string(),
    }
    .into()
}

/// Check that `close` ends a group opened by `open`.
pub(crate) fn expect_closing(open: &str, close: &str) -> CalcResult<()> {
    if tally_ir::is_valid_bracket_pair(open, close) {
        Ok(())
    } else {
        Err(ParseError::UnmatchedBrackets {
            open: open.to_string(),
            close: close.to_string(),
        }
        .into())
    }
}
