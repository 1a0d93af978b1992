//! Quoted forms: source tokens read as data instead of compiled.
//!
//! After a quote modifier (`#x`) or inside a quote call (`quote(x)`) one
//! form is read raw:
//! - a value token goes through the dialect's value parser
//! - any other single token keeps its text as a symbol
//! - a bracket group becomes a list of forms, with separators skipped
//!
//! The dialect's [`QuoteBuilder`] decides what value a form becomes.

use tally_eval::ensure_sufficient_stack;
use tally_ir::{CalcResult, ParseError, Token, TokenKind};
use tally_lexer::TokenStream;

use crate::factory::NodeFactory;
use crate::session::{expect_closing, unclosed};

#[derive(Clone, Debug, PartialEq)]
pub enum Quoted<V> {
    Value(V),
    Symbol(String),
    List(Vec<Quoted<V>>),
}

/// Turns a quoted form into a single dialect value.
pub trait QuoteBuilder<V> {
    fn build(&self, form: Quoted<V>) -> CalcResult<V>;
}

impl<V, F> QuoteBuilder<V> for F
where
    F: Fn(Quoted<V>) -> CalcResult<V>,
{
    fn build(&self, form: Quoted<V>) -> CalcResult<V> {
        self(form)
    }
}

/// Read the form starting at `first`.
pub(crate) fn read<V>(
    tokens: &mut TokenStream<'_>,
    factory: &NodeFactory<V>,
    first: Token,
) -> CalcResult<Quoted<V>> {
    ensure_sufficient_stack(|| match first.kind {
        TokenKind::LeftBracket => {
            let mut items = Vec::new();
            loop {
                let token = tokens.next_token()?.ok_or_else(|| unclosed(&first.text))?;
                match token.kind {
                    TokenKind::RightBracket => {
                        expect_closing(&first.text, &token.text)?;
                        return Ok(Quoted::List(items));
                    }
                    TokenKind::Separator => {}
                    _ => items.push(read(tokens, factory, token)?),
                }
            }
        }
        TokenKind::RightBracket | TokenKind::Separator => Err(ParseError::UnexpectedToken {
            token: first.text,
            context: "where a quoted form was expected",
        }
        .into()),
        kind if kind.is_value() => factory.parse_value(&first).map(Quoted::Value),
        _ => Ok(Quoted::Symbol(first.text)),
    })
}
