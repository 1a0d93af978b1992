//! Entry point: compile text in any notation against an environment.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use tally_eval::{CalcValue, Environment, OperatorDictionary, Program};
use tally_ir::{CalcError, CalcResult, Notation, ParseError};
use tally_lexer::Tokenizer;

use crate::factory::{NodeFactory, ValueParser};
use crate::postfix;
use crate::quote::QuoteBuilder;
use crate::session::{AstParsers, Session};
use crate::special::{ConstTransition, FoldModifier, LetTransition, ParserSwitch};
use crate::state::{ModifierTransition, ParserState, SymbolTransition};

/// Postfix modifier that reads a symbol instead of calling it: `@x`.
pub const SYMBOL_GET_MODIFIER: &str = "@";
/// Postfix bracket whose contents are evaluated at compile time.
pub const FOLD_BRACKET: &str = "[";
/// Prefix/infix modifier that evaluates its operand at compile time.
pub const FOLD_MODIFIER: &str = "`";

/// The three compilers of one dialect.
///
/// Prefix and infix share a tokenizer and node factory; postfix has its
/// own tokenizer so that `@` is a modifier there.
pub struct Compilers<V> {
    ast: AstParsers<V>,
    ast_tokenizer: Tokenizer,
    postfix_tokenizer: Tokenizer,
}

impl<V: CalcValue> Compilers<V> {
    /// Compilers for `operators`, with the notation switches
    /// (`prefix(..)`, `infix(..)`), `const(..)` and its modifier form
    /// installed.
    pub fn new(
        operators: Rc<OperatorDictionary<V>>,
        values: impl ValueParser<V> + 'static,
    ) -> CalcResult<Self> {
        let mut ast_tokenizer = Tokenizer::new();
        let mut postfix_tokenizer = Tokenizer::new();
        for id in operators.ids() {
            ast_tokenizer.add_operator(id);
            postfix_tokenizer.add_operator(id);
        }
        postfix_tokenizer.add_modifier(SYMBOL_GET_MODIFIER);

        let mut compilers = Compilers {
            ast: AstParsers {
                operators,
                factory: NodeFactory::new(values),
                prefix: ParserState::new(),
                infix: ParserState::new(),
                postfix_quotes: FxHashMap::default(),
            },
            ast_tokenizer,
            postfix_tokenizer,
        };
        for notation in [Notation::Prefix, Notation::Infix] {
            for target in [Notation::Prefix, Notation::Infix] {
                compilers.add_symbol_transition(
                    notation,
                    target.name(),
                    Rc::new(ParserSwitch::new(target)),
                )?;
            }
            compilers.add_symbol_transition(notation, "const", Rc::new(ConstTransition))?;
            compilers.add_modifier_transition(notation, FOLD_MODIFIER, Rc::new(FoldModifier))?;
        }
        Ok(compilers)
    }

    pub fn operators(&self) -> &OperatorDictionary<V> {
        &self.ast.operators
    }

    /// Make `open ... close` groups call `function` in prefix and infix.
    pub fn add_container(&mut self, open: &str, function: &str) -> CalcResult<()> {
        self.ast.factory.add_container(open, function)
    }

    /// Install `let` in prefix and infix, with `separators` as the
    /// operators allowed between a name and its value.
    pub fn add_let(&mut self, symbol: &str, separators: &[&str]) -> CalcResult<()> {
        let transition = Rc::new(LetTransition::new(separators.iter().copied()));
        for notation in [Notation::Prefix, Notation::Infix] {
            self.add_symbol_transition(notation, symbol, Rc::clone(&transition) as _)?;
        }
        Ok(())
    }

    /// Install a quote: `modifier form` in every notation and
    /// `symbol(form)` in prefix and infix, with `builder` turning the form
    /// into a value.
    pub fn add_quote(
        &mut self,
        modifier: &str,
        symbol: &str,
        builder: Rc<dyn QuoteBuilder<V>>,
    ) -> CalcResult<()> {
        if modifier == SYMBOL_GET_MODIFIER || self.ast.postfix_quotes.contains_key(modifier) {
            return Err(CalcError::Setup(format!(
                "modifier '{modifier}' already has a transition"
            )));
        }
        for notation in [Notation::Prefix, Notation::Infix] {
            let state = self.ast.state_mut(notation)?;
            state.add_quote_modifier(modifier, Rc::clone(&builder))?;
            state.add_quote_symbol(symbol, Rc::clone(&builder))?;
        }
        self.ast.postfix_quotes.insert(modifier.to_string(), builder);
        self.ast_tokenizer.add_modifier(modifier);
        self.postfix_tokenizer.add_modifier(modifier);
        Ok(())
    }

    pub fn add_symbol_transition(
        &mut self,
        notation: Notation,
        symbol: &str,
        transition: Rc<dyn SymbolTransition<V>>,
    ) -> CalcResult<()> {
        self.ast.state_mut(notation)?.add_symbol_transition(symbol, transition)
    }

    /// Register a modifier glyph and what it does in `notation`.
    pub fn add_modifier_transition(
        &mut self,
        notation: Notation,
        modifier: &str,
        transition: Rc<dyn ModifierTransition<V>>,
    ) -> CalcResult<()> {
        self.ast.state_mut(notation)?.add_modifier_transition(modifier, transition)?;
        self.ast_tokenizer.add_modifier(modifier);
        Ok(())
    }

    /// Compile `text`. `env` is used for compile-time folding only; the
    /// returned program is not run.
    #[tracing::instrument(level = "debug", skip_all, fields(notation = %notation, text = text))]
    pub fn compile(
        &self,
        notation: Notation,
        text: &str,
        env: &Environment<V>,
    ) -> CalcResult<Program<V>> {
        let program = match notation {
            Notation::Postfix => postfix::compile(&self.ast, &self.postfix_tokenizer, text, env)?,
            Notation::Prefix | Notation::Infix => self.compile_ast(notation, text, env)?,
        };
        tracing::debug!(instructions = program.len(), "compiled");
        Ok(program)
    }

    fn compile_ast(
        &self,
        notation: Notation,
        text: &str,
        env: &Environment<V>,
    ) -> CalcResult<Program<V>> {
        let mut session = Session::new(&self.ast, env, self.ast_tokenizer.tokenize(text));
        let node = session.parse(notation)?;
        let rest = session.remaining()?;
        if !rest.is_empty() {
            return Err(ParseError::UnconsumedTokens(rest).into());
        }
        Ok(node.to_program())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
