//! Per-notation parser state: how symbols and modifiers redirect parsing.
//!
//! When an AST parser meets `name(` it asks the current state for the
//! symbol's transition. The transition names the notation its arguments
//! are parsed in and builds the resulting node. Symbols without a
//! registered transition parse their arguments in the current notation
//! and become plain calls. Modifiers have no such default: a modifier
//! only parses where a transition for it is registered.
//!
//! A symbol or modifier may instead be a quote, whose operand is read as
//! a raw [`Quoted`](crate::Quoted) form rather than parsed.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use tally_eval::Environment;
use tally_ir::{CalcError, CalcResult, Notation, ParseError};

use crate::node::ExprNode;
use crate::quote::QuoteBuilder;

/// Parsing rule for `symbol(args...)`.
pub trait SymbolTransition<V> {
    /// Notation the arguments are parsed in.
    fn target(&self, current: Notation) -> Notation {
        current
    }

    fn create_node(
        &self,
        env: &Environment<V>,
        symbol: &str,
        children: Vec<ExprNode<V>>,
    ) -> CalcResult<ExprNode<V>>;
}

/// Parsing rule for `modifier expr`.
pub trait ModifierTransition<V> {
    /// Notation the modified expression is parsed in.
    fn target(&self, current: Notation) -> Notation {
        current
    }

    fn create_node(&self, env: &Environment<V>, child: ExprNode<V>) -> CalcResult<ExprNode<V>>;
}

pub struct ParserState<V> {
    symbols: FxHashMap<String, Rc<dyn SymbolTransition<V>>>,
    modifiers: FxHashMap<String, Rc<dyn ModifierTransition<V>>>,
    quote_symbols: FxHashMap<String, Rc<dyn QuoteBuilder<V>>>,
    quote_modifiers: FxHashMap<String, Rc<dyn QuoteBuilder<V>>>,
}

impl<V> ParserState<V> {
    pub fn new() -> Self {
        ParserState {
            symbols: FxHashMap::default(),
            modifiers: FxHashMap::default(),
            quote_symbols: FxHashMap::default(),
            quote_modifiers: FxHashMap::default(),
        }
    }

    pub fn add_symbol_transition(
        &mut self,
        symbol: impl Into<String>,
        transition: Rc<dyn SymbolTransition<V>>,
    ) -> CalcResult<()> {
        let symbol = symbol.into();
        self.check_symbol_free(&symbol)?;
        self.symbols.insert(symbol, transition);
        Ok(())
    }

    pub fn add_quote_symbol(
        &mut self,
        symbol: impl Into<String>,
        builder: Rc<dyn QuoteBuilder<V>>,
    ) -> CalcResult<()> {
        let symbol = symbol.into();
        self.check_symbol_free(&symbol)?;
        self.quote_symbols.insert(symbol, builder);
        Ok(())
    }

    fn check_symbol_free(&self, symbol: &str) -> CalcResult<()> {
        if self.symbols.contains_key(symbol) || self.quote_symbols.contains_key(symbol) {
            return Err(CalcError::Setup(format!(
                "symbol '{symbol}' already has a transition"
            )));
        }
        Ok(())
    }

    pub fn add_modifier_transition(
        &mut self,
        modifier: impl Into<String>,
        transition: Rc<dyn ModifierTransition<V>>,
    ) -> CalcResult<()> {
        let modifier = modifier.into();
        self.check_modifier_free(&modifier)?;
        self.modifiers.insert(modifier, transition);
        Ok(())
    }

    pub fn add_quote_modifier(
        &mut self,
        modifier: impl Into<String>,
        builder: Rc<dyn QuoteBuilder<V>>,
    ) -> CalcResult<()> {
        let modifier = modifier.into();
        self.check_modifier_free(&modifier)?;
        self.quote_modifiers.insert(modifier, builder);
        Ok(())
    }

    fn check_modifier_free(&self, modifier: &str) -> CalcResult<()> {
        if self.modifiers.contains_key(modifier) || self.quote_modifiers.contains_key(modifier) {
            return Err(CalcError::Setup(format!(
                "modifier '{modifier}' already has a transition"
            )));
        }
        Ok(())
    }

    pub fn symbol_transition(&self, symbol: &str) -> Option<&Rc<dyn SymbolTransition<V>>> {
        self.symbols.get(symbol)
    }

    pub fn quote_symbol(&self, symbol: &str) -> Option<&Rc<dyn QuoteBuilder<V>>> {
        self.quote_symbols.get(symbol)
    }

    pub fn quote_modifier(&self, modifier: &str) -> Option<&Rc<dyn QuoteBuilder<V>>> {
        self.quote_modifiers.get(modifier)
    }

    pub fn modifier_transition(&self, modifier: &str) -> CalcResult<&Rc<dyn ModifierTransition<V>>> {
        self.modifiers
            .get(modifier)
            .ok_or_else(|| ParseError::UnsupportedModifier(modifier.to_string()).into())
    }
}

impl<V> Default for ParserState<V> {
    fn default() -> Self {
        Self::new()
    }
}
