//! Leaf and bracket node construction.

use rustc_hash::FxHashMap;

use tally_ir::{is_valid_bracket_pair, CalcError, CalcResult, ParseError, Token};

use crate::node::ExprNode;

/// Turns value tokens (numbers, strings) into dialect values.
pub trait ValueParser<V> {
    fn parse_value(&self, token: &Token) -> CalcResult<V>;
}

impl<V, F> ValueParser<V> for F
where
    F: Fn(&Token) -> CalcResult<V>,
{
    fn parse_value(&self, token: &Token) -> CalcResult<V> {
        self(token)
    }
}

/// Builds leaf nodes from value tokens and bracket nodes from groups.
///
/// Brackets with no registered constructor become plain groupings.
pub struct NodeFactory<V> {
    values: Box<dyn ValueParser<V>>,
    containers: FxHashMap<String, String>,
}

impl<V> NodeFactory<V> {
    pub fn new(values: impl ValueParser<V> + 'static) -> Self {
        NodeFactory {
            values: Box::new(values),
            containers: FxHashMap::default(),
        }
    }

    /// Make `open ... close` groups call `function` with their children.
    pub fn add_container(
        &mut self,
        open: impl Into<String>,
        function: impl Into<String>,
    ) -> CalcResult<()> {
        let open = open.into();
        if self.containers.contains_key(&open) {
            return Err(CalcError::Setup(format!(
                "bracket '{open}' already has a constructor"
            )));
        }
        self.containers.insert(open, function.into());
        Ok(())
    }

    pub fn parse_value(&self, token: &Token) -> CalcResult<V> {
        self.values.parse_value(token)
    }

    pub fn value_node(&self, token: &Token) -> CalcResult<ExprNode<V>> {
        self.parse_value(token).map(ExprNode::Value)
    }

    /// Node for a group that was opened by `open` and closed by `close`.
    pub fn bracket_node(
        &self,
        open: &str,
        close: &str,
        children: Vec<ExprNode<V>>,
    ) -> CalcResult<ExprNode<V>> {
        if !is_valid_bracket_pair(open, close) {
            return Err(ParseError::UnmatchedBrackets {
                open: open.to_string(),
                close: close.to_string(),
            }
            .into());
        }
        Ok(match self.containers.get(open) {
            Some(function) => ExprNode::Container {
                open: open.to_string(),
                function: function.clone(),
                children,
            },
            None => ExprNode::Bracket {
                open: open.to_string(),
                children,
            },
        })
    }
}
