//! Built-in transitions: notation switches, compile-time folding and
//! `let` blocks.

use std::rc::Rc;

use tally_eval::{CalcValue, Environment, LetBinding, LetBlock};
use tally_ir::{CalcResult, Notation, ParseError};

use crate::node::ExprNode;
use crate::state::{ModifierTransition, SymbolTransition};

#[cold]
fn malformed(form: &'static str, reason: impl Into<String>) -> tally_ir::CalcError {
    ParseError::MalformedForm {
        form,
        reason: reason.into(),
    }
    .into()
}

fn single<V>(form: &'static str, children: Vec<ExprNode<V>>) -> CalcResult<ExprNode<V>> {
    let count = children.len();
    let mut children = children.into_iter();
    match (children.next(), children.next()) {
        (Some(child), None) => Ok(child),
        _ => Err(malformed(form, format!("expected 1 argument, got {count}"))),
    }
}

/// Run `node` now and replace it with the values it leaves.
fn fold<V: CalcValue>(env: &Environment<V>, node: &ExprNode<V>) -> CalcResult<ExprNode<V>> {
    let values = env.execute_isolated(&node.to_program())?;
    tracing::debug!(values = values.len(), "folded constant expression");
    Ok(ExprNode::Values(values))
}

/// `prefix(expr)` / `infix(expr)`: parse the single argument in another
/// notation.
pub struct ParserSwitch {
    target: Notation,
}

impl ParserSwitch {
    pub fn new(target: Notation) -> Self {
        ParserSwitch { target }
    }
}

impl<V: CalcValue> SymbolTransition<V> for ParserSwitch {
    fn target(&self, _current: Notation) -> Notation {
        self.target
    }

    fn create_node(
        &self,
        _env: &Environment<V>,
        _symbol: &str,
        children: Vec<ExprNode<V>>,
    ) -> CalcResult<ExprNode<V>> {
        let child = single(self.target.name(), children)?;
        Ok(ExprNode::Wrapped(Box::new(child)))
    }
}

/// `const(expr)`: evaluate `expr` while compiling.
pub struct ConstTransition;

impl<V: CalcValue> SymbolTransition<V> for ConstTransition {
    fn create_node(
        &self,
        env: &Environment<V>,
        _symbol: &str,
        children: Vec<ExprNode<V>>,
    ) -> CalcResult<ExprNode<V>> {
        let child = single("const", children)?;
        fold(env, &child)
    }
}

/// `#expr`: modifier form of [`ConstTransition`].
pub struct FoldModifier;

impl<V: CalcValue> ModifierTransition<V> for FoldModifier {
    fn create_node(&self, env: &Environment<V>, child: ExprNode<V>) -> CalcResult<ExprNode<V>> {
        fold(env, &child)
    }
}

/// `let([name: expr, f(a, b): expr], body)`.
///
/// The first argument is a `[...]` group of bindings, each a binary node
/// whose operator is one of the separators. A plain name on the left binds
/// a lazily evaluated constant; a call with plain-name arguments binds a
/// local function with those parameters.
pub struct LetTransition {
    separators: Vec<String>,
}

impl LetTransition {
    pub fn new<S: Into<String>>(separators: impl IntoIterator<Item = S>) -> Self {
        LetTransition {
            separators: separators.into_iter().map(Into::into).collect(),
        }
    }

    fn binding<V: CalcValue>(&self, node: &ExprNode<V>) -> CalcResult<LetBinding<V>> {
        let ExprNode::Binary { op, left, right } = node else {
            return Err(malformed("let", "bindings must have the form 'name: value'"));
        };
        if !self.separators.contains(&op.id) {
            return Err(malformed(
                "let",
                format!("'{}' can't separate a name from its value", op.id),
            ));
        }
        match left.as_ref() {
            ExprNode::SymbolGet(name) => Ok(LetBinding::constant(name.clone(), right.to_program())),
            ExprNode::SymbolCall { name, args } => {
                let params = args
                    .iter()
                    .map(|arg| match arg {
                        ExprNode::SymbolGet(param) => Ok(param.clone()),
                        _ => Err(malformed(
                            "let",
                            format!("parameters of '{name}' must be plain names"),
                        )),
                    })
                    .collect::<CalcResult<Vec<_>>>()?;
                Ok(LetBinding::function(name.clone(), params, right.to_program()))
            }
            _ => Err(malformed("let", "binding target must be a name or a call")),
        }
    }
}

impl<V: CalcValue> SymbolTransition<V> for LetTransition {
    fn create_node(
        &self,
        _env: &Environment<V>,
        _symbol: &str,
        children: Vec<ExprNode<V>>,
    ) -> CalcResult<ExprNode<V>> {
        let count = children.len();
        let [bindings, body]: [ExprNode<V>; 2] = children
            .try_into()
            .map_err(|_| malformed("let", format!("expected 2 arguments, got {count}")))?;
        if bindings.bracket() != Some("[") {
            return Err(malformed("let", "bindings must be a '[...]' list"));
        }
        let bindings = bindings
            .children()
            .iter()
            .map(|binding| self.binding(binding))
            .collect::<CalcResult<Vec<_>>>()?;
        Ok(ExprNode::Let(Rc::new(LetBlock::new(bindings, body.to_program()))))
    }
}
