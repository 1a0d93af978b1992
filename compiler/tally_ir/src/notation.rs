//! Surface notations accepted by the compiler.

use std::fmt;
use std::str::FromStr;

/// One of the three interchangeable surface syntaxes.
///
/// All notations compile to the same instruction model, so a program
/// written in any of them executes identically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Notation {
    /// Lisp-like: `(+ 1 (* 2 3))`.
    Prefix,
    /// Algebraic: `1 + 2 * 3`.
    Infix,
    /// Reverse Polish: `1 2 3 * +`.
    Postfix,
}

impl Notation {
    /// All notations, in declaration order.
    pub const ALL: [Notation; 3] = [Notation::Prefix, Notation::Infix, Notation::Postfix];

    /// Lower-case name, also accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Notation::Prefix => "prefix",
            Notation::Infix => "infix",
            Notation::Postfix => "postfix",
        }
    }

    /// Whether a complete program in this notation always leaves one value.
    ///
    /// AST notations parse a single expression; postfix programs can leave
    /// any number of values on the stack.
    pub fn has_single_result(self) -> bool {
        !matches!(self, Notation::Postfix)
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Notation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Notation::ALL
            .into_iter()
            .find(|n| n.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown notation '{s}'"))
    }
}
