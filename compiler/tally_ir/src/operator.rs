//! Operator associativity.

/// How a chain of the same binary operator groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Associativity {
    /// `a - b - c` groups as `(a - b) - c`.
    #[default]
    Left,
    /// `a ** b ** c` groups as `a ** (b ** c)`.
    Right,
}

impl Associativity {
    #[inline]
    pub fn is_left(self) -> bool {
        matches!(self, Associativity::Left)
    }
}
