//! Token types produced by the tokenizer.
//!
//! A token is a kind plus the raw text it was cut from. Number tokens keep
//! their digits without the radix prefix (`0x1F` becomes hex `1F`), string
//! tokens hold the already-unescaped contents, and symbol tokens carrying an
//! arity suffix keep it verbatim (`dup@2,4`).
//!
//! Parsers never look at the kind directly when deciding how to treat a
//! token; they ask for its [`TokenClass`], which groups kinds into the
//! categories the grammars care about.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Classification of a token kind.
    ///
    /// Derived from the kind alone, so two tokens of the same kind always
    /// classify the same way.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct TokenClass: u8 {
        /// Literal that becomes a constant (numbers and strings).
        const VALUE = 1 << 0;
        /// Numeric literal in some radix.
        const NUMBER = 1 << 1;
        /// Identifier-like token (plain, constant, or with arity suffix).
        const SYMBOL = 1 << 2;
        /// Ends an expression: separators and closing brackets.
        const TERMINATOR = 1 << 3;
        /// Opening or closing bracket.
        const BRACKET = 1 << 4;
    }
}

/// Token kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Decimal numeral: `12`, `1_000.5`.
    DecNumber,
    /// Octal numeral after a leading `0`: `017`.
    OctNumber,
    /// Hexadecimal numeral after `0x`: `0xFF`.
    HexNumber,
    /// Binary numeral after `0b`: `0b1010`.
    BinNumber,
    /// Arbitrary-radix numeral: `16#ff`, `60#'59''30'`.
    QuotedNumber,
    /// Quoted string literal, unescaped.
    String,
    /// Identifier: `foo`, `$ans`.
    Symbol,
    /// Identifier with an explicit call arity suffix: `dup@2,4`.
    SymbolWithArgs,
    /// ALL-CAPS identifier: `PI`, `MAX_DEPTH`.
    Constant,
    /// Registered operator.
    Operator,
    /// Registered modifier (switches parser state for what follows).
    Modifier,
    /// `(`, `[` or `{`.
    LeftBracket,
    /// `)`, `]` or `}`.
    RightBracket,
    /// `,`.
    Separator,
}

impl TokenKind {
    /// Classification flags for this kind.
    pub const fn class(self) -> TokenClass {
        match self {
            TokenKind::DecNumber
            | TokenKind::OctNumber
            | TokenKind::HexNumber
            | TokenKind::BinNumber
            | TokenKind::QuotedNumber => TokenClass::VALUE.union(TokenClass::NUMBER),
            TokenKind::String => TokenClass::VALUE,
            TokenKind::Symbol | TokenKind::SymbolWithArgs | TokenKind::Constant => {
                TokenClass::SYMBOL
            }
            TokenKind::LeftBracket => TokenClass::BRACKET,
            TokenKind::RightBracket => TokenClass::BRACKET.union(TokenClass::TERMINATOR),
            TokenKind::Separator => TokenClass::TERMINATOR,
            TokenKind::Operator | TokenKind::Modifier => TokenClass::empty(),
        }
    }

    #[inline]
    pub const fn is_value(self) -> bool {
        self.class().contains(TokenClass::VALUE)
    }

    #[inline]
    pub const fn is_number(self) -> bool {
        self.class().contains(TokenClass::NUMBER)
    }

    #[inline]
    pub const fn is_symbol(self) -> bool {
        self.class().contains(TokenClass::SYMBOL)
    }

    #[inline]
    pub const fn is_expression_terminator(self) -> bool {
        self.class().contains(TokenClass::TERMINATOR)
    }

    /// Radix of fixed-base numerals. Quoted numerals carry their own radix.
    pub const fn radix(self) -> Option<u32> {
        match self {
            TokenKind::DecNumber => Some(10),
            TokenKind::OctNumber => Some(8),
            TokenKind::HexNumber => Some(16),
            TokenKind::BinNumber => Some(2),
            _ => None,
        }
    }
}

/// A single lexeme.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Token {
            kind,
            text: text.into(),
        }
    }

    #[inline]
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?})", self.kind, self.text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
