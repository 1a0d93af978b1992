//! Table-driven tokenizer.
//!
//! Recognition order at each position:
//! 1. whitespace (skipped)
//! 2. string literal, bracket, separator
//! 3. identifier, unless a registered operator/modifier at least as long
//!    matches at the same position (`not` beats `no`, `++a` beats nothing)
//! 4. longest registered operator or modifier
//! 5. numeric literal: quoted, hex, octal, binary, decimal
//!
//! Anything else is an error naming the rest of the input.

use crate::escape::unescape_delimited;
use crate::scan;
use tally_ir::{
    is_closing_bracket, is_opening_bracket, CalcResult, Token, TokenKind, TokenizeError,
};

#[derive(Clone, Debug, PartialEq, Eq)]
struct OperatorEntry {
    text: String,
    kind: TokenKind,
}

/// Operator and modifier glyphs known to a dialect.
///
/// Entries are kept sorted longest first, then lexicographically, so the
/// first entry that prefixes the input is the longest match.
#[derive(Clone, Debug, Default)]
pub struct Tokenizer {
    entries: Vec<OperatorEntry>,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operator glyph. A modifier with the same text wins.
    pub fn add_operator(&mut self, text: impl Into<String>) {
        self.insert(text.into(), TokenKind::Operator);
    }

    /// Register a modifier glyph, replacing an operator with the same text.
    pub fn add_modifier(&mut self, text: impl Into<String>) {
        self.insert(text.into(), TokenKind::Modifier);
    }

    fn insert(&mut self, text: String, kind: TokenKind) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.text == text) {
            if kind == TokenKind::Modifier {
                existing.kind = kind;
            }
            return;
        }
        self.entries.push(OperatorEntry { text, kind });
        self.entries
            .sort_by(|a, b| b.text.len().cmp(&a.text.len()).then_with(|| a.text.cmp(&b.text)));
    }

    fn longest_match(&self, input: &str) -> Option<&OperatorEntry> {
        self.entries.iter().find(|e| input.starts_with(e.text.as_str()))
    }

    /// Start tokenizing `input`. Tokens are produced on demand.
    pub fn tokenize<'a>(&'a self, input: &'a str) -> TokenStream<'a> {
        TokenStream {
            tokenizer: self,
            rest: input,
            peeked: None,
            failed: false,
        }
    }
}

/// Lazy token sequence with one token of lookahead.
///
/// After the first error the stream is exhausted.
#[derive(Debug)]
pub struct TokenStream<'a> {
    tokenizer: &'a Tokenizer,
    rest: &'a str,
    peeked: Option<Token>,
    failed: bool,
}

impl TokenStream<'_> {
    /// Look at the next token without consuming it.
    pub fn peek(&mut self) -> CalcResult<Option<&Token>> {
        if self.peeked.is_none() {
            if let Some(token) = self.advance().transpose()? {
                self.peeked = Some(token);
            }
        }
        Ok(self.peeked.as_ref())
    }

    /// Consume the next token, if any.
    pub fn next_token(&mut self) -> CalcResult<Option<Token>> {
        match self.peeked.take() {
            Some(token) => Ok(Some(token)),
            None => self.advance().transpose(),
        }
    }

    fn advance(&mut self) -> Option<CalcResult<Token>> {
        if self.failed {
            return None;
        }
        match self.scan() {
            Ok(token) => token.map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err.into()))
            }
        }
    }

    fn take(&mut self, len: usize, kind: TokenKind) -> Token {
        let (text, rest) = self.rest.split_at(len);
        self.rest = rest;
        emit(Token::new(kind, text))
    }

    fn scan(&mut self) -> Result<Option<Token>, TokenizeError> {
        self.rest = self.rest.trim_start();
        let Some(first) = self.rest.chars().next() else {
            return Ok(None);
        };

        if first == '"' || first == '\'' {
            let (value, consumed) = unescape_delimited(self.rest)?;
            self.rest = &self.rest[consumed..];
            return Ok(Some(emit(Token::new(TokenKind::String, value))));
        }
        if is_opening_bracket(first) {
            return Ok(Some(self.take(first.len_utf8(), TokenKind::LeftBracket)));
        }
        if is_closing_bracket(first) {
            return Ok(Some(self.take(first.len_utf8(), TokenKind::RightBracket)));
        }
        if first == ',' {
            return Ok(Some(self.take(1, TokenKind::Separator)));
        }

        let tokenizer = self.tokenizer;
        let operator = tokenizer.longest_match(self.rest);

        let symbol = scan::symbol_len(self.rest);
        if symbol > 0 {
            if let Some(op) = operator.filter(|op| op.text.len() >= symbol) {
                return Ok(Some(self.take(op.text.len(), op.kind)));
            }
            let counts = scan::call_counts_len(&self.rest[symbol..]);
            if counts > 0 {
                return Ok(Some(self.take(symbol + counts, TokenKind::SymbolWithArgs)));
            }
            let kind = if scan::is_constant(&self.rest[..symbol]) {
                TokenKind::Constant
            } else {
                TokenKind::Symbol
            };
            return Ok(Some(self.take(symbol, kind)));
        }

        if let Some(op) = operator {
            return Ok(Some(self.take(op.text.len(), op.kind)));
        }

        if let Some(number) = scan::number(self.rest) {
            let token = Token::new(number.kind, &self.rest[number.text]);
            self.rest = &self.rest[number.len..];
            return Ok(Some(emit(token)));
        }

        Err(TokenizeError::UnknownToken {
            remaining: self.rest.to_string(),
        })
    }
}

#[inline]
fn emit(token: Token) -> Token {
    tracing::trace!(kind = ?token.kind, text = %token.text, "token");
    token
}

impl Iterator for TokenStream<'_> {
    type Item = CalcResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
