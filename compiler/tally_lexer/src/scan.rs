//! Byte-level matchers for the lexeme shapes the tokenizer recognises.
//!
//! Each matcher looks at the start of a string slice and returns how many
//! bytes it would consume, or zero/`None` when the shape does not start
//! there. All shapes are ASCII, so byte offsets are always char boundaries.

use std::ops::Range;
use tally_ir::TokenKind;

#[inline]
fn is_symbol_start(c: u8) -> bool {
    c == b'_' || c == b'$' || c.is_ascii_alphabetic()
}

#[inline]
fn is_symbol_continue(c: u8) -> bool {
    is_symbol_start(c) || c.is_ascii_digit()
}

#[inline]
fn is_quoted_digit(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'\'' || c == b'"'
}

/// Length of an identifier (`[_A-Za-z$][_0-9A-Za-z$]*`) at the start of `s`.
pub(crate) fn symbol_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(&c) if is_symbol_start(c) => {
            1 + bytes[1..]
                .iter()
                .take_while(|&&c| is_symbol_continue(c))
                .count()
        }
        _ => 0,
    }
}

/// Length of an arity suffix (`@[0-9]*,?[0-9]*`) at the start of `s`.
///
/// A bare `@` is not a suffix; it is left for the operator table, where
/// dialects register it as the symbol-read modifier.
pub(crate) fn call_counts_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'@') {
        return 0;
    }
    let mut pos = 1;
    pos += ascii_digits(&bytes[pos..]);
    if bytes.get(pos) == Some(&b',') {
        pos += 1;
        pos += ascii_digits(&bytes[pos..]);
    }
    if pos == 1 {
        0
    } else {
        pos
    }
}

/// ALL-CAPS identifiers: `PI`, `MAX_2`.
pub(crate) fn is_constant(symbol: &str) -> bool {
    let bytes = symbol.as_bytes();
    bytes.first().is_some_and(u8::is_ascii_uppercase)
        && bytes
            .iter()
            .all(|&c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == b'_')
}

fn ascii_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|c| c.is_ascii_digit()).count()
}

/// Matches `D(?:_*D+)*` (or `(?:_*D+)+` when `leading_digit` is false).
///
/// Underscores are only consumed when at least one digit follows them, so
/// trailing underscores are left for the next token.
fn digit_groups(bytes: &[u8], is_digit: fn(u8) -> bool, leading_digit: bool) -> usize {
    let mut pos = 0;
    if leading_digit {
        match bytes.first() {
            Some(&c) if is_digit(c) => pos = 1,
            _ => return 0,
        }
    }
    loop {
        let underscores = bytes[pos..].iter().take_while(|&&c| c == b'_').count();
        let run = bytes[pos + underscores..]
            .iter()
            .take_while(|&&c| is_digit(c))
            .count();
        if run == 0 {
            return pos;
        }
        pos += underscores + run;
    }
}

/// Integer digit groups plus an optional `.`-separated fractional part.
fn digits_with_fraction(bytes: &[u8], is_digit: fn(u8) -> bool, leading_digit: bool) -> usize {
    let integer = digit_groups(bytes, is_digit, leading_digit);
    if integer == 0 {
        return 0;
    }
    if bytes.get(integer) == Some(&b'.') {
        let fraction = digit_groups(&bytes[integer + 1..], is_digit, true);
        if fraction > 0 {
            return integer + 1 + fraction;
        }
    }
    integer
}

/// A matched numeric literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NumberMatch {
    pub kind: TokenKind,
    /// Bytes consumed, radix prefix included.
    pub len: usize,
    /// The part kept as token text.
    pub text: Range<usize>,
}

/// Numeric literal at the start of `s`, tried as quoted, hex, octal,
/// binary and finally decimal.
pub(crate) fn number(s: &str) -> Option<NumberMatch> {
    let bytes = s.as_bytes();
    quoted(bytes)
        .or_else(|| prefixed(bytes, b"0x", TokenKind::HexNumber, |c| c.is_ascii_hexdigit(), true))
        .or_else(|| prefixed(bytes, b"0", TokenKind::OctNumber, |c| matches!(c, b'0'..=b'7'), false))
        .or_else(|| prefixed(bytes, b"0b", TokenKind::BinNumber, |c| matches!(c, b'0' | b'1'), true))
        .or_else(|| prefixed(bytes, b"", TokenKind::DecNumber, |c| c.is_ascii_digit(), true))
}

fn prefixed(
    bytes: &[u8],
    prefix: &[u8],
    kind: TokenKind,
    is_digit: fn(u8) -> bool,
    leading_digit: bool,
) -> Option<NumberMatch> {
    let rest = bytes.strip_prefix(prefix)?;
    let len = digits_with_fraction(rest, is_digit, leading_digit);
    (len > 0).then(|| NumberMatch {
        kind,
        len: prefix.len() + len,
        text: prefix.len()..prefix.len() + len,
    })
}

/// `<radix>#<digits>`, kept whole as token text.
fn quoted(bytes: &[u8]) -> Option<NumberMatch> {
    let radix = ascii_digits(bytes);
    if radix == 0 || bytes.get(radix) != Some(&b'#') {
        return None;
    }
    let digits = digits_with_fraction(&bytes[radix + 1..], is_quoted_digit, true);
    (digits > 0).then(|| NumberMatch {
        kind: TokenKind::QuotedNumber,
        len: radix + 1 + digits,
        text: 0..radix + 1 + digits,
    })
}
