//! Bracket pairs recognised by the tokenizer.
//!
//! Every opening glyph has exactly one closing glyph. Parsers use
//! [`closing_bracket`] to know which glyph must terminate a group, and
//! report a mismatch when anything else shows up.

const PAIRS: [(char, char); 3] = [('(', ')'), ('[', ']'), ('{', '}')];

/// Returns `true` for `(`, `[` and `{`.
#[inline]
pub fn is_opening_bracket(ch: char) -> bool {
    PAIRS.iter().any(|&(open, _)| open == ch)
}

/// Returns `true` for `)`, `]` and `}`.
#[inline]
pub fn is_closing_bracket(ch: char) -> bool {
    PAIRS.iter().any(|&(_, close)| close == ch)
}

/// The closing glyph that matches `open`, if `open` is an opening bracket.
pub fn closing_bracket(open: &str) -> Option<&'static str> {
    match open {
        "(" => Some(")"),
        "[" => Some("]"),
        "{" => Some("}"),
        _ => None,
    }
}

/// Returns `true` if `close` terminates a group opened by `open`.
pub fn is_valid_bracket_pair(open: &str, close: &str) -> bool {
    closing_bracket(open) == Some(close)
}
