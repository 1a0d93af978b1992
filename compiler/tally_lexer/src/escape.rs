//! String literal escapes.
//!
//! Recognised escapes: `\\` `\'` `\"` `\0` `\b` `\t` `\n` `\f` `\r`, plus
//! code points written as `\xNN`, `\uNNNN` or `\UNNNNNNNN` (hex digits).
//! Unlike lenient lexers, an unknown escape is an error.

use tally_ir::TokenizeError;

/// Resolve a single escape character to its replacement.
#[inline]
fn resolve_escape(c: char) -> Option<char> {
    match c {
        '\\' => Some('\\'),
        '\'' => Some('\''),
        '"' => Some('"'),
        '0' => Some('\0'),
        'b' => Some('\u{8}'),
        't' => Some('\t'),
        'n' => Some('\n'),
        'f' => Some('\u{c}'),
        'r' => Some('\r'),
        _ => None,
    }
}

/// Inverse of [`resolve_escape`].
#[inline]
fn escape_for(c: char) -> Option<char> {
    match c {
        '\\' => Some('\\'),
        '\'' => Some('\''),
        '"' => Some('"'),
        '\0' => Some('0'),
        '\u{8}' => Some('b'),
        '\t' => Some('t'),
        '\n' => Some('n'),
        '\u{c}' => Some('f'),
        '\r' => Some('r'),
        _ => None,
    }
}

/// Unescape a delimited string literal at the start of `input`.
///
/// The first character of `input` is the delimiter. Returns the decoded
/// contents and the number of bytes consumed, closing delimiter included.
pub fn unescape_delimited(input: &str) -> Result<(String, usize), TokenizeError> {
    let mut chars = input.char_indices();
    let Some((_, delimiter)) = chars.next() else {
        return Err(TokenizeError::UnterminatedString {
            partial: String::new(),
        });
    };

    let mut result = String::new();
    loop {
        let Some((pos, c)) = chars.next() else {
            return Err(TokenizeError::UnterminatedString { partial: result });
        };
        if c == delimiter {
            return Ok((result, pos + c.len_utf8()));
        }
        if c != '\\' {
            result.push(c);
            continue;
        }
        let Some((_, escaped)) = chars.next() else {
            return Err(TokenizeError::UnterminatedEscape { partial: result });
        };
        let width = match escaped {
            'x' => 2,
            'u' => 4,
            'U' => 8,
            _ => {
                result.push(resolve_escape(escaped).ok_or(TokenizeError::InvalidEscape(escaped))?);
                continue;
            }
        };
        let code: String = chars.by_ref().take(width).map(|(_, c)| c).collect();
        if code.chars().count() < width {
            return Err(TokenizeError::UnterminatedEscape { partial: result });
        }
        let decoded = u32::from_str_radix(&code, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| TokenizeError::InvalidCodePoint(format!("\\{escaped}{code}")))?;
        result.push(decoded);
    }
}

/// Quote `value` with `delimiter`, escaping it so that
/// [`unescape_delimited`] reads back the same text.
///
/// Printable ASCII is kept as is; everything else becomes the shortest of
/// `\xNN`, `\uNNNN` and `\UNNNNNNNN` that fits.
pub fn escape_string(value: &str, delimiter: char) -> String {
    let mut result = String::with_capacity(value.len() + 2);
    result.push(delimiter);
    for c in value.chars() {
        if let Some(escape) = escape_for(c) {
            result.push('\\');
            result.push(escape);
        } else if (' '..='~').contains(&c) {
            result.push(c);
        } else {
            let code = u32::from(c);
            let escaped = if code <= 0xFF {
                format!("\\x{code:02X}")
            } else if code <= 0xFFFF {
                format!("\\u{code:04X}")
            } else {
                format!("\\U{code:08X}")
            };
            result.push_str(&escaped);
        }
    }
    result.push(delimiter);
    result
}
