//! Positional-notation decoding of number tokens.
//!
//! A numeral is decoded into digit vectors first and only then into a
//! concrete number type, so each dialect decides for itself how to treat
//! fractions and overflow.
//!
//! Quoted numerals (`radix#digits`) allow any radix of at least 2. Digits up
//! to 35 may be written as `0-9`/`a-z`/`A-Z`; any digit may also be written
//! in decimal between single quotes (`60#'59''30'`), and `"` stands for `''`.

use tally_ir::{ParseError, Token, TokenKind};

const MIN_RADIX: u32 = 2;
const MAX_CHAR_RADIX: u32 = 36;

/// Digits of a number in some radix, most significant first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Numeral {
    pub radix: u32,
    pub integer: Vec<u32>,
    pub fraction: Option<Vec<u32>>,
}

impl Numeral {
    /// Decode a number token.
    pub fn from_token(token: &Token) -> Result<Self, ParseError> {
        if token.kind == TokenKind::QuotedNumber {
            return Self::parse_quoted(&token.text);
        }
        match token.kind.radix() {
            Some(radix) => Self::parse(&token.text, radix),
            None => Err(invalid(&token.text, "not a number token")),
        }
    }

    /// Decode plain digits (`_` separators allowed) in `radix`.
    pub fn parse(text: &str, radix: u32) -> Result<Self, ParseError> {
        if !(MIN_RADIX..=MAX_CHAR_RADIX).contains(&radix) {
            return Err(invalid(text, format!("unsupported radix {radix}")));
        }
        split(text, radix, |part| simple_digits(text, part, radix))
    }

    /// Decode a `radix#digits` literal.
    pub fn parse_quoted(text: &str) -> Result<Self, ParseError> {
        let Some((radix_text, digits)) = text.split_once('#') else {
            return Err(invalid(text, "missing '#'"));
        };
        if radix_text.is_empty() {
            return Err(invalid(text, "no radix given"));
        }
        let radix: u32 = radix_text
            .parse()
            .map_err(|_| invalid(text, "radix out of range"))?;
        if radix < MIN_RADIX {
            return Err(invalid(text, format!("radix must be at least {MIN_RADIX}")));
        }
        let digits = digits.replace('"', "''");
        split(&digits, radix, |part| quoted_digits(text, part, radix))
    }

    #[inline]
    pub fn is_integer(&self) -> bool {
        self.fraction.is_none()
    }

    /// Integer part as `i64`, `None` on overflow.
    pub fn integer_value(&self) -> Option<i64> {
        let radix = i64::from(self.radix);
        self.integer.iter().try_fold(0i64, |acc, &digit| {
            acc.checked_mul(radix)?.checked_add(i64::from(digit))
        })
    }

    /// The whole value as a float.
    pub fn to_f64(&self) -> f64 {
        let radix = f64::from(self.radix);
        let integer = self
            .integer
            .iter()
            .fold(0.0, |acc, &digit| acc * radix + f64::from(digit));
        let fraction = self.fraction.as_deref().unwrap_or_default();
        let fraction = fraction
            .iter()
            .rev()
            .fold(0.0, |acc, &digit| (acc + f64::from(digit)) / radix);
        integer + fraction
    }
}

fn invalid(literal: &str, reason: impl Into<String>) -> ParseError {
    ParseError::InvalidNumber {
        literal: literal.to_string(),
        reason: reason.into(),
    }
}

fn split(
    text: &str,
    radix: u32,
    mut digits: impl FnMut(&str) -> Result<Vec<u32>, ParseError>,
) -> Result<Numeral, ParseError> {
    let mut parts = text.split('.');
    let integer = digits(parts.next().unwrap_or_default())?;
    let fraction = parts.next().map(&mut digits).transpose()?;
    if parts.next().is_some() {
        return Err(invalid(text, "more than one '.'"));
    }
    Ok(Numeral {
        radix,
        integer,
        fraction,
    })
}

fn simple_digits(literal: &str, part: &str, radix: u32) -> Result<Vec<u32>, ParseError> {
    part.chars()
        .filter(|&c| c != '_')
        .map(|c| {
            c.to_digit(radix)
                .ok_or_else(|| invalid_digit(literal, radix, &c.to_string()))
        })
        .collect()
}

fn quoted_digits(literal: &str, part: &str, radix: u32) -> Result<Vec<u32>, ParseError> {
    let char_radix = radix.min(MAX_CHAR_RADIX);
    let mut result = Vec::with_capacity(part.len());
    let mut rest = part;
    while let Some(c) = rest.chars().next() {
        rest = &rest[c.len_utf8()..];
        match c {
            '_' => {}
            '\'' => {
                let Some((digit_text, tail)) = rest.split_once('\'') else {
                    return Err(invalid(literal, "unmatched quote"));
                };
                let digit: u32 = digit_text
                    .parse()
                    .map_err(|_| invalid_digit(literal, radix, digit_text))?;
                if digit >= radix {
                    return Err(invalid_digit(literal, radix, digit_text));
                }
                result.push(digit);
                rest = tail;
            }
            _ => {
                let digit = c
                    .to_digit(char_radix)
                    .ok_or_else(|| invalid_digit(literal, radix, &c.to_string()))?;
                result.push(digit);
            }
        }
    }
    Ok(result)
}

fn invalid_digit(literal: &str, radix: u32, digit: &str) -> ParseError {
    invalid(literal, format!("invalid digit '{digit}' in base {radix}"))
}
