//! Positional-notation printing, the inverse of [`Numeral`](crate::Numeral).
//!
//! Digits below 36 are written as `0-9a-z`. Larger digits are written in
//! decimal between single quotes, so `60#` numerals print as `'59''30'` and
//! read back through a quoted numeral unchanged.

use std::fmt::Write as _;

use tally_ir::{invalid_value, CalcResult};

const MIN_RADIX: u32 = 2;
const MAX_CHAR_RADIX: u32 = 36;

/// Fraction digits printed when no limit is given.
pub const DEFAULT_FRACTION_DIGITS: usize = 20;

/// Prints integers and floats in a fixed radix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PositionalPrinter {
    radix: u32,
    max_fraction_digits: usize,
}

impl PositionalPrinter {
    pub fn new(radix: u32, max_fraction_digits: usize) -> CalcResult<Self> {
        if radix < MIN_RADIX {
            return Err(invalid_value(format_args!(
                "radix must be at least {MIN_RADIX}, got {radix}"
            )));
        }
        Ok(PositionalPrinter {
            radix,
            max_fraction_digits,
        })
    }

    #[inline]
    pub fn radix(&self) -> u32 {
        self.radix
    }

    pub fn integer(&self, value: i64) -> String {
        let mut out = String::new();
        if value < 0 {
            out.push('-');
        }
        let radix = u64::from(self.radix);
        let mut magnitude = value.unsigned_abs();
        let mut digits = Vec::new();
        loop {
            digits.push(magnitude % radix);
            magnitude /= radix;
            if magnitude == 0 {
                break;
            }
        }
        for digit in digits.into_iter().rev() {
            push_digit(&mut out, digit);
        }
        out
    }

    /// Integer part in full, then at most `max_fraction_digits` digits
    /// after the point. Trailing zero digits are never printed; a value
    /// without fraction has no point at all.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "every cast value is a whole number below the radix"
    )]
    pub fn float(&self, value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        let mut out = String::new();
        if value < 0.0 {
            out.push('-');
        }
        let radix = f64::from(self.radix);
        let magnitude = value.abs();
        let mut integer = magnitude.trunc();
        let mut fraction = magnitude - integer;

        let mut digits = Vec::new();
        loop {
            digits.push((integer % radix) as u64);
            integer = (integer / radix).trunc();
            if integer < 1.0 {
                break;
            }
        }
        for digit in digits.into_iter().rev() {
            push_digit(&mut out, digit);
        }

        let mut written = 0;
        let mut tail = String::new();
        while fraction > 0.0 && written < self.max_fraction_digits {
            fraction *= radix;
            let digit = fraction.trunc();
            fraction -= digit;
            push_digit(&mut tail, digit as u64);
            written += 1;
        }
        let tail = tail.trim_end_matches('0');
        if !tail.is_empty() {
            out.push('.');
            out.push_str(tail);
        }
        out
    }
}

fn push_digit(out: &mut String, digit: u64) {
    match u32::try_from(digit).ok().and_then(|d| char::from_digit(d, MAX_CHAR_RADIX)) {
        Some(c) => out.push(c),
        None => {
            let _ = write!(out, "'{digit}'");
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
