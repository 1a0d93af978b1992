//! Tally Lexer - turns expression text into tokens.
//!
//! The tokenizer is table driven: every dialect registers its own operator
//! and modifier glyphs before compiling, so the scanner cannot be generated
//! ahead of time. Scanning is a small hand-written cursor over the input
//! string plus one longest-match table for operators.
//!
//! Two helpers used after tokenizing live here too:
//! - [`Numeral`] decodes number tokens into digit vectors in their radix
//! - [`escape_string`] is the inverse of string literal unescaping
//! - [`PositionalPrinter`] is the inverse of numeral decoding

mod escape;
mod numeral;
mod positional;
mod scan;
mod tokenizer;

pub use escape::{escape_string, unescape_delimited};
pub use numeral::Numeral;
pub use positional::{PositionalPrinter, DEFAULT_FRACTION_DIGITS};
pub use tokenizer::{TokenStream, Tokenizer};
