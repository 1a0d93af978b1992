//! Printing answers in a radix other than ten.

use tally_lexer::PositionalPrinter;
use tally_types::TypedValue;

/// Values with a positional rendering. Values that aren't numbers fall
/// back to their usual [`Display`](std::fmt::Display).
pub trait RadixDisplay {
    fn to_radix_string(&self, printer: &PositionalPrinter) -> String;
}

impl RadixDisplay for i64 {
    fn to_radix_string(&self, printer: &PositionalPrinter) -> String {
        printer.integer(*self)
    }
}

impl RadixDisplay for f64 {
    fn to_radix_string(&self, printer: &PositionalPrinter) -> String {
        printer.float(*self)
    }
}

impl RadixDisplay for TypedValue {
    fn to_radix_string(&self, printer: &PositionalPrinter) -> String {
        if let Some(value) = self.downcast_ref::<i64>() {
            printer.integer(*value)
        } else if let Some(value) = self.downcast_ref::<f64>() {
            printer.float(*value)
        } else {
            self.to_string()
        }
    }
}
