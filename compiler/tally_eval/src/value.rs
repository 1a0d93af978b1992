//! The value bound shared by every engine type.

use std::fmt;

/// Anything the engine can push, pop, print and compare.
///
/// Blanket-implemented; dialects never implement it by hand.
pub trait CalcValue: Clone + fmt::Debug + fmt::Display + PartialEq + 'static {}

impl<T> CalcValue for T where T: Clone + fmt::Debug + fmt::Display + PartialEq + 'static {}
