use super::*;
use crate::Numeral;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn printer(radix: u32) -> PositionalPrinter {
    PositionalPrinter::new(radix, DEFAULT_FRACTION_DIGITS).unwrap()
}

#[test]
fn test_integers() {
    assert_eq!(printer(10).integer(0), "0");
    assert_eq!(printer(2).integer(10), "1010");
    assert_eq!(printer(16).integer(-255), "-ff");
    assert_eq!(printer(36).integer(35), "z");
    assert_eq!(printer(16).integer(i64::MIN), "-8000000000000000");
}

#[test]
fn test_large_digits_are_quoted() {
    assert_eq!(printer(60).integer(59 * 60 + 30), "'59''30'");
    assert_eq!(printer(100).integer(3600), "'36'0");
}

#[test]
fn test_floats() {
    assert_eq!(printer(2).float(2.5), "10.1");
    assert_eq!(printer(2).float(-10.25), "-1010.01");
    assert_eq!(printer(16).float(255.0), "ff");
    assert_eq!(printer(10).float(0.0), "0");
    assert_eq!(printer(8).float(0.125), "0.1");
}

#[test]
fn test_fraction_digits_are_capped() {
    let short = PositionalPrinter::new(2, 4).unwrap();
    assert_eq!(short.float(0.1), "0.0001");
    let none = PositionalPrinter::new(2, 0).unwrap();
    assert_eq!(none.float(3.75), "11");
}

#[test]
fn test_non_finite_floats() {
    assert_eq!(printer(2).float(f64::INFINITY), "inf");
    assert_eq!(printer(2).float(f64::NEG_INFINITY), "-inf");
    assert_eq!(printer(2).float(f64::NAN), "NaN");
}

#[test]
fn test_radix_below_two() {
    assert_eq!(PositionalPrinter::new(1, 4).unwrap_err().category(), "type");
    assert_eq!(PositionalPrinter::new(0, 4).unwrap_err().category(), "type");
}

proptest! {
    #[test]
    fn prop_printed_integers_read_back(value in 0..i64::MAX, radix in 2u32..200) {
        let digits = printer(radix).integer(value);
        let numeral = Numeral::parse_quoted(&format!("{radix}#{digits}")).unwrap();
        prop_assert_eq!(numeral.integer_value(), Some(value));
    }
}
