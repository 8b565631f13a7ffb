//! Engineering units and SI prefix handling.
//!
//! Values parse to exact rationals: the decimal text and the power-of-ten
//! suffix are both exact, so `4.7k` is 4700 with no binary rounding. The
//! only lossy entry point into the value system is `Value::from_f64`.

use num_bigint::BigInt;
use num_rational::BigRational;
use symspice_expr::rational_from_decimal;

/// Parse a SPICE-style value with optional SI suffix into an exact rational.
///
/// Supported suffixes:
/// - T (tera, 1e12)
/// - G (giga, 1e9)
/// - MEG (mega, 1e6)
/// - K (kilo, 1e3)
/// - M (milli, 1e-3)
/// - U (micro, 1e-6)
/// - N (nano, 1e-9)
/// - P (pico, 1e-12)
/// - F (femto, 1e-15)
pub fn parse_value(s: &str) -> Option<BigRational> {
    let s = s.trim().to_uppercase();

    if let Some(v) = rational_from_decimal(&s) {
        return Some(v);
    }

    // Split the numeric part from the suffix.
    let num_end = s
        .find(|c: char| !c.is_ascii_digit() && c != '.' && c != '-' && c != '+' && c != 'E')
        .unwrap_or(s.len());
    if num_end == 0 {
        return None;
    }
    let (num_str, suffix) = s.split_at(num_end);
    let value = rational_from_decimal(num_str)?;

    let exponent: i32 = match suffix {
        "T" => 12,
        "G" => 9,
        "MEG" => 6,
        "K" => 3,
        "" => 0,
        "M" => -3,
        "U" => -6,
        "N" => -9,
        "P" => -12,
        "F" => -15,
        _ => return None,
    };

    let ten = BigInt::from(10);
    let scale = if exponent >= 0 {
        BigRational::from_integer(num_traits::pow(ten, exponent as usize))
    } else {
        BigRational::new(1.into(), num_traits::pow(ten, (-exponent) as usize))
    };
    Some(value * scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rat(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn test_parse_plain_number() {
        assert_eq!(parse_value("1.5"), Some(rat(3, 2)));
        assert_eq!(parse_value("-2.5"), Some(rat(-5, 2)));
        assert_eq!(parse_value("1e-3"), Some(rat(1, 1000)));
    }

    #[test]
    fn test_parse_with_suffix_exact() {
        assert_eq!(parse_value("1k"), Some(rat(1000, 1)));
        assert_eq!(parse_value("4.7K"), Some(rat(4700, 1)));
        assert_eq!(parse_value("10M"), Some(rat(1, 100)));
        assert_eq!(parse_value("10MEG"), Some(rat(10_000_000, 1)));
        assert_eq!(parse_value("100n"), Some(rat(1, 10_000_000)));
        assert_eq!(parse_value("1u"), Some(rat(1, 1_000_000)));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(parse_value("abc"), None);
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("1x"), None);
    }
}
