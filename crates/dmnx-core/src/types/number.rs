//! FEEL number arithmetic on arbitrary-precision decimals
//!
//! Exact operations (`+`, `-`, `*`) keep every digit. Inexact ones
//! (division, square root, non-integer powers) round to decimal128
//! precision.

use crate::error::{CoreError, Result};
use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive, Zero};
use std::str::FromStr;

/// Significant digits kept by inexact operations
pub const PRECISION: u64 = 34;

/// Largest exponent magnitude computed by repeated multiplication
const MAX_EXACT_EXPONENT: u64 = 4096;

/// Parse a decimal literal such as `42`, `-0.5` or `1.2e3`
pub fn parse_number(text: &str) -> Result<BigDecimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidNumber("empty string".to_string()));
    }
    BigDecimal::from_str(trimmed)
        .map_err(|e| CoreError::InvalidNumber(format!("'{}': {}", trimmed, e)))
}

/// Decimal with the shortest digits that round-trip `n`; `None` if not finite
pub fn from_f64(n: f64) -> Option<BigDecimal> {
    if !n.is_finite() {
        return None;
    }
    BigDecimal::from_str(&n.to_string()).ok()
}

/// Plain decimal notation without exponent or trailing zeros
pub fn format_number(n: &BigDecimal) -> String {
    let (digits, scale) = n.normalized().as_bigint_and_exponent();
    let digits = digits.to_string();
    let (sign, magnitude) = match digits.strip_prefix('-') {
        Some(magnitude) => ("-", magnitude),
        None => ("", digits.as_str()),
    };

    if magnitude == "0" {
        return "0".to_string();
    }
    if scale <= 0 {
        return format!("{}{}{}", sign, magnitude, "0".repeat(scale.unsigned_abs() as usize));
    }

    let scale = scale as usize;
    let padded = if magnitude.len() <= scale {
        format!("{}{}", "0".repeat(scale - magnitude.len() + 1), magnitude)
    } else {
        magnitude.to_string()
    };
    let point = padded.len() - scale;
    format!("{}{}.{}", sign, &padded[..point], &padded[point..])
}

/// Round to [`PRECISION`] significant digits
pub fn round_precision(n: &BigDecimal) -> BigDecimal {
    n.with_prec(PRECISION).normalized()
}

/// `None` when dividing by zero
pub fn divide(left: &BigDecimal, right: &BigDecimal) -> Option<BigDecimal> {
    if right.is_zero() {
        return None;
    }
    Some(round_precision(&(left / right)))
}

/// `None` when the result is undefined or not representable
pub fn pow(base: &BigDecimal, exponent: &BigDecimal) -> Option<BigDecimal> {
    if exponent.is_integer() {
        if let Some(e) = exponent.to_i64() {
            if e.unsigned_abs() <= MAX_EXACT_EXPONENT {
                let mut result = BigDecimal::from(1);
                for _ in 0..e.unsigned_abs() {
                    result = round_precision(&(&result * base));
                }
                return if e < 0 {
                    divide(&BigDecimal::from(1), &result)
                } else {
                    Some(result.normalized())
                };
            }
        }
    }
    from_f64(base.to_f64()?.powf(exponent.to_f64()?))
}

/// Round to `scale` fractional digits
pub fn round(n: &BigDecimal, scale: i64, mode: RoundingMode) -> BigDecimal {
    n.with_scale_round(scale, mode).normalized()
}

pub fn floor(n: &BigDecimal) -> BigDecimal {
    round(n, 0, RoundingMode::Floor)
}

pub fn ceiling(n: &BigDecimal) -> BigDecimal {
    round(n, 0, RoundingMode::Ceiling)
}

/// Drop the fractional part
pub fn truncate(n: &BigDecimal) -> BigDecimal {
    round(n, 0, RoundingMode::Down)
}

/// Floored modulo, sign follows the divisor; `None` for a zero divisor
pub fn modulo(dividend: &BigDecimal, divisor: &BigDecimal) -> Option<BigDecimal> {
    if divisor.is_zero() {
        return None;
    }
    let quotient = floor(&(dividend / divisor));
    let product = divisor * &quotient;
    Some((dividend - &product).normalized())
}

/// `None` for negative input
pub fn sqrt(n: &BigDecimal) -> Option<BigDecimal> {
    n.sqrt().map(|root| round_precision(&root))
}

/// Integer value if `n` has no fractional part and fits in `i64`
pub fn to_integer(n: &BigDecimal) -> Option<i64> {
    if n.is_integer() {
        n.to_i64()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(text: &str) -> BigDecimal {
        parse_number(text).unwrap()
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(d("42"), BigDecimal::from(42));
        assert_eq!(d(" 1.50 "), d("1.5"));
        assert!(matches!(parse_number("abc"), Err(CoreError::InvalidNumber(_))));
        assert!(parse_number("").is_err());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(&d("12345678901234567891")), "12345678901234567891");
        assert_eq!(format_number(&d("1000")), "1000");
        assert_eq!(format_number(&d("2.500")), "2.5");
        assert_eq!(format_number(&d("-0.0012")), "-0.0012");
        assert_eq!(format_number(&d("1.2e3")), "1200");
        assert_eq!(format_number(&d("0.000")), "0");
    }

    #[test]
    fn test_decimal_addition_is_exact() {
        assert_eq!(format_number(&(d("0.1") + d("0.2"))), "0.3");
    }

    #[test]
    fn test_divide() {
        assert_eq!(divide(&d("10"), &d("4")), Some(d("2.5")));
        assert_eq!(divide(&d("1"), &d("0")), None);
        let third = divide(&d("1"), &d("3")).unwrap();
        assert_eq!(format_number(&third), format!("0.{}", "3".repeat(34)));
    }

    #[test]
    fn test_pow() {
        assert_eq!(pow(&d("2"), &d("10")), Some(d("1024")));
        assert_eq!(pow(&d("2"), &d("-2")), Some(d("0.25")));
        assert_eq!(pow(&d("1.1"), &d("2")), Some(d("1.21")));
        assert_eq!(pow(&d("4"), &d("0.5")), Some(d("2")));
        assert_eq!(pow(&d("-1"), &d("0.5")), None);
    }

    #[test]
    fn test_rounding_helpers() {
        assert_eq!(round(&d("2.5"), 0, RoundingMode::HalfEven), d("2"));
        assert_eq!(round(&d("2.5"), 0, RoundingMode::HalfUp), d("3"));
        assert_eq!(floor(&d("-1.5")), d("-2"));
        assert_eq!(ceiling(&d("1.2")), d("2"));
        assert_eq!(truncate(&d("-2.7")), d("-2"));
        assert_eq!(modulo(&d("-12"), &d("5")), Some(d("3")));
        assert_eq!(modulo(&d("1"), &d("0")), None);
        assert_eq!(sqrt(&d("16")), Some(d("4")));
        assert_eq!(sqrt(&d("-1")), None);
        assert_eq!(to_integer(&d("7.0")), Some(7));
        assert_eq!(to_integer(&d("7.5")), None);
    }
}
