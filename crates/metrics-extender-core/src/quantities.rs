use crate::error::{CoreError, Result};

/// Decimal SI suffixes accepted for CPU quantities, as powers of ten.
const DECIMAL_SUFFIXES: &[(&str, i32)] = &[
    ("n", -9),
    ("u", -6),
    ("m", -3),
    ("k", 3),
    ("M", 6),
    ("G", 9),
    ("T", 12),
    ("P", 15),
    ("E", 18),
];

/// Binary suffixes, as powers of two.
const BINARY_SUFFIXES: &[(&str, u32)] = &[
    ("Ki", 10),
    ("Mi", 20),
    ("Gi", 30),
    ("Ti", 40),
    ("Pi", 50),
    ("Ei", 60),
];

/// Numeric part of a quantity and the scale its suffix applies
struct Scaled<'a> {
    number: &'a str,
    decimal_exponent: i32,
    binary_exponent: u32,
}

impl<'a> Scaled<'a> {
    fn decimal(number: &'a str, decimal_exponent: i32) -> Self {
        Self {
            number,
            decimal_exponent,
            binary_exponent: 0,
        }
    }
}

/// Parse a Kubernetes CPU quantity into millicores.
///
/// Accepts plain and fractional cores ("2", "0.5"), SI suffixes ("250m",
/// "123456789n", "1500u", "2k"), binary suffixes ("1Ki") and decimal
/// exponents ("1e3"). Values that
/// are not a whole number of millicores are rounded away from zero, which is
/// how `MilliValue()` reports metrics-server samples such as "12345n".
pub fn parse_cpu_millicores(s: &str) -> Result<i64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(CoreError::invalid_quantity(s, "empty quantity"));
    }

    let Scaled {
        number,
        decimal_exponent: exponent,
        binary_exponent,
    } = split_suffix(trimmed)
        .ok_or_else(|| CoreError::invalid_quantity(s, "unrecognized suffix"))?;

    let (negative, digits) = match number.as_bytes().first() {
        Some(b'-') => (true, &number[1..]),
        Some(b'+') => (false, &number[1..]),
        _ => (false, number),
    };

    let (whole, fraction) = match digits.split_once('.') {
        Some((w, f)) => (w, f),
        None => (digits, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(CoreError::invalid_quantity(s, "missing digits"));
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(CoreError::invalid_quantity(s, "not a decimal number"));
    }

    let mut mantissa: i128 = 0;
    for b in whole.bytes().chain(fraction.bytes()) {
        mantissa = mantissa
            .checked_mul(10)
            .and_then(|m| m.checked_add(i128::from(b - b'0')))
            .ok_or_else(|| CoreError::invalid_quantity(s, "value out of range"))?;
    }
    let mantissa = 2i128
        .checked_pow(binary_exponent)
        .and_then(|p| mantissa.checked_mul(p))
        .ok_or_else(|| CoreError::invalid_quantity(s, "value out of range"))?;

    // millicores = mantissa * 10^(exponent + 3 - fraction digits)
    let shift = exponent + 3 - fraction.len() as i32;
    let magnitude = if shift >= 0 {
        10i128
            .checked_pow(shift as u32)
            .and_then(|p| mantissa.checked_mul(p))
            .ok_or_else(|| CoreError::invalid_quantity(s, "value out of range"))?
    } else {
        let divisor = 10i128
            .checked_pow((-shift) as u32)
            .ok_or_else(|| CoreError::invalid_quantity(s, "value out of range"))?;
        let quotient = mantissa / divisor;
        if mantissa % divisor == 0 {
            quotient
        } else {
            quotient + 1
        }
    };

    let signed = if negative { -magnitude } else { magnitude };
    i64::try_from(signed).map_err(|_| CoreError::invalid_quantity(s, "value out of range"))
}

/// Split a quantity into its numeric part and scale.
fn split_suffix(s: &str) -> Option<Scaled<'_>> {
    for (suffix, exp) in BINARY_SUFFIXES {
        if let Some(number) = s.strip_suffix(suffix) {
            return Some(Scaled {
                number,
                decimal_exponent: 0,
                binary_exponent: *exp,
            });
        }
    }

    if let Some(idx) = s.find(['e', 'E']) {
        let exp = &s[idx + 1..];
        if !exp.is_empty() {
            if let Ok(e) = exp.parse::<i32>() {
                return Some(Scaled::decimal(&s[..idx], e));
            }
        }
    }

    for (suffix, exp) in DECIMAL_SUFFIXES {
        if let Some(number) = s.strip_suffix(suffix) {
            return Some(Scaled::decimal(number, *exp));
        }
    }

    if s.ends_with(|c: char| c.is_ascii_digit() || c == '.') {
        Some(Scaled::decimal(s, 0))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cpu_cores_and_millis() {
        assert_eq!(parse_cpu_millicores("1").unwrap(), 1000);
        assert_eq!(parse_cpu_millicores("0.5").unwrap(), 500);
        assert_eq!(parse_cpu_millicores("100m").unwrap(), 100);
        assert_eq!(parse_cpu_millicores("2").unwrap(), 2000);
        assert_eq!(parse_cpu_millicores(".25").unwrap(), 250);
    }

    #[test]
    fn test_parse_cpu_metrics_server_units() {
        // metrics-server reports nanocores
        assert_eq!(parse_cpu_millicores("250000000n").unwrap(), 250);
        assert_eq!(parse_cpu_millicores("123456789n").unwrap(), 124);
        assert_eq!(parse_cpu_millicores("1500u").unwrap(), 2);
        assert_eq!(parse_cpu_millicores("0n").unwrap(), 0);
    }

    #[test]
    fn test_parse_cpu_large_units() {
        assert_eq!(parse_cpu_millicores("2k").unwrap(), 2_000_000);
        assert_eq!(parse_cpu_millicores("1e3").unwrap(), 1_000_000);
        assert_eq!(parse_cpu_millicores("1P").unwrap(), 1_000_000_000_000_000_000);
        assert!(parse_cpu_millicores("1E").is_err());
    }

    #[test]
    fn test_parse_cpu_binary_units() {
        assert_eq!(parse_cpu_millicores("1Ki").unwrap(), 1_024_000);
        assert_eq!(parse_cpu_millicores("0.5Ki").unwrap(), 512_000);
        assert_eq!(parse_cpu_millicores("2Mi").unwrap(), 2_097_152_000);
        assert!(parse_cpu_millicores("1Ei").is_err());
    }

    #[test]
    fn test_parse_cpu_invalid() {
        assert!(parse_cpu_millicores("").is_err());
        assert!(parse_cpu_millicores("abc").is_err());
        assert!(parse_cpu_millicores("1Xi").is_err());
        assert!(parse_cpu_millicores("m").is_err());
        assert!(parse_cpu_millicores("1.2.3").is_err());
        assert!(parse_cpu_millicores("99999999999999999999").is_err());
    }
}
