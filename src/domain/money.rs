use std::fmt;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// For EUR/USD, 1 unit = 100 cents, so €50.00 = 5000 cents.
pub type Cents = i64;

/// Format cents as a human-readable decimal string.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Parse a decimal string into cents.
/// At most two fractional digits are accepted: amounts are stored with
/// two-place precision, so anything finer is a caller error rather than a
/// silent rounding decision.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let negative = input.starts_with('-');
    let input = input.trim_start_matches('-');
    if input.is_empty() {
        return Err(ParseCentsError::InvalidFormat);
    }

    let parts: Vec<&str> = input.split('.').collect();
    let cents = match parts.len() {
        1 => {
            let units: i64 = parts[0]
                .parse()
                .map_err(|_| ParseCentsError::InvalidFormat)?;
            units
                .checked_mul(100)
                .ok_or(ParseCentsError::InvalidFormat)?
        }
        2 => {
            let units: i64 = if parts[0].is_empty() {
                0
            } else {
                parts[0]
                    .parse()
                    .map_err(|_| ParseCentsError::InvalidFormat)?
            };

            let decimal_str = parts[1];
            let decimal_cents: i64 = match decimal_str.len() {
                0 => 0,
                1 => {
                    // Single digit like "5" means 50 cents
                    decimal_str
                        .parse::<i64>()
                        .map_err(|_| ParseCentsError::InvalidFormat)?
                        * 10
                }
                2 => decimal_str
                    .parse()
                    .map_err(|_| ParseCentsError::InvalidFormat)?,
                _ => return Err(ParseCentsError::TooManyDecimals),
            };

            units
                .checked_mul(100)
                .and_then(|c| c.checked_add(decimal_cents))
                .ok_or(ParseCentsError::InvalidFormat)?
        }
        _ => return Err(ParseCentsError::InvalidFormat),
    };

    Ok(if negative { -cents } else { cents })
}

/// Parse a transaction or budget amount: a non-negative decimal with at most
/// two fractional digits. Zero is rejected because a zero-amount entry has no
/// effect on any aggregate and is almost certainly an input mistake.
pub fn parse_amount_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let cents = parse_cents(input)?;
    if cents < 0 {
        return Err(ParseCentsError::Negative);
    }
    if cents == 0 {
        return Err(ParseCentsError::Zero);
    }
    Ok(cents)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
    TooManyDecimals,
    Negative,
    Zero,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::TooManyDecimals => {
                write!(f, "amounts carry at most two decimal places")
            }
            ParseCentsError::Negative => write!(f, "amount must not be negative"),
            ParseCentsError::Zero => write!(f, "amount must be greater than zero"),
        }
    }
}

impl std::error::Error for ParseCentsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(5000), "50.00");
        assert_eq!(format_cents(1234), "12.34");
        assert_eq!(format_cents(100), "1.00");
        assert_eq!(format_cents(1), "0.01");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-5000), "-50.00");
        assert_eq!(format_cents(-1), "-0.01");
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("50.00"), Ok(5000));
        assert_eq!(parse_cents("50"), Ok(5000));
        assert_eq!(parse_cents("12.34"), Ok(1234));
        assert_eq!(parse_cents("12.5"), Ok(1250));
        assert_eq!(parse_cents("0.01"), Ok(1));
        assert_eq!(parse_cents(".50"), Ok(50));
        assert_eq!(parse_cents("-50.00"), Ok(-5000));
    }

    #[test]
    fn test_parse_cents_invalid() {
        assert!(parse_cents("abc").is_err());
        assert!(parse_cents("12.34.56").is_err());
        assert!(parse_cents("").is_err());
        assert_eq!(
            parse_cents("100.999"),
            Err(ParseCentsError::TooManyDecimals)
        );
    }

    #[test]
    fn test_parse_cents_overflow() {
        // Well-formed digits whose cent value exceeds i64
        assert_eq!(
            parse_cents("92233720368547759"),
            Err(ParseCentsError::InvalidFormat)
        );
        assert_eq!(
            parse_cents("92233720368547758.99"),
            Err(ParseCentsError::InvalidFormat)
        );
        // The largest representable amount still parses
        assert_eq!(parse_cents("92233720368547758.07"), Ok(i64::MAX));
    }

    #[test]
    fn test_parse_amount_cents() {
        assert_eq!(parse_amount_cents("100"), Ok(10000));
        assert_eq!(parse_amount_cents("0.01"), Ok(1));
        assert_eq!(parse_amount_cents("-1"), Err(ParseCentsError::Negative));
        assert_eq!(parse_amount_cents("0"), Err(ParseCentsError::Zero));
        assert_eq!(parse_amount_cents("0.00"), Err(ParseCentsError::Zero));
    }
}
