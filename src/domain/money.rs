use std::fmt;

/// Money is represented as integer cents to avoid floating-point drift in totals.
/// 1 unit = 100 cents, so 50.00 = 5000 cents.
pub type Cents = i64;

/// One whole currency unit.
pub const UNIT: Cents = 100;

/// Largest single amount or goal the ledger accepts (one billion units).
/// Keeps sums over any realistic number of entries well inside `i64`.
pub const MAX_AMOUNT: Cents = 1_000_000_000 * UNIT;

/// Format cents as a human-readable amount.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    let units = abs_cents / 100;
    let remainder = abs_cents % 100;
    format!("{}{}.{:02}", sign, units, remainder)
}

/// Parse a decimal string into cents.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let (negative, input) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let parts: Vec<&str> = input.split('.').collect();
    let cents = match parts.as_slice() {
        [units] => parse_digits(units)?
            .checked_mul(100)
            .ok_or(ParseCentsError::Overflow)?,
        [units, decimals] => {
            if units.is_empty() && decimals.is_empty() {
                return Err(ParseCentsError::InvalidFormat);
            }
            let units = if units.is_empty() {
                0
            } else {
                parse_digits(units)?
            };

            // Pad or truncate the fractional part to 2 digits
            let decimal_cents = match decimals.len() {
                0 => 0,
                1 => parse_digits(decimals)? * 10,
                _ => parse_digits(&decimals[..2])?,
            };
            if decimals.len() > 2 {
                parse_digits(&decimals[2..])?;
            }

            units
                .checked_mul(100)
                .and_then(|c| c.checked_add(decimal_cents))
                .ok_or(ParseCentsError::Overflow)?
        }
        _ => return Err(ParseCentsError::InvalidFormat),
    };

    Ok(if negative { -cents } else { cents })
}

fn parse_digits(s: &str) -> Result<i64, ParseCentsError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseCentsError::InvalidFormat);
    }
    s.parse().map_err(|_| ParseCentsError::Overflow)
}

/// Percentage of `part` over `whole`. Callers guard `whole == 0`.
pub fn percentage(part: Cents, whole: Cents) -> f64 {
    part as f64 / whole as f64 * 100.0
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
    Overflow,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::Overflow => write!(f, "amount is too large"),
        }
    }
}

impl std::error::Error for ParseCentsError {}
