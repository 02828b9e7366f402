//! Numeric token helpers shared by the header scanner and the table builder

/// Whether a token parses as a finite-or-infinite number (NaN is not a number)
pub fn is_number(token: &str) -> bool {
    parse_number(token).is_some()
}

/// Parse a token as a float, rejecting NaN spellings
pub fn parse_number(token: &str) -> Option<f64> {
    token
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| !value.is_nan())
}

/// Parse a depth label, truncating decimal labels toward zero
pub fn parse_depth(token: &str) -> Option<i64> {
    parse_number(token)
        .filter(|value| value.is_finite())
        .map(|value| value.trunc() as i64)
}
