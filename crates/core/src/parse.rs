//! Lenient field parsing for untyped record values.
//!
//! Every parser returns `None` on failure; callers decide whether a failure
//! means exclusion or a zero contribution.

/// Parse a quantity (stock level, units shipped) by its leading integer.
///
/// Leading whitespace, an optional sign, then the run of decimal digits; whatever
/// follows the digits is ignored (`"12 units"` is 12, `"7.9"` is 7, `"1e3"` is 1).
/// No leading digits, or a value outside `i64`, is a failure.
pub fn parse_quantity(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let sign_len = usize::from(s.starts_with(['+', '-']));
    let digits = s[sign_len..].bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse::<i64>().ok()
}

/// Parse a finite decimal (prices, percentages).
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}
