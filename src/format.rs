//! pt-BR number formatting for the dashboard.

/// Raw counts with `.` as the thousands separator: `1234567` -> `1.234.567`.
pub fn format_raw(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Round exact half-hundredth ties away from zero.
///
/// `{:.2}` rounds the exact binary value, which matches `toFixed(2)` except on
/// exact ties, where it picks the even digit. A double is an exact tie only
/// when it is an odd multiple of 1/8 (0.125, 12.375, ...); `v * 8` is exact.
fn round_ties_away(value: f64) -> f64 {
    let eighths = value * 8.0;
    if value.abs() < 1e12 && eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        (value * 100.0).round() / 100.0
    } else {
        value
    }
}

/// Percentages with two decimals and a decimal comma: `2.5` -> `2,50%`.
/// No thousands grouping is applied.
pub fn format_rate(value: f64) -> String {
    // negative zero prints unsigned; small negatives keep their sign
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{:.2}%", round_ties_away(value)).replace('.', ",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_raw() {
        assert_eq!(format_raw(0), "0");
        assert_eq!(format_raw(999), "999");
        assert_eq!(format_raw(1000), "1.000");
        assert_eq!(format_raw(25_000), "25.000");
        assert_eq!(format_raw(1_234_567), "1.234.567");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(0.0), "0,00%");
        assert_eq!(format_rate(2.0), "2,00%");
        assert_eq!(format_rate(60.0), "60,00%");
        assert_eq!(format_rate(33.333333), "33,33%");
        assert_eq!(format_rate(1234.5), "1234,50%");
        assert_eq!(format_rate(-1.5), "-1,50%");
        assert_eq!(format_rate(-0.001), "-0,00%");
        assert_eq!(format_rate(-0.0), "0,00%");
    }

    #[test]
    fn test_format_rate_ties_round_up() {
        assert_eq!(format_rate(0.125), "0,13%");
        assert_eq!(format_rate(12.125), "12,13%");
        assert_eq!(format_rate(0.375), "0,38%");
        assert_eq!(format_rate(-0.125), "-0,13%");
        // 1 click over 800 impressions is exactly 0.125%
        assert_eq!(format_rate(crate::metrics::rate(1, 800)), "0,13%");
    }

    #[test]
    fn test_format_rate_near_ties_follow_binary_value() {
        // 1.005 is stored just below the tie
        assert_eq!(format_rate(1.005), "1,00%");
        assert_eq!(format_rate(0.135), "0,14%");
    }
}
