//! SPICE number parsing.

/// Parse a SPICE-style number with optional SI suffix.
///
/// Supported suffixes (case-insensitive, trailing unit letters ignored):
/// - T (tera, 1e12)
/// - G (giga, 1e9)
/// - MEG (mega, 1e6)
/// - K (kilo, 1e3)
/// - MIL (1/1000 inch)
/// - M (milli, 1e-3)
/// - U or µ (micro, 1e-6)
/// - N (nano, 1e-9)
/// - P (pico, 1e-12)
/// - F (femto, 1e-15)
pub fn parse_spice_number(s: &str) -> Option<f64> {
    let s = s.trim();

    // Try to parse as plain number first
    if let Ok(v) = s.parse::<f64>() {
        return Some(v);
    }

    let num_end = numeric_prefix_len(s.as_bytes());
    if num_end == 0 {
        return None;
    }

    let (num_str, suffix) = s.split_at(num_end);
    let value: f64 = num_str.parse().ok()?;

    let suffix = suffix.to_lowercase();
    let multiplier = if suffix.starts_with("meg") {
        1e6
    } else if suffix.starts_with("mil") {
        25.4e-6
    } else {
        match suffix.chars().next() {
            Some('t') => 1e12,
            Some('g') => 1e9,
            Some('k') => 1e3,
            Some('m') => 1e-3,
            Some('u') | Some('µ') | Some('μ') => 1e-6,
            Some('n') => 1e-9,
            Some('p') => 1e-12,
            Some('f') => 1e-15,
            _ => 1.0,
        }
    };

    Some(value * multiplier)
}

/// Length of the leading `[+-]digits[.digits][e[+-]digits]` run.
fn numeric_prefix_len(bytes: &[u8]) -> usize {
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let digits_start = end;
    while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
        end += 1;
    }
    if end == digits_start {
        return 0;
    }

    // Only consume an exponent if digits follow; "1e" stays "1" + suffix
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|v| (v - b).abs() < b.abs() * 1e-10 + 1e-20)
    }

    #[test]
    fn test_parse_plain_number() {
        assert_eq!(parse_spice_number("1.5"), Some(1.5));
        assert_eq!(parse_spice_number("-2.5"), Some(-2.5));
        assert_eq!(parse_spice_number("1e-006"), Some(1e-6));
    }

    #[test]
    fn test_parse_with_suffix() {
        assert!(approx_eq(parse_spice_number("1k"), 1e3));
        assert!(approx_eq(parse_spice_number("4.7K"), 4.7e3));
        assert!(approx_eq(parse_spice_number("10M"), 10e-3));
        assert!(approx_eq(parse_spice_number("10MEG"), 10e6));
        assert!(approx_eq(parse_spice_number("100nF"), 100e-9));
        assert!(approx_eq(parse_spice_number("10µ"), 10e-6));
        assert!(approx_eq(parse_spice_number("1.5e3k"), 1.5e6));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(parse_spice_number("abc"), None);
        assert_eq!(parse_spice_number(""), None);
        assert_eq!(parse_spice_number("."), None);
    }
}
