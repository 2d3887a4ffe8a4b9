//! Number formatting for insight text and KPI cards.

use num_format::{Locale, ToFormattedString};

/// Group the digits of a plain decimal string (`-1234.5`) with `,`.
///
/// The integer part goes through `num_format`; digit runs too long for `u128`
/// are left ungrouped.
fn group_digits(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let grouped = int_part
        .parse::<u128>()
        .map(|whole| whole.to_formatted_string(&Locale::en))
        .unwrap_or_else(|_| int_part.to_string());

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// `value` with `decimals` fraction digits and thousands separators.
/// Non-finite values print as `nan`, `inf` or `-inf`.
pub fn thousands(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    group_digits(&format!("{:.*}", decimals, value))
}

/// Shortest representation with thousands separators (`80000.0` prints as `80,000`).
pub fn number(value: f64) -> String {
    if !value.is_finite() {
        return thousands(value, 0);
    }
    group_digits(&value.to_string())
}

pub fn count(value: usize) -> String {
    value.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(thousands(1_075_684.4, 0), "1,075,684");
        assert_eq!(thousands(903_000.0, 0), "903,000");
        assert_eq!(thousands(999.0, 0), "999");
        assert_eq!(thousands(-1234.5, 1), "-1,234.5");
        assert_eq!(thousands(3.04, 1), "3.0");
        assert_eq!(thousands(-0.3, 1), "-0.3");
    }

    #[test]
    fn non_finite_values() {
        assert_eq!(thousands(f64::NAN, 0), "nan");
        assert_eq!(thousands(f64::INFINITY, 0), "inf");
        assert_eq!(number(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn shortest_numbers_and_counts() {
        assert_eq!(number(80_000.0), "80,000");
        assert_eq!(number(1_234_567.5), "1,234,567.5");
        assert_eq!(number(-37.7707), "-37.7707");
        assert_eq!(count(13_580), "13,580");
        assert_eq!(count(0), "0");
    }

    #[test]
    fn oversized_values_stay_readable() {
        assert_eq!(number(1e40), "1".to_string() + &"0".repeat(40));
    }
}
