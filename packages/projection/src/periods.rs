//! Parsing of user-entered target periods.

use std::collections::BTreeSet;

use crate::ProjectionError;

/// Parses a comma-separated list of years.
///
/// Tokens are trimmed; anything that is not a run of ASCII digits is
/// skipped. The result is deduplicated and sorted ascending.
#[must_use]
pub fn parse_periods(input: &str) -> Vec<i32> {
    input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|token| token.parse::<i32>().ok())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Like [`parse_periods`], but an input without any valid year is an
/// error.
///
/// # Errors
///
/// Returns [`ProjectionError::NoValidPeriods`] when nothing parses.
pub fn require_periods(input: &str) -> Result<Vec<i32>, ProjectionError> {
    let periods = parse_periods(input);
    if periods.is_empty() {
        return Err(ProjectionError::NoValidPeriods {
            input: input.to_string(),
        });
    }
    Ok(periods)
}

/// Renders periods back into the input format.
#[must_use]
pub fn format_periods(periods: &[i32]) -> String {
    periods
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_years() {
        assert_eq!(parse_periods("2022, 2023, 2024"), vec![2022, 2023, 2024]);
    }

    #[test]
    fn skips_invalid_tokens_and_deduplicates() {
        assert_eq!(parse_periods("2022,2022,abc,2021"), vec![2021, 2022]);
        assert_eq!(parse_periods(" 2030 ,, -5, 20.5, 2025"), vec![2025, 2030]);
    }

    #[test]
    fn empty_input_yields_no_periods() {
        assert!(parse_periods("").is_empty());
        assert!(parse_periods(" , ,").is_empty());
    }

    #[test]
    fn overflowing_tokens_are_skipped() {
        assert_eq!(parse_periods("99999999999, 2024"), vec![2024]);
    }

    #[test]
    fn require_periods_reports_the_raw_input() {
        let err = require_periods("abc").unwrap_err();
        assert!(matches!(&err, ProjectionError::NoValidPeriods { input } if input == "abc"));
        assert!(err.to_string().contains("comma-separated integers"));
        assert_eq!(require_periods("2024").unwrap(), vec![2024]);
    }

    #[test]
    fn formats_periods_for_display() {
        assert_eq!(format_periods(&[2022, 2023]), "2022, 2023");
    }
}
