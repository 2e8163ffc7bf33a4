//! Month bucketing: every transaction lives at the first day of its
//! (month, year), midnight, which doubles as the uniqueness key and the
//! range-scan bound.

use chrono::{NaiveDate, NaiveDateTime, Utc};

use crate::errors::AppError;
use crate::validation;

/// The canonical expiry timestamp for a (month, year) bucket.
///
/// Both parts must already be validated: `month` to [1, 12] and `year`
/// to the accepted range, which stays far below chrono's calendar limit.
pub fn canonical_expiry(month: u32, year: i32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, 1)
        .expect("month and year validated to representable ranges")
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
}

/// Parses a `YYYY-MM` query token into its canonical bucket timestamp.
pub fn parse_range_token(token: &str, initial_year: i32) -> Result<NaiveDateTime, AppError> {
    let (month, year) = validation::validate_date_token(token, initial_year)?;
    Ok(canonical_expiry(month, year))
}

/// Inclusive query range over bucket timestamps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    /// Default range when the query omits boundaries: from the first
    /// supported bucket up to now.
    pub fn defaults(initial_year: i32) -> Self {
        Self {
            start: canonical_expiry(1, initial_year),
            end: Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_first_of_month_at_midnight() {
        let expiry = canonical_expiry(4, 2017);
        assert_eq!(expiry.to_string(), "2017-04-01 00:00:00");
    }

    #[test]
    fn range_token_parses_to_the_same_bucket() {
        let parsed = parse_range_token("2017-04", 2002).unwrap();
        assert_eq!(parsed, canonical_expiry(4, 2017));
    }

    #[test]
    fn range_token_failures_propagate() {
        assert!(parse_range_token("2015-May", 2002).is_err());
        assert!(parse_range_token("-2015-05", 2002).is_err());
    }

    #[test]
    fn default_range_starts_at_the_initial_year() {
        let range = DateRange::defaults(2002);
        assert_eq!(range.start, canonical_expiry(1, 2002));
        assert!(range.end > range.start);
    }
}
