use std::ops::RangeInclusive;

use chrono::NaiveDate;

// -----------------------------------------------------------------------------
// CalendarError
// -----------------------------------------------------------------------------
/// Failures raised by calendar queries and lookups.
///
/// Classification is a pure function of the date, so none of these are transient.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq, Hash)]
pub enum CalendarError {
    #[error("The date {date} is out of the supported range [{}, {}]", .range.start(), .range.end())]
    OutOfRange {
        date: NaiveDate,
        range: RangeInclusive<NaiveDate>,
    },
    #[error("Invalid range of dates: end {end} is before start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("{operation} does not support unbounded range of dates")]
    Unbounded { operation: &'static str },
    #[error("Unknown calendar name: '{name}'")]
    UnknownName { name: String },
}

impl CalendarError {
    #[inline]
    pub(crate) fn out_of_range(date: NaiveDate, range: &RangeInclusive<NaiveDate>) -> Self {
        CalendarError::OutOfRange {
            date,
            range: range.clone(),
        }
    }

    #[inline]
    pub(crate) fn unknown_name(name: impl Into<String>) -> Self {
        CalendarError::UnknownName { name: name.into() }
    }

    /// Whether this error reports a date outside of the supported range.
    #[inline]
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, CalendarError::OutOfRange { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_display() {
        let err = CalendarError::out_of_range(ymd(2021, 1, 1), &(ymd(2022, 1, 1)..=ymd(2022, 12, 31)));
        assert_eq!(
            err.to_string(),
            "The date 2021-01-01 is out of the supported range [2022-01-01, 2022-12-31]"
        );

        let err = CalendarError::InvalidRange {
            start: ymd(2021, 1, 5),
            end: ymd(2021, 1, 1),
        };
        assert_eq!(
            err.to_string(),
            "Invalid range of dates: end 2021-01-01 is before start 2021-01-05"
        );

        let err = CalendarError::unknown_name("GBLO+XXXX");
        assert_eq!(err.to_string(), "Unknown calendar name: 'GBLO+XXXX'");
    }

    #[test]
    fn test_is_out_of_range() {
        let err = CalendarError::out_of_range(ymd(2021, 1, 1), &(ymd(2022, 1, 1)..=ymd(2022, 12, 31)));
        assert!(err.is_out_of_range());
        assert!(!CalendarError::unknown_name("X").is_out_of_range());
    }
}
