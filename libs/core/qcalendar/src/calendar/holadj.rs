use chrono::{Datelike, NaiveDate};

use super::{CalendarError, HolidayCalendar};

// -----------------------------------------------------------------------------
// BizdayAdj
// -----------------------------------------------------------------------------
/// Convention to move a holiday onto a business day.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    schemars::JsonSchema,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum BizdayAdj {
    /// The next business day.
    Following,
    /// The next business day unless it is in the next month, otherwise the previous business day.
    ModifiedFollowing,
    /// The previous business day.
    Preceding,
    /// The previous business day unless it is in the previous month, otherwise the next business day.
    ModifiedPreceding,
}

impl BizdayAdj {
    /// Adjust the date according to the convention.
    ///
    /// Business days are returned as is.
    ///
    /// # Errors
    /// * [`CalendarError::OutOfRange`]: When the date or the adjusted date is outside of the supported range
    pub fn adjust<C>(&self, d: NaiveDate, cal: &C) -> Result<NaiveDate, CalendarError>
    where
        C: HolidayCalendar + ?Sized,
    {
        if cal.is_bizday(d)? {
            return Ok(d);
        }
        match self {
            BizdayAdj::Following => cal.next_bizday(d),
            BizdayAdj::ModifiedFollowing => {
                let nxt = cal.next_bizday(d)?;
                if nxt.month() == d.month() {
                    Ok(nxt)
                } else {
                    cal.prev_bizday(d)
                }
            }
            BizdayAdj::Preceding => cal.prev_bizday(d),
            BizdayAdj::ModifiedPreceding => {
                let prev = cal.prev_bizday(d)?;
                if prev.month() == d.month() {
                    Ok(prev)
                } else {
                    cal.next_bizday(d)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;
    use rstest::rstest;

    use super::*;
    use crate::calendar::{BaseCalendar, Calendar, CalendarData};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cal() -> Calendar {
        let data = CalendarData::new(
            [Weekday::Sat, Weekday::Sun],
            [ymd(2024, 1, 1), ymd(2024, 5, 31)],
            ymd(2023, 1, 1),
            ymd(2024, 12, 31),
        )
        .unwrap();
        BaseCalendar::new("X", data).unwrap().into()
    }

    #[rstest]
    #[case(BizdayAdj::Following, ymd(2024, 1, 3), ymd(2024, 1, 3))]
    #[case(BizdayAdj::Following, ymd(2024, 1, 1), ymd(2024, 1, 2))]
    #[case(BizdayAdj::Following, ymd(2024, 3, 30), ymd(2024, 4, 1))]
    #[case(BizdayAdj::ModifiedFollowing, ymd(2024, 1, 1), ymd(2024, 1, 2))]
    #[case(BizdayAdj::ModifiedFollowing, ymd(2024, 3, 30), ymd(2024, 3, 29))]
    #[case(BizdayAdj::ModifiedFollowing, ymd(2024, 5, 31), ymd(2024, 5, 30))]
    #[case(BizdayAdj::Preceding, ymd(2024, 1, 1), ymd(2023, 12, 29))]
    #[case(BizdayAdj::Preceding, ymd(2024, 6, 2), ymd(2024, 5, 30))]
    #[case(BizdayAdj::ModifiedPreceding, ymd(2024, 1, 1), ymd(2024, 1, 2))]
    #[case(BizdayAdj::ModifiedPreceding, ymd(2024, 6, 1), ymd(2024, 6, 3))]
    #[case(BizdayAdj::ModifiedPreceding, ymd(2024, 6, 9), ymd(2024, 6, 7))]
    fn test_adjust(#[case] adj: BizdayAdj, #[case] d: NaiveDate, #[case] expected: NaiveDate) {
        assert_eq!(adj.adjust(d, &cal()), Ok(expected));
    }

    #[rstest]
    #[case(BizdayAdj::Following)]
    #[case(BizdayAdj::ModifiedFollowing)]
    #[case(BizdayAdj::Preceding)]
    #[case(BizdayAdj::ModifiedPreceding)]
    fn test_adjust_out_of_range(#[case] adj: BizdayAdj) {
        let res = adj.adjust(ymd(2025, 1, 1), &cal());

        assert!(res.unwrap_err().is_out_of_range());
    }

    #[rstest]
    #[case(BizdayAdj::Following, "\"following\"", "Following")]
    #[case(BizdayAdj::ModifiedFollowing, "\"modified_following\"", "ModifiedFollowing")]
    #[case(BizdayAdj::Preceding, "\"preceding\"", "Preceding")]
    #[case(BizdayAdj::ModifiedPreceding, "\"modified_preceding\"", "ModifiedPreceding")]
    fn test_serde(#[case] adj: BizdayAdj, #[case] json: &str, #[case] display: &str) {
        assert_eq!(serde_json::to_string(&adj).unwrap(), json);
        assert_eq!(serde_json::from_str::<BizdayAdj>(json).unwrap(), adj);
        assert_eq!(adj.to_string(), display);
    }
}
