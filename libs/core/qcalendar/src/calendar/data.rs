use std::{ops::RangeInclusive, sync::Arc};

use anyhow::ensure;
use chrono::{Datelike, NaiveDate, Weekday};

use super::{CalendarError, DateRange};

// -----------------------------------------------------------------------------
// _CalendarData
// -----------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct _CalendarData {
    /// Weekdays treated as holidays. Typically, Saturday and Sunday.
    /// Sorted from Monday.
    weekend_days: Vec<Weekday>,

    /// Explicit holidays. Sorted, unique and within the supported range.
    holidays: Vec<NaiveDate>,

    /// The supported range of the calendar. include `valid_from`.
    valid_from: NaiveDate,

    /// The supported range of the calendar. include `valid_to`.
    valid_to: NaiveDate,
}

// -----------------------------------------------------------------------------
// CalendarData
// -----------------------------------------------------------------------------
/// Immutable holiday data backing a [`BaseCalendar`](super::BaseCalendar).
///
/// The data consists of
/// - weekend days: weekdays which are always holidays
/// - holidays: explicit holiday dates
/// - supported range: inclusive bounds where the data is authoritative
///
/// The internal data is wrapped by [`Arc`], so clones are cheap and share the same storage.
///
/// ```
/// use chrono::{NaiveDate, Weekday};
/// use qcalendar::calendar::CalendarData;
///
/// let ymd = |y: i32, m: u32, d: u32| {
///     NaiveDate::from_ymd_opt(y, m, d).unwrap()
/// };
///
/// let data = CalendarData::builder()
///     .with_weekend_days([Weekday::Sat, Weekday::Sun])
///     .with_holidays([ymd(2024, 1, 1)])
///     .with_supported_range(ymd(2024, 1, 1), ymd(2024, 12, 31))
///     .build()
///     .unwrap();
///
/// assert!(data.is_holiday(ymd(2024, 1, 1)).unwrap());  // explicit
/// assert!(data.is_holiday(ymd(2024, 1, 6)).unwrap());  // Saturday
/// assert!(!data.is_holiday(ymd(2024, 1, 2)).unwrap()); // Tuesday
/// assert!(data.is_holiday(ymd(2025, 1, 1)).is_err());  // out of range
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CalendarData(Arc<_CalendarData>);

//
// construction
//
impl CalendarData {
    /// Create calendar data.
    ///
    /// Holidays are sorted and de-duplicated. Holidays outside of the supported range are dropped.
    ///
    /// # Errors
    /// - If `valid_from` is after `valid_to`
    pub fn new(
        weekend_days: impl IntoIterator<Item = Weekday>,
        holidays: impl IntoIterator<Item = NaiveDate>,
        valid_from: NaiveDate,
        valid_to: NaiveDate,
    ) -> anyhow::Result<Self> {
        ensure!(
            valid_from <= valid_to,
            "valid_from must be less than or equal to valid_to: valid_from={valid_from}, valid_to={valid_to}",
        );

        let mut weekend_days: Vec<_> = weekend_days.into_iter().collect();
        weekend_days.sort_by_key(|w| w.number_from_monday());
        weekend_days.dedup();

        let mut holidays: Vec<_> = holidays.into_iter().collect();
        holidays.sort();
        holidays.dedup();
        let given = holidays.len();
        holidays.retain(|d| &valid_from <= d && d <= &valid_to);
        if holidays.len() < given {
            log::warn!(
                "{} holidays outside of [{valid_from}, {valid_to}] are dropped",
                given - holidays.len()
            );
        }

        Ok(Self(Arc::new(_CalendarData {
            weekend_days,
            holidays,
            valid_from,
            valid_to,
        })))
    }

    /// Data without explicit holidays, supporting every representable date.
    ///
    /// ```
    /// use chrono::{NaiveDate, Weekday};
    /// use qcalendar::calendar::CalendarData;
    ///
    /// let data = CalendarData::blank([Weekday::Fri, Weekday::Sat]);
    /// let ymd = |y: i32, m: u32, d: u32| NaiveDate::from_ymd_opt(y, m, d).unwrap();
    ///
    /// assert!(data.is_holiday(ymd(2021, 1, 1)).unwrap());  // Fri
    /// assert!(data.is_holiday(ymd(2021, 1, 2)).unwrap());  // Sat
    /// assert!(!data.is_holiday(ymd(2021, 1, 3)).unwrap()); // Sun
    /// ```
    #[inline]
    pub fn blank(weekend_days: impl IntoIterator<Item = Weekday>) -> Self {
        Self::new(weekend_days, [], NaiveDate::MIN, NaiveDate::MAX)
            .expect("MIN <= MAX always holds")
    }

    /// Get [CalendarDataBuilder] instance.
    #[inline]
    pub fn builder() -> CalendarDataBuilder {
        CalendarDataBuilder::new()
    }
}

//
// methods
//
impl CalendarData {
    /// Weekdays treated as holidays, ordered from Monday.
    #[inline]
    pub fn weekend_days(&self) -> &[Weekday] {
        &self.0.weekend_days
    }

    /// Explicit holidays in ascending order.
    #[inline]
    pub fn holidays(&self) -> &[NaiveDate] {
        &self.0.holidays
    }

    /// Inclusive bounds where the data is authoritative.
    #[inline]
    pub fn supported_range(&self) -> RangeInclusive<NaiveDate> {
        self.0.valid_from..=self.0.valid_to
    }

    #[inline]
    pub fn is_weekend(&self, weekday: Weekday) -> bool {
        self.0.weekend_days.contains(&weekday)
    }

    /// Whether every weekday is a weekend day, i.e. no date is a business day.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.0.weekend_days.len() == 7
    }

    #[inline]
    pub(crate) fn validate(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        if self.0.valid_from <= date && date <= self.0.valid_to {
            Ok(date)
        } else {
            Err(CalendarError::out_of_range(date, &self.supported_range()))
        }
    }

    /// Check if the given date is a weekend day or an explicit holiday.
    ///
    /// # Errors
    /// * [`CalendarError::OutOfRange`]: When the date is outside of the supported range
    #[inline]
    pub fn is_holiday(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        let date = self.validate(date)?;
        Ok(self.is_weekend(date.weekday()) || self.0.holidays.binary_search(&date).is_ok())
    }

    /// Count business days in the range without enumerating each date.
    ///
    /// Weekend days are counted per whole week plus the remainder,
    /// and explicit holidays are located by binary search.
    pub(crate) fn num_bizdays(&self, range: &DateRange) -> Result<usize, CalendarError> {
        let (Some(first), Some(last)) = (range.first(), range.last()) else {
            return Ok(0);
        };
        self.validate(first)?;
        self.validate(last)?;

        let total = range.len();
        let weekends = {
            let full_weeks = total / 7 * self.0.weekend_days.len();
            let mut wd = first.weekday();
            let mut rem = 0;
            for _ in 0..total % 7 {
                if self.is_weekend(wd) {
                    rem += 1;
                }
                wd = wd.succ();
            }
            full_weeks + rem
        };
        let explicit = {
            let stt = self.0.holidays.partition_point(|d| *d < first);
            let end = self.0.holidays.partition_point(|d| *d <= last);
            self.0.holidays[stt..end]
                .iter()
                .filter(|d| !self.is_weekend(d.weekday()))
                .count()
        };
        Ok(total - weekends - explicit)
    }
}

// -----------------------------------------------------------------------------
// CalendarDataBuilder
// -----------------------------------------------------------------------------
/// Builder of [`CalendarData`]
///
/// This builder has type parameters for each data.
/// These are used to control builder methods and prevent multiple calls of the same method.
/// [`CalendarDataBuilder::build`] is available only after all of them are set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CalendarDataBuilder<W = (), H = (), V = ()> {
    weekend_days: W,
    holidays: H,
    valid_from: V,
    valid_to: V,
}

//
// construction
//
impl Default for CalendarDataBuilder {
    #[inline]
    fn default() -> Self {
        Self {
            weekend_days: (),
            holidays: (),
            valid_from: (),
            valid_to: (),
        }
    }
}

impl CalendarDataBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<H, V> CalendarDataBuilder<(), H, V> {
    /// Set the weekdays which are always holidays.
    pub fn with_weekend_days(
        self,
        weekend_days: impl IntoIterator<Item = Weekday>,
    ) -> CalendarDataBuilder<Vec<Weekday>, H, V> {
        CalendarDataBuilder {
            weekend_days: weekend_days.into_iter().collect(),
            holidays: self.holidays,
            valid_from: self.valid_from,
            valid_to: self.valid_to,
        }
    }
}

impl<W, V> CalendarDataBuilder<W, (), V> {
    /// Set the explicit holidays.
    pub fn with_holidays(
        self,
        holidays: impl IntoIterator<Item = NaiveDate>,
    ) -> CalendarDataBuilder<W, Vec<NaiveDate>, V> {
        CalendarDataBuilder {
            weekend_days: self.weekend_days,
            holidays: holidays.into_iter().collect(),
            valid_from: self.valid_from,
            valid_to: self.valid_to,
        }
    }
}

impl<W, H> CalendarDataBuilder<W, H, ()> {
    /// Set the supported range. Both ends are inclusive and `from <= to` must hold.
    pub fn with_supported_range(
        self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> CalendarDataBuilder<W, H, NaiveDate> {
        CalendarDataBuilder {
            weekend_days: self.weekend_days,
            holidays: self.holidays,
            valid_from: from,
            valid_to: to,
        }
    }
}

impl CalendarDataBuilder<Vec<Weekday>, Vec<NaiveDate>, NaiveDate> {
    /// Build calendar data.
    ///
    /// # Errors
    /// - If the supported range is reversed
    pub fn build(self) -> anyhow::Result<CalendarData> {
        CalendarData::new(
            self.weekend_days,
            self.holidays,
            self.valid_from,
            self.valid_to,
        )
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sat_sun() -> [Weekday; 2] {
        [Weekday::Sat, Weekday::Sun]
    }

    #[test]
    fn test_new_ok() {
        let data = CalendarData::new(sat_sun(), [ymd(2021, 1, 1)], ymd(2021, 1, 1), ymd(2021, 1, 10));

        assert!(data.is_ok());
    }

    #[test]
    fn test_new_ok_single_day() {
        let data = CalendarData::new(sat_sun(), [], ymd(2021, 1, 1), ymd(2021, 1, 1));

        assert!(data.is_ok());
    }

    #[test]
    fn test_new_ng_unsorted_range() {
        let data = CalendarData::new(sat_sun(), [], ymd(2021, 1, 10), ymd(2021, 1, 1));

        assert!(data.is_err());
    }

    #[test]
    fn test_new_normalizes() {
        let data = CalendarData::new(
            [Weekday::Sun, Weekday::Sat, Weekday::Sun],
            [
                ymd(2021, 1, 5),
                ymd(2021, 1, 1),
                ymd(2021, 1, 5),
                ymd(2020, 12, 31),
                ymd(2021, 1, 11),
            ],
            ymd(2021, 1, 1),
            ymd(2021, 1, 10),
        )
        .unwrap();

        assert_eq!(data.weekend_days(), &[Weekday::Sat, Weekday::Sun]);
        assert_eq!(data.holidays(), &[ymd(2021, 1, 1), ymd(2021, 1, 5)]);
        assert_eq!(data.supported_range(), ymd(2021, 1, 1)..=ymd(2021, 1, 10));
    }

    #[test]
    fn test_builder() {
        let data = CalendarData::builder()
            .with_supported_range(ymd(2021, 1, 1), ymd(2021, 1, 10))
            .with_holidays([ymd(2021, 1, 1)])
            .with_weekend_days(sat_sun())
            .build()
            .unwrap();

        assert_eq!(
            data,
            CalendarData::new(sat_sun(), [ymd(2021, 1, 1)], ymd(2021, 1, 1), ymd(2021, 1, 10))
                .unwrap()
        );
    }

    #[test]
    fn test_validate() {
        let data = CalendarData::new(sat_sun(), [], ymd(2021, 1, 1), ymd(2021, 1, 10)).unwrap();

        assert!(data.validate(ymd(2020, 12, 31)).is_err());
        assert!(data.validate(ymd(2021, 1, 1)).is_ok());
        assert!(data.validate(ymd(2021, 1, 10)).is_ok());
        assert!(data.validate(ymd(2021, 1, 11)).is_err());
    }

    #[test]
    fn test_is_holiday() {
        let data = CalendarData::new(
            sat_sun(),
            [ymd(2021, 1, 1), ymd(2021, 1, 2)],
            ymd(2021, 1, 1),
            ymd(2021, 1, 10),
        )
        .unwrap();

        assert!(data.is_holiday(ymd(2020, 12, 31)).is_err());
        assert!(data.is_holiday(ymd(2021, 1, 1)).unwrap()); // explicit
        assert!(data.is_holiday(ymd(2021, 1, 2)).unwrap()); // explicit and Saturday
        assert!(data.is_holiday(ymd(2021, 1, 3)).unwrap()); // Sunday
        assert!(!data.is_holiday(ymd(2021, 1, 4)).unwrap());
        assert!(!data.is_holiday(ymd(2021, 1, 8)).unwrap());
        assert!(data.is_holiday(ymd(2021, 1, 9)).unwrap());
        assert!(data.is_holiday(ymd(2021, 1, 10)).unwrap());
        assert!(data.is_holiday(ymd(2021, 1, 11)).is_err());
    }

    #[test]
    fn test_is_closed() {
        let all = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ];

        assert!(CalendarData::blank(all).is_closed());
        assert!(CalendarData::blank(all.into_iter().chain(all)).is_closed());
        assert!(!CalendarData::blank(all.into_iter().skip(1)).is_closed());
        assert!(!CalendarData::blank(sat_sun()).is_closed());
    }

    #[test]
    fn test_is_holiday_no_weekend() {
        let data = CalendarData::new([], [ymd(2021, 1, 2)], ymd(2021, 1, 1), ymd(2021, 1, 10)).unwrap();

        assert!(!data.is_holiday(ymd(2021, 1, 1)).unwrap());
        assert!(data.is_holiday(ymd(2021, 1, 2)).unwrap());
        assert!(!data.is_holiday(ymd(2021, 1, 3)).unwrap());
    }

    #[rstest]
    fn test_num_bizdays(
        #[values(vec![], vec![Weekday::Sat, Weekday::Sun], vec![Weekday::Fri, Weekday::Sat], vec![Weekday::Mon])]
        weekend: Vec<Weekday>,
        #[values(
            ymd(2021, 1, 1),
            ymd(2021, 1, 2),
            ymd(2021, 1, 5),
            ymd(2021, 1, 13),
            ymd(2021, 2, 28)
        )]
        stt: NaiveDate,
        #[values(ymd(2021, 1, 1), ymd(2021, 1, 9), ymd(2021, 1, 31), ymd(2021, 3, 31))]
        end: NaiveDate,
    ) {
        let data = CalendarData::new(
            weekend,
            [ymd(2021, 1, 1), ymd(2021, 1, 2), ymd(2021, 1, 13), ymd(2021, 2, 11)],
            ymd(2021, 1, 1),
            ymd(2021, 12, 31),
        )
        .unwrap();
        let Ok(range) = DateRange::new(stt, end) else {
            return;
        };

        let expected = range
            .iter()
            .filter(|d| !data.is_holiday(*d).unwrap())
            .count();

        assert_eq!(data.num_bizdays(&range), Ok(expected));
    }

    #[test]
    fn test_num_bizdays_out_of_range() {
        let data = CalendarData::new(sat_sun(), [], ymd(2021, 1, 1), ymd(2021, 1, 10)).unwrap();

        let range = DateRange::new(ymd(2020, 12, 30), ymd(2021, 1, 5)).unwrap();
        assert!(data.num_bizdays(&range).unwrap_err().is_out_of_range());

        let range = DateRange::new(ymd(2021, 1, 5), ymd(2021, 1, 12)).unwrap();
        assert!(data.num_bizdays(&range).unwrap_err().is_out_of_range());

        // end is exclusive
        let range = DateRange::new(ymd(2021, 1, 5), ymd(2021, 1, 11)).unwrap();
        assert_eq!(data.num_bizdays(&range), Ok(4));

        // empty range is never classified
        let range = DateRange::new(ymd(1999, 1, 1), ymd(1999, 1, 1)).unwrap();
        assert_eq!(data.num_bizdays(&range), Ok(0));
    }
}
