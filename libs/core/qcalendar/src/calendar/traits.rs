use std::{
    ops::{RangeBounds, RangeInclusive},
    sync::Arc,
};

use chrono::{Datelike, NaiveDate};

use super::{range::Days, CalendarError, DateRange};

// -----------------------------------------------------------------------------
// HolidayCalendar
// -----------------------------------------------------------------------------
/// Classification of dates into holidays and business days.
///
/// Implementors provide [`HolidayCalendar::name`] and [`HolidayCalendar::is_holiday`].
/// Every other operation is derived from them, so all calendars share the same semantics.
/// Implementations may override derived operations for efficiency,
/// but must return the same results as the derived ones.
///
/// Implementations must be immutable: the same query always gives the same answer.
pub trait HolidayCalendar {
    /// Name which identifies the calendar.
    ///
    /// Two calendars with the same name are the same calendar.
    fn name(&self) -> &str;

    /// Check if the given date is a holiday. Weekends are holidays.
    ///
    /// # Errors
    /// * [`CalendarError::OutOfRange`]: When the date is outside of the supported range
    fn is_holiday(&self, date: NaiveDate) -> Result<bool, CalendarError>;

    /// Inclusive bounds of dates this calendar can classify.
    #[inline]
    fn supported_range(&self) -> RangeInclusive<NaiveDate> {
        NaiveDate::MIN..=NaiveDate::MAX
    }

    /// Check if the given date is a business day. This is the opposite of [`HolidayCalendar::is_holiday`].
    ///
    /// # Errors
    /// * [`CalendarError::OutOfRange`]: When the date is outside of the supported range
    #[inline]
    fn is_bizday(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        self.is_holiday(date).map(|hol| !hol)
    }

    /// The first business day strictly after the given date.
    ///
    /// Dates are scanned one by one up to the end of the supported range.
    ///
    /// # Errors
    /// * [`CalendarError::OutOfRange`]: When no business day is found within the supported range
    fn next_bizday(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        scan_next(self, date)
    }

    /// The last business day strictly before the given date.
    ///
    /// Dates are scanned one by one down to the start of the supported range.
    ///
    /// # Errors
    /// * [`CalendarError::OutOfRange`]: When no business day is found within the supported range
    fn prev_bizday(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        scan_prev(self, date)
    }

    /// The given date if it is a business day, otherwise the next business day.
    #[inline]
    fn next_or_same(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        if self.is_bizday(date)? {
            Ok(date)
        } else {
            self.next_bizday(date)
        }
    }

    /// The given date if it is a business day, otherwise the previous business day.
    #[inline]
    fn prev_or_same(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        if self.is_bizday(date)? {
            Ok(date)
        } else {
            self.prev_bizday(date)
        }
    }

    /// Shift the date by the given number of business days.
    ///
    /// A positive amount applies [`HolidayCalendar::next_bizday`] repeatedly
    /// and a negative one applies [`HolidayCalendar::prev_bizday`].
    /// Zero returns the date as is, even if it is a holiday.
    fn shift(&self, date: NaiveDate, amount: i32) -> Result<NaiveDate, CalendarError> {
        let mut adjusted = date;
        for _ in 0..amount {
            adjusted = self.next_bizday(adjusted)?;
        }
        for _ in amount..0 {
            adjusted = self.prev_bizday(adjusted)?;
        }
        Ok(adjusted)
    }

    /// Reusable adjuster which shifts dates by the given number of business days.
    ///
    /// ```
    /// use chrono::{NaiveDate, Weekday};
    /// use qcalendar::calendar::{BaseCalendar, CalendarData, HolidayCalendar};
    ///
    /// let cal = BaseCalendar::new("SatSun", CalendarData::blank([Weekday::Sat, Weekday::Sun])).unwrap();
    /// let three_days_later = cal.adjust_by(3);
    ///
    /// let fri = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
    /// assert_eq!(three_days_later(fri), Ok(NaiveDate::from_ymd_opt(2021, 1, 6).unwrap()));
    /// ```
    #[inline]
    fn adjust_by(&self, amount: i32) -> impl Fn(NaiveDate) -> Result<NaiveDate, CalendarError> + '_
    where
        Self: Sized,
    {
        move |date| self.shift(date, amount)
    }

    /// Check if the given date is the last business day of its month.
    ///
    /// # Errors
    /// * [`CalendarError::OutOfRange`]: When the date, or the business day after it,
    ///   is outside of the supported range
    #[inline]
    fn is_last_bizday_of_month(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        Ok(self.is_bizday(date)? && {
            let next = self.next_bizday(date)?;
            (next.year(), next.month()) != (date.year(), date.month())
        })
    }

    /// The last business day of the month of the given date.
    #[inline]
    fn last_bizday_of_month(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        self.prev_or_same(last_day_of_month(date))
    }

    /// Count business days in `[start_inclusive, end_exclusive)`.
    ///
    /// # Errors
    /// * [`CalendarError::InvalidRange`]: When the end is before the start
    /// * [`CalendarError::OutOfRange`]: When any date of the range is outside of the supported range
    #[inline]
    fn days_between(
        &self,
        start_inclusive: NaiveDate,
        end_exclusive: NaiveDate,
    ) -> Result<usize, CalendarError> {
        let range = DateRange::new(start_inclusive, end_exclusive)?;
        self.num_bizdays(&range)
    }

    /// Count business days in the given range.
    ///
    /// Every date of the range is classified, so the count fails entirely
    /// if any of them is out of the supported range.
    fn num_bizdays(&self, range: &DateRange) -> Result<usize, CalendarError> {
        range
            .iter()
            .try_fold(0, |n, d| Ok(n + usize::from(self.is_bizday(d)?)))
    }

    /// Count business days in any bounded range, e.g. `a..b` or `a..=b`.
    ///
    /// # Errors
    /// * [`CalendarError::Unbounded`]: When the range is unbounded
    /// * [`CalendarError::InvalidRange`]: When the range is reversed
    /// * [`CalendarError::OutOfRange`]: When any date of the range is outside of the supported range
    #[inline]
    fn num_bizdays_in<R>(&self, range: R) -> Result<usize, CalendarError>
    where
        Self: Sized,
        R: RangeBounds<NaiveDate>,
    {
        let range = DateRange::from_bounds_for(range, "counting business days")?;
        self.num_bizdays(&range)
    }

    /// Iterator over the business days in the given range.
    ///
    /// A date which can not be classified is yielded as an error.
    #[inline]
    fn iter_bizdays(
        &self,
        range: DateRange,
    ) -> impl DoubleEndedIterator<Item = Result<NaiveDate, CalendarError>> + '_
    where
        Self: Sized,
    {
        range
            .into_iter()
            .filter_map(move |d| self.is_bizday(d).map(|b| b.then_some(d)).transpose())
    }

    /// Iterator over the holidays in the given range.
    ///
    /// A date which can not be classified is yielded as an error.
    #[inline]
    fn iter_holidays(
        &self,
        range: DateRange,
    ) -> impl DoubleEndedIterator<Item = Result<NaiveDate, CalendarError>> + '_
    where
        Self: Sized,
    {
        range
            .into_iter()
            .filter_map(move |d| self.is_holiday(d).map(|b| b.then_some(d)).transpose())
    }
}

/// Forward scan behind [`HolidayCalendar::next_bizday`].
pub(crate) fn scan_next<C>(cal: &C, date: NaiveDate) -> Result<NaiveDate, CalendarError>
where
    C: HolidayCalendar + ?Sized,
{
    let range = cal.supported_range();
    let from = date
        .succ_opt()
        .ok_or_else(|| CalendarError::out_of_range(date, &range))?;
    for d in Days::inclusive(from, *range.end()) {
        if cal.is_bizday(d)? {
            return Ok(d);
        }
    }
    Err(no_bizday_after(date, &range))
}

/// Backward scan behind [`HolidayCalendar::prev_bizday`].
pub(crate) fn scan_prev<C>(cal: &C, date: NaiveDate) -> Result<NaiveDate, CalendarError>
where
    C: HolidayCalendar + ?Sized,
{
    let range = cal.supported_range();
    let from = date
        .pred_opt()
        .ok_or_else(|| CalendarError::out_of_range(date, &range))?;
    for d in Days::inclusive(*range.start(), from).rev() {
        if cal.is_bizday(d)? {
            return Ok(d);
        }
    }
    Err(no_bizday_before(date, &range))
}

/// Error of a forward scan from `date` which finds no business day,
/// i.e. the first date the scan can not classify.
pub(crate) fn no_bizday_after(date: NaiveDate, range: &RangeInclusive<NaiveDate>) -> CalendarError {
    let Some(from) = date.succ_opt() else {
        return CalendarError::out_of_range(date, range);
    };
    if from < *range.start() {
        return CalendarError::out_of_range(from, range);
    }
    let beyond = range.end().succ_opt().map_or(from, |d| d.max(from));
    CalendarError::out_of_range(beyond, range)
}

/// Error of a backward scan from `date` which finds no business day,
/// i.e. the first date the scan can not classify.
pub(crate) fn no_bizday_before(date: NaiveDate, range: &RangeInclusive<NaiveDate>) -> CalendarError {
    let Some(from) = date.pred_opt() else {
        return CalendarError::out_of_range(date, range);
    };
    if *range.end() < from {
        return CalendarError::out_of_range(from, range);
    }
    let beyond = range.start().pred_opt().map_or(from, |d| d.min(from));
    CalendarError::out_of_range(beyond, range)
}

#[inline]
fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let last = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year(), 12, 31)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1).and_then(|d| d.pred_opt())
    };
    last.unwrap_or(date)
}

impl<C: HolidayCalendar + ?Sized> HolidayCalendar for Box<C> {
    #[inline]
    fn name(&self) -> &str {
        self.as_ref().name()
    }
    #[inline]
    fn is_holiday(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        self.as_ref().is_holiday(date)
    }
    #[inline]
    fn supported_range(&self) -> RangeInclusive<NaiveDate> {
        self.as_ref().supported_range()
    }
    #[inline]
    fn next_bizday(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        self.as_ref().next_bizday(date)
    }
    #[inline]
    fn prev_bizday(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        self.as_ref().prev_bizday(date)
    }
    #[inline]
    fn num_bizdays(&self, range: &DateRange) -> Result<usize, CalendarError> {
        self.as_ref().num_bizdays(range)
    }
}

impl<C: HolidayCalendar + ?Sized> HolidayCalendar for Arc<C> {
    #[inline]
    fn name(&self) -> &str {
        self.as_ref().name()
    }
    #[inline]
    fn is_holiday(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        self.as_ref().is_holiday(date)
    }
    #[inline]
    fn supported_range(&self) -> RangeInclusive<NaiveDate> {
        self.as_ref().supported_range()
    }
    #[inline]
    fn next_bizday(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        self.as_ref().next_bizday(date)
    }
    #[inline]
    fn prev_bizday(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        self.as_ref().prev_bizday(date)
    }
    #[inline]
    fn num_bizdays(&self, range: &DateRange) -> Result<usize, CalendarError> {
        self.as_ref().num_bizdays(range)
    }
}
