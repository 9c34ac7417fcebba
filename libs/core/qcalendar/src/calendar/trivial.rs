use chrono::NaiveDate;

use super::{
    traits::{no_bizday_after, no_bizday_before},
    CalendarError, DateRange, HolidayCalendar,
};

// -----------------------------------------------------------------------------
// NoHolidays
// -----------------------------------------------------------------------------
/// Calendar where every date is a business day.
///
/// This is the identity of calendar combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NoHolidays;

impl NoHolidays {
    pub const NAME: &'static str = "NoHolidays";
}

impl HolidayCalendar for NoHolidays {
    #[inline]
    fn name(&self) -> &str {
        Self::NAME
    }

    #[inline]
    fn is_holiday(&self, _: NaiveDate) -> Result<bool, CalendarError> {
        Ok(false)
    }

    #[inline]
    fn next_bizday(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        date.succ_opt()
            .ok_or_else(|| CalendarError::out_of_range(date, &self.supported_range()))
    }

    #[inline]
    fn prev_bizday(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        date.pred_opt()
            .ok_or_else(|| CalendarError::out_of_range(date, &self.supported_range()))
    }

    #[inline]
    fn num_bizdays(&self, range: &DateRange) -> Result<usize, CalendarError> {
        Ok(range.len())
    }
}

// -----------------------------------------------------------------------------
// AllHolidays
// -----------------------------------------------------------------------------
/// Calendar where every date is a holiday.
///
/// Stepping to a business day always fails without scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AllHolidays;

impl AllHolidays {
    pub const NAME: &'static str = "AllHolidays";
}

impl HolidayCalendar for AllHolidays {
    #[inline]
    fn name(&self) -> &str {
        Self::NAME
    }

    #[inline]
    fn is_holiday(&self, _: NaiveDate) -> Result<bool, CalendarError> {
        Ok(true)
    }

    #[inline]
    fn next_bizday(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        Err(no_bizday_after(date, &self.supported_range()))
    }

    #[inline]
    fn prev_bizday(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        Err(no_bizday_before(date, &self.supported_range()))
    }

    #[inline]
    fn num_bizdays(&self, _: &DateRange) -> Result<usize, CalendarError> {
        Ok(0)
    }
}
