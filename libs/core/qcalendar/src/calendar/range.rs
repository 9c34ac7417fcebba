use std::ops::{Bound, RangeBounds};

use chrono::NaiveDate;

use super::CalendarError;

// -----------------------------------------------------------------------------
// DateRange
// -----------------------------------------------------------------------------
/// Half-open range of dates, `[start, end)`.
///
/// The range is a plain value: iterating it does not consume it,
/// so the same range can be enumerated any number of times.
///
/// ```
/// use chrono::NaiveDate;
/// use qcalendar::calendar::DateRange;
///
/// let ymd = |y: i32, m: u32, d: u32| {
///     NaiveDate::from_ymd_opt(y, m, d).unwrap()
/// };
///
/// let range = DateRange::new(ymd(2021, 1, 30), ymd(2021, 2, 2)).unwrap();
/// assert_eq!(range.len(), 3);
/// assert_eq!(
///     range.iter().collect::<Vec<_>>(),
///     vec![ymd(2021, 1, 30), ymd(2021, 1, 31), ymd(2021, 2, 1)]
/// );
///
/// // end before start is rejected
/// assert!(DateRange::new(ymd(2021, 2, 2), ymd(2021, 1, 30)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

//
// construction
//
impl DateRange {
    /// Create a range from an inclusive start and an exclusive end.
    ///
    /// # Errors
    /// * [`CalendarError::InvalidRange`]: When `end` is before `start`
    #[inline]
    pub fn new(start_inclusive: NaiveDate, end_exclusive: NaiveDate) -> Result<Self, CalendarError> {
        if end_exclusive < start_inclusive {
            return Err(CalendarError::InvalidRange {
                start: start_inclusive,
                end: end_exclusive,
            });
        }
        Ok(Self {
            start: start_inclusive,
            end: end_exclusive,
        })
    }

    /// Create a range from any bounded [`RangeBounds`], e.g. `a..b` or `a..=b`.
    ///
    /// # Errors
    /// * [`CalendarError::Unbounded`]: When either side is unbounded
    /// * [`CalendarError::InvalidRange`]: When the bounds are reversed
    ///   or can not be expressed as a half-open range of representable dates
    #[inline]
    pub fn from_bounds<R: RangeBounds<NaiveDate>>(range: R) -> Result<Self, CalendarError> {
        Self::from_bounds_for(range, "DateRange")
    }

    pub(crate) fn from_bounds_for<R: RangeBounds<NaiveDate>>(
        range: R,
        operation: &'static str,
    ) -> Result<Self, CalendarError> {
        let (Bound::Included(&s) | Bound::Excluded(&s)) = range.start_bound() else {
            return Err(CalendarError::Unbounded { operation });
        };
        let (Bound::Included(&e) | Bound::Excluded(&e)) = range.end_bound() else {
            return Err(CalendarError::Unbounded { operation });
        };
        let unrepresentable = || CalendarError::InvalidRange { start: s, end: e };

        // adjust range to half-open interval
        let start = match range.start_bound() {
            Bound::Excluded(_) => s.succ_opt().ok_or_else(unrepresentable)?,
            _ => s,
        };
        let end = match range.end_bound() {
            Bound::Included(_) => e.succ_opt().ok_or_else(unrepresentable)?,
            _ => e,
        };
        Self::new(start, end)
    }
}

//
// methods
//
impl DateRange {
    /// The first date of the range, inclusive.
    #[inline]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// The end of the range, exclusive.
    #[inline]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of dates in the range.
    #[inline]
    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn contains(&self, date: &NaiveDate) -> bool {
        &self.start <= date && date < &self.end
    }

    /// The first date in the range, or [None] when the range is empty.
    #[inline]
    pub fn first(&self) -> Option<NaiveDate> {
        self.iter().next()
    }

    /// The last date in the range, or [None] when the range is empty.
    #[inline]
    pub fn last(&self) -> Option<NaiveDate> {
        self.iter().next_back()
    }

    /// Lazy iterator over the dates of the range.
    #[inline]
    pub fn iter(&self) -> Days {
        match self.end.pred_opt() {
            Some(back) if !self.is_empty() => Days::inclusive(self.start, back),
            _ => Days::empty(),
        }
    }
}

impl IntoIterator for DateRange {
    type Item = NaiveDate;
    type IntoIter = Days;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &DateRange {
    type Item = NaiveDate;
    type IntoIter = Days;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// -----------------------------------------------------------------------------
// Days
// -----------------------------------------------------------------------------
/// Iterator over consecutive dates between two inclusive ends.
#[derive(Debug, Clone)]
pub struct Days {
    front: NaiveDate,
    back: NaiveDate,
    exhausted: bool,
}

impl Days {
    #[inline]
    pub(crate) fn inclusive(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            front: from,
            back: to,
            exhausted: to < from,
        }
    }

    #[inline]
    fn empty() -> Self {
        Self {
            front: NaiveDate::MIN,
            back: NaiveDate::MIN,
            exhausted: true,
        }
    }
}

impl Iterator for Days {
    type Item = NaiveDate;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let ret = self.front;
        if self.front == self.back {
            self.exhausted = true;
        } else {
            self.front = self.front.succ_opt()?;
        }
        Some(ret)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = if self.exhausted {
            0
        } else {
            (self.back - self.front).num_days() as usize + 1
        };
        (n, Some(n))
    }
}

impl DoubleEndedIterator for Days {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let ret = self.back;
        if self.front == self.back {
            self.exhausted = true;
        } else {
            self.back = self.back.pred_opt()?;
        }
        Some(ret)
    }
}

impl ExactSizeIterator for Days {}

impl std::iter::FusedIterator for Days {}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new() {
        assert!(DateRange::new(ymd(2021, 1, 1), ymd(2021, 1, 1)).is_ok());
        assert!(DateRange::new(ymd(2021, 1, 1), ymd(2021, 1, 2)).is_ok());
        assert_eq!(
            DateRange::new(ymd(2021, 1, 2), ymd(2021, 1, 1)),
            Err(CalendarError::InvalidRange {
                start: ymd(2021, 1, 2),
                end: ymd(2021, 1, 1)
            })
        );
    }

    #[test]
    fn test_iter() {
        let range = DateRange::new(ymd(2020, 12, 30), ymd(2021, 1, 2)).unwrap();

        let dates = range.iter().collect::<Vec<_>>();
        assert_eq!(dates, vec![ymd(2020, 12, 30), ymd(2020, 12, 31), ymd(2021, 1, 1)]);

        // restartable
        assert_eq!(range.into_iter().count(), 3);
        assert_eq!((&range).into_iter().count(), 3);
        assert_eq!(range.iter().len(), 3);
    }

    #[test]
    fn test_iter_rev() {
        let range = DateRange::new(ymd(2021, 2, 27), ymd(2021, 3, 2)).unwrap();

        let dates = range.iter().rev().collect::<Vec<_>>();
        assert_eq!(dates, vec![ymd(2021, 3, 1), ymd(2021, 2, 28), ymd(2021, 2, 27)]);
    }

    #[test]
    fn test_iter_both_ends() {
        let range = DateRange::new(ymd(2021, 1, 1), ymd(2021, 1, 4)).unwrap();
        let mut iter = range.iter();

        assert_eq!(iter.next(), Some(ymd(2021, 1, 1)));
        assert_eq!(iter.next_back(), Some(ymd(2021, 1, 3)));
        assert_eq!(iter.next(), Some(ymd(2021, 1, 2)));
        assert_eq!(iter.next_back(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_empty() {
        let range = DateRange::new(ymd(2021, 1, 1), ymd(2021, 1, 1)).unwrap();

        assert!(range.is_empty());
        assert_eq!(range.len(), 0);
        assert_eq!(range.first(), None);
        assert_eq!(range.last(), None);
        assert_eq!(range.iter().next(), None);
    }

    #[test]
    fn test_extreme_dates() {
        let range = DateRange::new(NaiveDate::MIN, NaiveDate::MIN.succ_opt().unwrap()).unwrap();
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![NaiveDate::MIN]);

        let range = DateRange::new(NaiveDate::MAX.pred_opt().unwrap(), NaiveDate::MAX).unwrap();
        assert_eq!(
            range.iter().rev().collect::<Vec<_>>(),
            vec![NaiveDate::MAX.pred_opt().unwrap()]
        );
    }

    #[test]
    fn test_contains() {
        let range = DateRange::new(ymd(2021, 1, 1), ymd(2021, 1, 10)).unwrap();

        assert!(!range.contains(&ymd(2020, 12, 31)));
        assert!(range.contains(&ymd(2021, 1, 1)));
        assert!(range.contains(&ymd(2021, 1, 9)));
        assert!(!range.contains(&ymd(2021, 1, 10)));
    }

    #[rstest]
    #[case(ymd(2021, 1, 1)..ymd(2021, 1, 5), Ok((ymd(2021, 1, 1), ymd(2021, 1, 5))))]
    #[case(ymd(2021, 1, 1)..ymd(2021, 1, 1), Ok((ymd(2021, 1, 1), ymd(2021, 1, 1))))]
    #[case(ymd(2021, 1, 5)..ymd(2021, 1, 1), Err(()))]
    fn test_from_bounds_excl(
        #[case] range: std::ops::Range<NaiveDate>,
        #[case] expected: Result<(NaiveDate, NaiveDate), ()>,
    ) {
        let res = DateRange::from_bounds(range).map(|r| (r.start(), r.end()));

        assert_eq!(res.map_err(|_| ()), expected);
    }

    #[rstest]
    #[case(ymd(2021, 1, 1)..=ymd(2021, 1, 5), Ok((ymd(2021, 1, 1), ymd(2021, 1, 6))))]
    #[case(ymd(2021, 1, 1)..=ymd(2021, 1, 1), Ok((ymd(2021, 1, 1), ymd(2021, 1, 2))))]
    #[case(ymd(2021, 1, 5)..=ymd(2021, 1, 3), Err(()))]
    #[case(ymd(2021, 1, 1)..=NaiveDate::MAX, Err(()))]
    fn test_from_bounds_incl(
        #[case] range: std::ops::RangeInclusive<NaiveDate>,
        #[case] expected: Result<(NaiveDate, NaiveDate), ()>,
    ) {
        let res = DateRange::from_bounds(range).map(|r| (r.start(), r.end()));

        assert_eq!(res.map_err(|_| ()), expected);
    }

    #[test]
    fn test_from_bounds_unbounded() {
        let d = ymd(2021, 1, 1);

        for res in [
            DateRange::from_bounds(..),
            DateRange::from_bounds(d..),
            DateRange::from_bounds(..d),
            DateRange::from_bounds(..=d),
        ] {
            assert!(matches!(res, Err(CalendarError::Unbounded { .. })));
        }
    }
}
