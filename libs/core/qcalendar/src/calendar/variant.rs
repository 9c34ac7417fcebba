use std::{
    collections::BTreeMap,
    fmt::Display,
    hash::{Hash, Hasher},
    ops::{BitOr, RangeInclusive},
    sync::Arc,
};

use anyhow::Context;
use chrono::NaiveDate;

use super::{
    AllHolidays, BaseCalendar, CalendarError, CalendarSymAtom, CombinedCalendar, DateRange,
    HolidayCalendar, NoHolidays,
};

// -----------------------------------------------------------------------------
// CustomCalendar
// -----------------------------------------------------------------------------
/// User implementation of [`HolidayCalendar`] shared behind [`Arc`].
#[derive(Clone)]
pub struct CustomCalendar(Arc<dyn HolidayCalendar + Send + Sync>);

impl std::fmt::Debug for CustomCalendar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CustomCalendar").field(&self.0.name()).finish()
    }
}

// -----------------------------------------------------------------------------
// Calendar
// -----------------------------------------------------------------------------
/// Handle of any calendar.
///
/// Clones are cheap and share the underlying data.
/// Equality and hashing are based on [`HolidayCalendar::name`] only,
/// so two calendars are the same iff they have the same name.
///
/// Calendars are combined with [`Calendar::combine`] or the `|` operator.
/// A date is a holiday in the combined calendar if it is a holiday in either of the operands.
///
/// ```
/// use chrono::{NaiveDate, Weekday};
/// use qcalendar::calendar::{BaseCalendar, Calendar, CalendarData, HolidayCalendar};
///
/// let ymd = |y: i32, m: u32, d: u32| NaiveDate::from_ymd_opt(y, m, d).unwrap();
/// let cal = |name: &str, hol: NaiveDate| -> Calendar {
///     let data = CalendarData::new([Weekday::Sat, Weekday::Sun], [hol], ymd(2024, 1, 1), ymd(2024, 12, 31));
///     BaseCalendar::new(name, data.unwrap()).unwrap().into()
/// };
/// let x = cal("X", ymd(2024, 1, 1));
/// let y = cal("Y", ymd(2024, 1, 2));
///
/// assert_eq!(x.is_holiday(ymd(2024, 1, 2)), Ok(false));
///
/// let xy = &y | &x;
/// assert_eq!(xy.name(), "X+Y");
/// assert_eq!(xy.is_holiday(ymd(2024, 1, 2)), Ok(true));
/// assert_eq!(xy.next_or_same(ymd(2024, 1, 1)), Ok(ymd(2024, 1, 3)));
/// ```
#[derive(Debug, Clone)]
pub enum Calendar {
    NoHolidays(NoHolidays),
    AllHolidays(AllHolidays),
    Base(BaseCalendar),
    Combined(CombinedCalendar),
    Custom(CustomCalendar),
}

//
// ctor
//
impl From<NoHolidays> for Calendar {
    #[inline]
    fn from(cal: NoHolidays) -> Self {
        Self::NoHolidays(cal)
    }
}

impl From<AllHolidays> for Calendar {
    #[inline]
    fn from(cal: AllHolidays) -> Self {
        Self::AllHolidays(cal)
    }
}

impl From<BaseCalendar> for Calendar {
    #[inline]
    fn from(cal: BaseCalendar) -> Self {
        Self::Base(cal)
    }
}

impl From<CombinedCalendar> for Calendar {
    #[inline]
    fn from(cal: CombinedCalendar) -> Self {
        Self::Combined(cal)
    }
}

impl Calendar {
    /// Wrap a user implementation of [`HolidayCalendar`].
    ///
    /// # Errors
    /// - If the name of the calendar is not a valid [`CalendarSymAtom`].
    pub fn custom<C>(cal: C) -> anyhow::Result<Self>
    where
        C: HolidayCalendar + Send + Sync + 'static,
    {
        CalendarSymAtom::new(cal.name()).context("Custom calendar must have a single name")?;
        Ok(Self::Custom(CustomCalendar(Arc::new(cal))))
    }

    /// Combine two calendars.
    ///
    /// - If both have the same name, `self` is returned.
    /// - If either is [`NoHolidays`], the other is returned.
    /// - Otherwise, a [`CombinedCalendar`] over the leaves of both is returned.
    pub fn combine(&self, other: &Calendar) -> Calendar {
        match (self, other) {
            _ if self == other => self.clone(),
            (_, Self::NoHolidays(_)) => self.clone(),
            (Self::NoHolidays(_), _) => other.clone(),
            _ => Self::union_of([self.clone(), other.clone()]),
        }
    }

    /// Combine any number of calendars.
    ///
    /// Combined calendars are flattened into their leaves, [`NoHolidays`] is dropped
    /// and leaves with the same name are merged.
    /// Returns [`None`] if no calendar is given.
    ///
    /// ```
    /// use qcalendar::calendar::{AllHolidays, Calendar, HolidayCalendar, NoHolidays};
    ///
    /// assert!(Calendar::combined_of([]).is_none());
    ///
    /// let cal = Calendar::combined_of([Calendar::from(NoHolidays), NoHolidays.into()]).unwrap();
    /// assert_eq!(cal.name(), "NoHolidays");
    ///
    /// let cal = Calendar::combined_of([Calendar::from(NoHolidays), AllHolidays.into()]).unwrap();
    /// assert_eq!(cal.name(), "AllHolidays");
    /// ```
    pub fn combined_of(cals: impl IntoIterator<Item = Calendar>) -> Option<Calendar> {
        let mut cals = cals.into_iter().peekable();
        cals.peek()?;
        Some(Self::union_of(cals))
    }

    fn union_of(cals: impl IntoIterator<Item = Calendar>) -> Calendar {
        let mut leaves = BTreeMap::new();
        for cal in cals {
            match cal {
                Self::NoHolidays(_) => {}
                Self::Combined(c) => {
                    for leaf in c.leaves() {
                        leaves.entry(leaf.name().to_owned()).or_insert_with(|| leaf.clone());
                    }
                }
                leaf => {
                    leaves.entry(leaf.name().to_owned()).or_insert(leaf);
                }
            }
        }
        if 1 < leaves.len() {
            return CombinedCalendar::new(leaves.into_values().collect()).into();
        }
        leaves
            .into_values()
            .next()
            .unwrap_or(Self::NoHolidays(NoHolidays))
    }
}

//
// methods
//
impl Calendar {
    #[inline]
    fn inner(&self) -> &(dyn HolidayCalendar + Send + Sync) {
        match self {
            Self::NoHolidays(c) => c,
            Self::AllHolidays(c) => c,
            Self::Base(c) => c,
            Self::Combined(c) => c,
            Self::Custom(c) => c.0.as_ref(),
        }
    }

    /// Names of the non-combined calendars this calendar consists of.
    pub fn leaf_names(&self) -> Vec<&str> {
        match self {
            Self::Combined(c) => c.leaves().iter().map(Calendar::name).collect(),
            _ => vec![self.name()],
        }
    }
}

impl HolidayCalendar for Calendar {
    #[inline]
    fn name(&self) -> &str {
        self.inner().name()
    }

    #[inline]
    fn is_holiday(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        self.inner().is_holiday(date)
    }

    #[inline]
    fn supported_range(&self) -> RangeInclusive<NaiveDate> {
        self.inner().supported_range()
    }

    #[inline]
    fn next_bizday(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        self.inner().next_bizday(date)
    }

    #[inline]
    fn prev_bizday(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        self.inner().prev_bizday(date)
    }

    #[inline]
    fn num_bizdays(&self, range: &DateRange) -> Result<usize, CalendarError> {
        self.inner().num_bizdays(range)
    }
}

impl PartialEq for Calendar {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Calendar {}

impl Hash for Calendar {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl Display for Calendar {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

//
// operators
//
impl BitOr for Calendar {
    type Output = Calendar;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        self.combine(&rhs)
    }
}

impl BitOr<&Calendar> for &Calendar {
    type Output = Calendar;

    #[inline]
    fn bitor(self, rhs: &Calendar) -> Self::Output {
        self.combine(rhs)
    }
}
