use std::{
    hash::{Hash, Hasher},
    ops::RangeInclusive,
    sync::Arc,
};

use chrono::NaiveDate;
use itertools::Itertools;

use super::{Calendar, CalendarError, HolidayCalendar};

// -----------------------------------------------------------------------------
// CombinedCalendar
// -----------------------------------------------------------------------------
#[derive(Debug)]
struct _CombinedCalendar {
    name: String,
    leaves: Vec<Calendar>,
    valid_from: NaiveDate,
    valid_to: NaiveDate,
}

/// Calendar where a date is a holiday if it is a holiday in any of the leaves.
///
/// Leaves are flat, i.e. no leaf is a [`CombinedCalendar`] itself, unique by name and
/// sorted by name. The name is the names of the leaves joined with `+`.
///
/// The supported range is the intersection of the supported ranges of the leaves.
/// Dates are checked against it before any leaf is consulted.
///
/// Use [`Calendar::combine`] or [`Calendar::combined_of`] to create one.
#[derive(Debug, Clone)]
pub struct CombinedCalendar(Arc<_CombinedCalendar>);

//
// ctor
//
impl CombinedCalendar {
    /// `leaves` must be flat, unique by name, sorted by name and contain two or more calendars.
    pub(crate) fn new(leaves: Vec<Calendar>) -> Self {
        debug_assert!(leaves.len() > 1);
        debug_assert!(leaves.iter().tuple_windows().all(|(a, b)| a.name() < b.name()));

        let name = leaves.iter().map(Calendar::name).join("+");
        let valid_from = leaves
            .iter()
            .map(|c| *c.supported_range().start())
            .max()
            .unwrap_or(NaiveDate::MIN);
        let valid_to = leaves
            .iter()
            .map(|c| *c.supported_range().end())
            .min()
            .unwrap_or(NaiveDate::MAX);
        if valid_to < valid_from {
            log::warn!("Combined calendar {name} supports no date: [{valid_from}, {valid_to}]");
        }
        log::trace!("Combined calendar {name} is created");

        Self(Arc::new(_CombinedCalendar {
            name,
            leaves,
            valid_from,
            valid_to,
        }))
    }
}

//
// methods
//
impl CombinedCalendar {
    /// Calendars combined into this one, sorted by name.
    #[inline]
    pub fn leaves(&self) -> &[Calendar] {
        &self.0.leaves
    }
}

impl PartialEq for CombinedCalendar {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0.name == other.0.name
    }
}

impl Eq for CombinedCalendar {}

impl Hash for CombinedCalendar {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
    }
}

impl HolidayCalendar for CombinedCalendar {
    #[inline]
    fn name(&self) -> &str {
        &self.0.name
    }

    fn is_holiday(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        if date < self.0.valid_from || self.0.valid_to < date {
            return Err(CalendarError::out_of_range(date, &self.supported_range()));
        }
        for leaf in &self.0.leaves {
            if leaf.is_holiday(date)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    #[inline]
    fn supported_range(&self) -> RangeInclusive<NaiveDate> {
        self.0.valid_from..=self.0.valid_to
    }
}
