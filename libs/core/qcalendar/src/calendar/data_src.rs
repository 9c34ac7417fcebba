use super::{Calendar, CalendarError, CalendarSym, CalendarSymAtom, NoHolidays};

// -----------------------------------------------------------------------------
// CalendarSrc
// CalendarSrcInduce
// -----------------------------------------------------------------------------
/// Source of calendars looked up by name.
pub trait CalendarSrc {
    /// Get the calendar for the given name.
    ///
    /// # Errors
    /// * [`CalendarError::UnknownName`]: When any of the leaves is not known
    fn get_calendar(&self, req: &CalendarSym) -> Result<Calendar, CalendarError>;
}

/// Source of single calendars. Combined calendars are induced from them.
///
/// Any implementor is a [`CalendarSrc`] which resolves each leaf of the requested name
/// and folds them with [`Calendar::combine`].
pub trait CalendarSrcInduce {
    /// Get the single calendar for the given name.
    ///
    /// # Errors
    /// * [`CalendarError::UnknownName`]: When the name is not known
    fn get_calendar_atom(&self, req: &CalendarSymAtom) -> Result<Calendar, CalendarError>;
}

impl<S: CalendarSrcInduce> CalendarSrc for S {
    fn get_calendar(&self, req: &CalendarSym) -> Result<Calendar, CalendarError> {
        let leaves = req
            .leaves()
            .map(|s| self.get_calendar_atom(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(leaves
            .iter()
            .fold(Calendar::from(NoHolidays), |acc, cal| acc.combine(cal)))
    }
}
