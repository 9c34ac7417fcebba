use std::{
    hash::{Hash, Hasher},
    ops::RangeInclusive,
    sync::Arc,
};

use chrono::{NaiveDate, Weekday};

use super::{
    traits::{no_bizday_after, no_bizday_before, scan_next, scan_prev},
    CalendarData, CalendarError, CalendarSymAtom, DateRange, HolidayCalendar,
};

// -----------------------------------------------------------------------------
// BaseCalendar
// -----------------------------------------------------------------------------
#[derive(Debug)]
struct _BaseCalendar {
    name: CalendarSymAtom,
    data: CalendarData,
}

/// Calendar backed by [`CalendarData`] under a single name.
///
/// A date is a holiday if its weekday is a weekend day or it is an explicit holiday.
/// Dates outside of the supported range of the data can not be classified.
///
/// Equality and hashing are based on the name only.
///
/// ```
/// use chrono::{NaiveDate, Weekday};
/// use qcalendar::calendar::{BaseCalendar, CalendarData, HolidayCalendar};
///
/// let ymd = |y: i32, m: u32, d: u32| NaiveDate::from_ymd_opt(y, m, d).unwrap();
/// let data = CalendarData::new(
///     [Weekday::Sat, Weekday::Sun],
///     [ymd(2024, 1, 1)],
///     ymd(2020, 1, 1),
///     ymd(2030, 12, 31),
/// )
/// .unwrap();
/// let cal = BaseCalendar::new("X", data).unwrap();
///
/// assert_eq!(cal.next_bizday(ymd(2023, 12, 29)), Ok(ymd(2024, 1, 2)));
/// assert_eq!(cal.days_between(ymd(2023, 12, 29), ymd(2024, 1, 8)), Ok(5));
/// ```
#[derive(Debug, Clone)]
pub struct BaseCalendar(Arc<_BaseCalendar>);

//
// ser/de
//
#[derive(serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
struct _Repr {
    /// Name of the calendar.
    name: CalendarSymAtom,

    /// Weekdays treated as holidays. Typically, Saturday and Sunday.
    weekend_days: Vec<Weekday>,

    /// Explicit holidays.
    #[serde(default)]
    holidays: Vec<NaiveDate>,

    /// The first supported date. Unbounded if omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    valid_from: Option<NaiveDate>,

    /// The last supported date. Unbounded if omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    valid_to: Option<NaiveDate>,
}

impl serde::Serialize for BaseCalendar {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let data = self.data();
        let range = data.supported_range();
        let repr = _Repr {
            name: self.0.name.clone(),
            weekend_days: data.weekend_days().to_vec(),
            holidays: data.holidays().to_vec(),
            valid_from: Some(*range.start()).filter(|d| d != &NaiveDate::MIN),
            valid_to: Some(*range.end()).filter(|d| d != &NaiveDate::MAX),
        };
        serde::Serialize::serialize(&repr, serializer)
    }
}

impl<'de> serde::Deserialize<'de> for BaseCalendar {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = <_Repr as serde::Deserialize>::deserialize(deserializer)?;
        CalendarData::new(
            repr.weekend_days,
            repr.holidays,
            repr.valid_from.unwrap_or(NaiveDate::MIN),
            repr.valid_to.unwrap_or(NaiveDate::MAX),
        )
        .map(|data| BaseCalendar::with_atom(repr.name, data))
        .map_err(serde::de::Error::custom)
    }
}

impl schemars::JsonSchema for BaseCalendar {
    fn schema_name() -> String {
        "BaseCalendar".to_owned()
    }
    fn schema_id() -> std::borrow::Cow<'static, str> {
        "qcalendar::calendar::BaseCalendar".into()
    }
    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        <_Repr as schemars::JsonSchema>::json_schema(gen)
    }
}

//
// ctor
//
impl BaseCalendar {
    /// Create a calendar with the given name and data.
    ///
    /// # Errors
    /// - If the name is not a valid [`CalendarSymAtom`].
    #[inline]
    pub fn new(name: impl Into<String>, data: CalendarData) -> anyhow::Result<Self> {
        CalendarSymAtom::new(name).map(|name| Self::with_atom(name, data))
    }

    #[inline]
    pub fn with_atom(name: CalendarSymAtom, data: CalendarData) -> Self {
        Self(Arc::new(_BaseCalendar { name, data }))
    }
}

//
// methods
//
impl BaseCalendar {
    #[inline]
    pub fn sym(&self) -> &CalendarSymAtom {
        &self.0.name
    }

    #[inline]
    pub fn data(&self) -> &CalendarData {
        &self.0.data
    }
}

impl PartialEq for BaseCalendar {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0.name == other.0.name
    }
}

impl Eq for BaseCalendar {}

impl Hash for BaseCalendar {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
    }
}

impl HolidayCalendar for BaseCalendar {
    #[inline]
    fn name(&self) -> &str {
        self.0.name.as_str()
    }

    #[inline]
    fn is_holiday(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        self.0.data.is_holiday(date)
    }

    #[inline]
    fn supported_range(&self) -> RangeInclusive<NaiveDate> {
        self.0.data.supported_range()
    }

    fn next_bizday(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        if self.0.data.is_closed() {
            return Err(no_bizday_after(date, &self.supported_range()));
        }
        scan_next(self, date)
    }

    fn prev_bizday(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        if self.0.data.is_closed() {
            return Err(no_bizday_before(date, &self.supported_range()));
        }
        scan_prev(self, date)
    }

    #[inline]
    fn num_bizdays(&self, range: &DateRange) -> Result<usize, CalendarError> {
        self.0.data.num_bizdays(range)
    }
}
