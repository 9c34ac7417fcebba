use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        PoisonError, RwLock,
    },
};

use anyhow::{ensure, Context};
use chrono::Weekday;
use itertools::Itertools;

use super::{
    AllHolidays, BaseCalendar, Calendar, CalendarData, CalendarError, CalendarSrc,
    CalendarSrcInduce, CalendarSym, CalendarSymAtom, HolidayCalendar, NoHolidays,
};

const COMPOSITE_CACHE_CAPACITY: u64 = 1_024;

/// Calendars always available in [`CalendarRegistry::standard`].
///
/// - `NoHolidays`, `AllHolidays`
/// - `SatSun`, `FriSat`, `ThuFri`: weekend only calendars without explicit holidays
pub fn standard_calendars() -> Vec<Calendar> {
    let weekend_only = |name: &str, weekend: [Weekday; 2]| -> Calendar {
        let name = CalendarSymAtom::new(name).expect("standard calendar names are valid");
        BaseCalendar::with_atom(name, CalendarData::blank(weekend)).into()
    };
    vec![
        NoHolidays.into(),
        AllHolidays.into(),
        weekend_only("SatSun", [Weekday::Sat, Weekday::Sun]),
        weekend_only("FriSat", [Weekday::Fri, Weekday::Sat]),
        weekend_only("ThuFri", [Weekday::Thu, Weekday::Fri]),
    ]
}

// -----------------------------------------------------------------------------
// RegistryConfig
// -----------------------------------------------------------------------------
/// Calendars available in a [`CalendarRegistry`].
///
/// ```
/// use qcalendar::calendar::{CalendarRegistry, HolidayCalendar, RegistryConfig};
///
/// let config: RegistryConfig = serde_json::from_value(serde_json::json!({
///     "calendars": [
///         { "name": "GBLO", "weekend_days": ["Sat", "Sun"], "holidays": ["2024-01-01"] },
///     ],
/// }))
/// .unwrap();
/// let registry = CalendarRegistry::from_config(config).unwrap();
///
/// assert_eq!(registry.lookup("GBLO").unwrap().name(), "GBLO");
/// assert_eq!(registry.lookup("SatSun+GBLO").unwrap().name(), "GBLO+SatSun");
/// ```
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
pub struct RegistryConfig {
    /// Register [`standard_calendars`] in addition to `calendars`.
    #[serde(default = "_default_include_standard")]
    pub include_standard: bool,

    /// Calendars to register.
    #[serde(default)]
    pub calendars: Vec<BaseCalendar>,
}

fn _default_include_standard() -> bool {
    true
}

impl Default for RegistryConfig {
    #[inline]
    fn default() -> Self {
        Self {
            include_standard: _default_include_standard(),
            calendars: Vec::new(),
        }
    }
}

// -----------------------------------------------------------------------------
// CalendarRegistry
// -----------------------------------------------------------------------------
type Loader = Box<dyn Fn() -> Vec<Calendar> + Send + Sync>;

/// Thread-safe mapping from names to calendars.
///
/// Single calendars are loaded lazily on the first access, exactly once even under
/// concurrent first accesses. Combined names like `GBLO+USNY` are resolved leaf by leaf
/// and the results are cached. Cached composites are keyed by the generation of the
/// single calendars they were built from, and [`register`](Self::register) or
/// [`reset`](Self::reset) start a new generation.
///
/// Lookup is case-sensitive and round-trips: `lookup(cal.name())` returns a calendar
/// equal to `cal` for every calendar obtained from the registry.
///
/// ```
/// use chrono::NaiveDate;
/// use qcalendar::calendar::{CalendarRegistry, HolidayCalendar};
///
/// let registry = CalendarRegistry::standard();
/// let cal = registry.lookup("SatSun").unwrap();
///
/// let fri = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
/// assert_eq!(cal.next_bizday(fri), Ok(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()));
/// assert!(registry.lookup("satsun").is_err());
/// ```
pub struct CalendarRegistry {
    loader: Loader,
    atoms: RwLock<Option<HashMap<CalendarSymAtom, Calendar>>>,
    generation: AtomicU64,
    composites: moka::sync::Cache<(u64, CalendarSym), Calendar>,
}

impl std::fmt::Debug for CalendarRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let loaded = self
            .atoms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(HashMap::len);
        f.debug_struct("CalendarRegistry")
            .field("loaded", &loaded)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .field("composites", &self.composites.entry_count())
            .finish()
    }
}

//
// ctor
//
impl CalendarRegistry {
    /// Create a registry populated by `loader` on the first access.
    ///
    /// Calendars without a single name and calendars with a duplicated name are skipped.
    ///
    /// The loader runs while the registry is locked for writing, so it must not call back
    /// into the same registry. Doing so deadlocks.
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Vec<Calendar> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            atoms: RwLock::new(None),
            generation: AtomicU64::new(0),
            composites: moka::sync::Cache::new(COMPOSITE_CACHE_CAPACITY),
        }
    }

    /// Registry of [`standard_calendars`].
    #[inline]
    pub fn standard() -> Self {
        Self::new(standard_calendars)
    }

    /// Create a registry from the configuration.
    ///
    /// # Errors
    /// - If a name is used more than once, including the names of the standard calendars.
    pub fn from_config(config: RegistryConfig) -> anyhow::Result<Self> {
        let standard = if config.include_standard {
            standard_calendars()
        } else {
            Vec::new()
        };
        let dups = standard
            .iter()
            .map(Calendar::name)
            .chain(config.calendars.iter().map(HolidayCalendar::name))
            .duplicates()
            .collect_vec();
        ensure!(dups.is_empty(), "Duplicated calendar names: {}", dups.join(", "));

        let calendars = config.calendars;
        Ok(Self::new(move || {
            standard
                .iter()
                .cloned()
                .chain(calendars.iter().cloned().map(Calendar::from))
                .collect()
        }))
    }
}

//
// methods
//
impl CalendarRegistry {
    /// Get the calendar for the given name, e.g. `GBLO` or `GBLO+USNY`.
    ///
    /// # Errors
    /// * [`CalendarError::UnknownName`]: When the name is malformed or any of the leaves is not known
    pub fn lookup(&self, name: &str) -> Result<Calendar, CalendarError> {
        let sym: CalendarSym = name
            .parse()
            .map_err(|_| CalendarError::unknown_name(name))?;
        if let Some(atom) = sym.as_single() {
            return self.get_calendar_atom(atom);
        }
        let generation = self.generation.load(Ordering::SeqCst);
        let key = (generation, sym);
        if let Some(cal) = self.composites.get(&key) {
            return Ok(cal);
        }
        let cal = self.get_calendar(&key.1)?;
        if self.generation.load(Ordering::SeqCst) == generation {
            log::trace!("Calendar {} is cached as {}", key.1, cal.name());
            self.composites.insert(key, cal.clone());
        }
        Ok(cal)
    }

    /// Register a single calendar.
    ///
    /// # Errors
    /// - If the name of the calendar is not a single name.
    /// - If a calendar with the same name is already registered.
    pub fn register(&self, cal: impl Into<Calendar>) -> anyhow::Result<()> {
        let cal = cal.into();
        let sym = CalendarSymAtom::new(cal.name())
            .with_context(|| format!("Only a single calendar can be registered: {}", cal.name()))?;
        {
            let mut guard = self.atoms.write().unwrap_or_else(PoisonError::into_inner);
            let atoms = guard.get_or_insert_with(|| self.load());
            ensure!(!atoms.contains_key(&sym), "Calendar {sym} is already registered");
            log::debug!("Calendar {sym} is registered");
            atoms.insert(sym, cal);
            self.generation.fetch_add(1, Ordering::SeqCst);
        }
        self.composites.invalidate_all();
        Ok(())
    }

    /// Drop all loaded and registered calendars.
    ///
    /// Calendars are loaded again on the next access.
    pub fn reset(&self) {
        {
            let mut guard = self.atoms.write().unwrap_or_else(PoisonError::into_inner);
            *guard = None;
            self.generation.fetch_add(1, Ordering::SeqCst);
        }
        self.composites.invalidate_all();
        log::debug!("Calendar registry is reset");
    }

    /// Names of the single calendars in sorted order.
    pub fn names(&self) -> Vec<CalendarSymAtom> {
        self.with_atoms(|atoms| atoms.keys().cloned().sorted().collect())
    }

    fn with_atoms<T>(&self, f: impl FnOnce(&HashMap<CalendarSymAtom, Calendar>) -> T) -> T {
        {
            let guard = self.atoms.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(atoms) = guard.as_ref() {
                return f(atoms);
            }
        }
        let mut guard = self.atoms.write().unwrap_or_else(PoisonError::into_inner);
        f(guard.get_or_insert_with(|| self.load()))
    }

    fn load(&self) -> HashMap<CalendarSymAtom, Calendar> {
        let mut atoms = HashMap::new();
        for cal in (self.loader)() {
            let sym = match CalendarSymAtom::new(cal.name()) {
                Ok(sym) => sym,
                Err(e) => {
                    log::warn!("Calendar {} is skipped: {e}", cal.name());
                    continue;
                }
            };
            if atoms.contains_key(&sym) {
                log::warn!("Calendar {sym} is skipped: the name is already loaded");
                continue;
            }
            atoms.insert(sym, cal);
        }
        log::debug!("Calendar registry is populated with {} calendars", atoms.len());
        atoms
    }
}

impl CalendarSrcInduce for CalendarRegistry {
    fn get_calendar_atom(&self, req: &CalendarSymAtom) -> Result<Calendar, CalendarError> {
        self.with_atoms(|atoms| atoms.get(req).cloned())
            .ok_or_else(|| CalendarError::unknown_name(req.as_str()))
    }
}
