mod base;
mod combined;
mod data;
mod data_src;
mod error;
mod holadj;
mod range;
mod registry;
mod sym;
mod traits;
mod trivial;
mod variant;

pub use base::BaseCalendar;
pub use combined::CombinedCalendar;
pub use data::{CalendarData, CalendarDataBuilder};
pub use data_src::{CalendarSrc, CalendarSrcInduce};
pub use error::CalendarError;
pub use holadj::BizdayAdj;
pub use range::{DateRange, Days};
pub use registry::{standard_calendars, CalendarRegistry, RegistryConfig};
pub use sym::{CalendarSym, CalendarSymAtom};
pub use traits::HolidayCalendar;
pub use trivial::{AllHolidays, NoHolidays};
pub use variant::{Calendar, CustomCalendar};
