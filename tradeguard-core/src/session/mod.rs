//! Trading-calendar restrictions: time-of-day windows, day-keyed calendar
//! data, and the gate that answers "is this timestamp blocked?".
//!
//! Missing or malformed calendar data never blocks trading (fail-open on
//! data); an explicitly configured window always does.

pub mod calendar;
pub mod gate;
pub mod window;

pub use calendar::{CalendarDay, CalendarError, CalendarProvider, NoCalendar, StaticCalendar};
pub use gate::{SessionBlock, SessionGate};
pub use window::{TimeWindow, WindowParseError};
