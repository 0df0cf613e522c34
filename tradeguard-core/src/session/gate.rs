use super::calendar::{CalendarDay, CalendarProvider, NoCalendar};
use super::window::TimeWindow;
use crate::clock::{Clock, SystemClock};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Which configured window blocks a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "window", rename_all = "snake_case")]
pub enum SessionBlock {
    Settlement(TimeWindow),
    Blackout(TimeWindow),
}

impl SessionBlock {
    pub fn window(&self) -> TimeWindow {
        match self {
            SessionBlock::Settlement(w) | SessionBlock::Blackout(w) => *w,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionBlock::Settlement(_) => "settlement",
            SessionBlock::Blackout(_) => "blackout",
        }
    }
}

impl fmt::Display for SessionBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label(), self.window())
    }
}

/// Answers whether a symbol may trade at an exchange-local timestamp.
///
/// Timestamps passed to the query methods are already in the exchange's
/// local time; [`local_now`](Self::local_now) converts the injected clock
/// into that frame using the configured timezone.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use tradeguard_core::session::{CalendarDay, SessionGate, StaticCalendar};
///
/// let date = NaiveDate::from_ymd_opt(2025, 9, 2).unwrap();
/// let cal = StaticCalendar::new().with_day(
///     "ES",
///     date,
///     CalendarDay { settlement: Some("16:00-16:15".into()), blackouts: vec![] },
/// );
/// let gate = SessionGate::new(cal);
/// let at = date.and_hms_opt(16, 5, 0).unwrap();
/// assert!(gate.is_settlement_window("es", at));
/// assert!(!gate.is_blackout("es", at));
/// ```
#[derive(Clone)]
pub struct SessionGate {
    calendar: Arc<dyn CalendarProvider>,
    timezone: Tz,
    clock: Arc<dyn Clock>,
}

impl SessionGate {
    /// Gate over `calendar` in New York time on the system clock.
    pub fn new(calendar: impl CalendarProvider + 'static) -> Self {
        Self {
            calendar: Arc::new(calendar),
            timezone: chrono_tz::America::New_York,
            clock: SystemClock::shared(),
        }
    }

    /// Gate with no calendar data; nothing is ever blocked.
    pub fn unrestricted() -> Self {
        Self::new(NoCalendar)
    }

    pub fn with_shared_calendar(calendar: Arc<dyn CalendarProvider>) -> Self {
        Self {
            calendar,
            timezone: chrono_tz::America::New_York,
            clock: SystemClock::shared(),
        }
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn to_local(&self, at: DateTime<Utc>) -> NaiveDateTime {
        at.with_timezone(&self.timezone).naive_local()
    }

    pub fn local_now(&self) -> NaiveDateTime {
        self.to_local(self.clock.now())
    }

    pub fn is_blackout(&self, symbol: &str, at: NaiveDateTime) -> bool {
        let time = at.time();
        self.blackouts_for(symbol, at.date())
            .iter()
            .any(|w| w.contains(time))
    }

    pub fn is_settlement_window(&self, symbol: &str, at: NaiveDateTime) -> bool {
        self.settlement_for(symbol, at.date())
            .is_some_and(|w| w.contains(at.time()))
    }

    /// First window blocking `at`, settlement before blackouts.
    pub fn blocking_window(&self, symbol: &str, at: NaiveDateTime) -> Option<SessionBlock> {
        let day = self.day(symbol, at.date())?;
        let time = at.time();

        if let Some(w) = day.settlement.as_deref().and_then(|s| parse_window(symbol, s)) {
            if w.contains(time) {
                return Some(SessionBlock::Settlement(w));
            }
        }

        day.blackouts
            .iter()
            .filter_map(|s| parse_window(symbol, s))
            .find(|w| w.contains(time))
            .map(SessionBlock::Blackout)
    }

    /// Well-formed blackout windows for the day; malformed entries are dropped.
    pub fn blackouts_for(&self, symbol: &str, date: NaiveDate) -> Vec<TimeWindow> {
        self.day(symbol, date)
            .map(|day| {
                day.blackouts
                    .iter()
                    .filter_map(|s| parse_window(symbol, s))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn settlement_for(&self, symbol: &str, date: NaiveDate) -> Option<TimeWindow> {
        let day = self.day(symbol, date)?;
        parse_window(symbol, day.settlement.as_deref()?)
    }

    fn day(&self, symbol: &str, date: NaiveDate) -> Option<CalendarDay> {
        if symbol.trim().is_empty() {
            return None;
        }
        self.calendar.load_day(symbol, date)
    }
}

impl fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionGate")
            .field("timezone", &self.timezone)
            .finish_non_exhaustive()
    }
}

fn parse_window(symbol: &str, text: &str) -> Option<TimeWindow> {
    if text.trim().is_empty() {
        return None;
    }
    match TimeWindow::parse(text) {
        Ok(w) => Some(w),
        Err(err) => {
            tracing::warn!(symbol, window = text, %err, "ignoring malformed calendar window");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::session::StaticCalendar;
    use chrono::TimeZone;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 2).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        date().and_hms_opt(h, m, 0).unwrap()
    }

    fn gate() -> SessionGate {
        let cal = StaticCalendar::new().with_day(
            "ES",
            date(),
            CalendarDay {
                settlement: Some("16:00-16:15".into()),
                blackouts: vec![
                    "garbage".into(),
                    "08:29-08:31".into(),
                    "16:10-16:30".into(),
                ],
            },
        );
        SessionGate::new(cal)
    }

    #[test]
    fn test_blackout_and_settlement_lookup() {
        let g = gate();
        assert!(g.is_blackout("ES", at(8, 30)));
        assert!(!g.is_blackout("ES", at(9, 0)));
        assert!(g.is_settlement_window("ES", at(16, 0)));
        assert!(!g.is_settlement_window("ES", at(15, 59)));
    }

    #[test]
    fn test_malformed_window_is_ignored_individually() {
        let g = gate();
        assert_eq!(g.blackouts_for("ES", date()).len(), 2);
    }

    #[test]
    fn test_missing_day_fails_open() {
        let g = gate();
        let other = NaiveDate::from_ymd_opt(2025, 9, 3).unwrap().and_hms_opt(8, 30, 0).unwrap();
        assert!(!g.is_blackout("ES", other));
        assert!(!g.is_settlement_window("ES", other));
        assert!(g.blocking_window("NQ", at(8, 30)).is_none());
        assert!(g.blocking_window("", at(8, 30)).is_none());
    }

    #[test]
    fn test_settlement_reported_before_blackout() {
        let g = gate();
        let block = g.blocking_window("ES", at(16, 12)).unwrap();
        assert!(matches!(block, SessionBlock::Settlement(_)));

        let block = g.blocking_window("ES", at(16, 20)).unwrap();
        assert!(matches!(block, SessionBlock::Blackout(_)));
        assert_eq!(block.to_string(), "blackout 16:10-16:30");
    }

    #[test]
    fn test_local_now_uses_timezone() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 9, 2, 20, 5, 0).unwrap(),
        ));
        let g = gate().with_clock(clock);
        // 20:05 UTC is 16:05 EDT
        assert_eq!(g.local_now(), at(16, 5));
        assert!(g.is_settlement_window("ES", g.local_now()));
    }

    #[test]
    fn test_unrestricted_gate() {
        let g = SessionGate::unrestricted();
        assert!(g.blocking_window("ES", at(16, 5)).is_none());
    }
}
