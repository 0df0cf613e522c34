//! Day-keyed calendar data per symbol.
//!
//! A calendar day carries at most one settlement window and any number of
//! blackout windows, all as raw `"HH:mm-HH:mm"` strings. Strings are parsed
//! lazily by the gate so a single bad entry never poisons the rest of the day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("failed to read calendar file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid calendar document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Restrictions for one symbol on one exchange-local date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    #[serde(default)]
    pub settlement: Option<String>,
    #[serde(default)]
    pub blackouts: Vec<String>,
}

/// Source of calendar days. Symbol lookup is case-insensitive.
pub trait CalendarProvider: Send + Sync {
    fn load_day(&self, symbol: &str, date: NaiveDate) -> Option<CalendarDay>;
}

impl<F> CalendarProvider for F
where
    F: Fn(&str, NaiveDate) -> Option<CalendarDay> + Send + Sync,
{
    fn load_day(&self, symbol: &str, date: NaiveDate) -> Option<CalendarDay> {
        self(symbol, date)
    }
}

/// Provider with no data: every day is unrestricted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCalendar;

impl CalendarProvider for NoCalendar {
    fn load_day(&self, _symbol: &str, _date: NaiveDate) -> Option<CalendarDay> {
        None
    }
}

// ── Document shape ──

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarDocument {
    #[serde(default)]
    pub symbols: Vec<SymbolCalendar>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolCalendar {
    pub symbol: String,
    #[serde(default)]
    pub days: Vec<DayRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayRecord {
    /// `yyyy-MM-dd`
    pub date: String,
    #[serde(flatten)]
    pub day: CalendarDay,
}

/// In-memory calendar built from a [`CalendarDocument`] or by hand.
#[derive(Debug, Clone, Default)]
pub struct StaticCalendar {
    days: HashMap<String, HashMap<NaiveDate, CalendarDay>>,
}

impl StaticCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records with an unparseable date are skipped with a warning.
    pub fn from_document(doc: CalendarDocument) -> Self {
        let mut cal = Self::new();
        for sym in doc.symbols {
            for rec in sym.days {
                match NaiveDate::parse_from_str(rec.date.trim(), "%Y-%m-%d") {
                    Ok(date) => cal.insert_day(&sym.symbol, date, rec.day),
                    Err(_) => tracing::warn!(
                        symbol = %sym.symbol,
                        date = %rec.date,
                        "skipping calendar day with malformed date"
                    ),
                }
            }
        }
        cal
    }

    pub fn from_json_str(text: &str) -> Result<Self, CalendarError> {
        let doc: CalendarDocument = serde_json::from_str(text)?;
        Ok(Self::from_document(doc))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CalendarError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn insert_day(&mut self, symbol: &str, date: NaiveDate, day: CalendarDay) {
        self.days
            .entry(symbol.trim().to_ascii_uppercase())
            .or_default()
            .insert(date, day);
    }

    /// Builder form of [`insert_day`](Self::insert_day).
    pub fn with_day(mut self, symbol: &str, date: NaiveDate, day: CalendarDay) -> Self {
        self.insert_day(symbol, date, day);
        self
    }

    pub fn symbol_count(&self) -> usize {
        self.days.len()
    }
}

impl CalendarProvider for StaticCalendar {
    fn load_day(&self, symbol: &str, date: NaiveDate) -> Option<CalendarDay> {
        self.days
            .get(&symbol.trim().to_ascii_uppercase())?
            .get(&date)
            .cloned()
    }
}
