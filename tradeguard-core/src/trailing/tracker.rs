use super::{tighten, Trailing, TrailingProfile};
use crate::domain::Side;
use rust_decimal::Decimal;

/// Stop lineage for one open position.
///
/// Holds the running stop so successive prices can be fed through any
/// [`Trailing`] implementation while the non-loosening rule holds across
/// the whole lineage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopTracker {
    is_long: bool,
    entry: Decimal,
    profile: TrailingProfile,
    stop: Option<Decimal>,
}

impl StopTracker {
    pub fn new(is_long: bool, entry: Decimal, profile: TrailingProfile) -> Self {
        Self {
            is_long,
            entry,
            profile,
            stop: None,
        }
    }

    /// Tracker for a side. `None` for [`Side::Flat`].
    pub fn for_side(side: Side, entry: Decimal, profile: TrailingProfile) -> Option<Self> {
        match side {
            Side::Flat => None,
            Side::Long => Some(Self::new(true, entry, profile)),
            Side::Short => Some(Self::new(false, entry, profile)),
        }
    }

    /// Start from an already placed stop.
    pub fn with_stop(mut self, stop: Decimal) -> Self {
        if stop > Decimal::ZERO {
            self.stop = Some(stop);
        }
        self
    }

    pub fn is_long(&self) -> bool {
        self.is_long
    }

    pub fn entry(&self) -> Decimal {
        self.entry
    }

    pub fn current_stop(&self) -> Option<Decimal> {
        self.stop
    }

    /// Feed a new price and return the updated stop.
    pub fn update(&mut self, trailing: &dyn Trailing, current: Decimal) -> Decimal {
        let prior = self.stop.unwrap_or(Decimal::ZERO);
        let next = trailing.compute_stop(self.entry, current, self.is_long, &self.profile, prior);
        // Hold the line even against a Trailing impl that would loosen.
        let next = tighten(self.is_long, prior, next);
        self.stop = Some(next);
        next
    }

    /// Propose a stop directly. Returns the stop actually kept.
    pub fn propose(&mut self, proposed: Decimal) -> Decimal {
        let next = tighten(self.is_long, self.stop.unwrap_or(Decimal::ZERO), proposed);
        self.stop = Some(next);
        next
    }

    /// Whether `price` has reached the stop.
    pub fn is_triggered(&self, price: Decimal) -> bool {
        match self.stop {
            Some(stop) if self.is_long => price <= stop,
            Some(stop) => price >= stop,
            None => false,
        }
    }
}
