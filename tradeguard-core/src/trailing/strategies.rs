//! Stateless stop strategies and the adapter that makes them trail.
//!
//! A [`StopStrategy`] proposes a stop from entry and current price alone.
//! It knows nothing about prior stops; [`RatchetAdapter`] adds that.

use super::{tighten, Trailing, TrailingProfile};
use rust_decimal::Decimal;

pub trait StopStrategy: Send + Sync {
    /// Proposed stop, or `None` when the strategy has no opinion.
    fn stop_price(&self, entry: Decimal, current: Decimal, is_long: bool) -> Option<Decimal>;

    fn name(&self) -> &str;
}

/// `ticks × tick_size` behind the better of entry and current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedTicksStop {
    ticks: u32,
    tick_size: Decimal,
}

impl FixedTicksStop {
    pub fn new(ticks: u32, tick_size: Decimal) -> Self {
        Self { ticks, tick_size }
    }
}

impl StopStrategy for FixedTicksStop {
    fn stop_price(&self, entry: Decimal, current: Decimal, is_long: bool) -> Option<Decimal> {
        if self.ticks == 0 || self.tick_size <= Decimal::ZERO {
            return None;
        }
        let offset = Decimal::from(self.ticks) * self.tick_size;
        Some(if is_long {
            (entry - offset).max(current - offset)
        } else {
            (entry + offset).min(current + offset)
        })
    }

    fn name(&self) -> &str {
        "FixedTicks"
    }
}

/// Fractional distance (0.1 = 10%) behind the better of entry and current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PercentStop {
    fraction: Decimal,
}

impl PercentStop {
    pub fn new(fraction: Decimal) -> Self {
        Self { fraction }
    }
}

impl StopStrategy for PercentStop {
    fn stop_price(&self, entry: Decimal, current: Decimal, is_long: bool) -> Option<Decimal> {
        if self.fraction <= Decimal::ZERO {
            return None;
        }
        Some(if is_long {
            let factor = Decimal::ONE - self.fraction;
            (entry * factor).max(current * factor)
        } else {
            let factor = Decimal::ONE + self.fraction;
            (entry * factor).min(current * factor)
        })
    }

    fn name(&self) -> &str {
        "Percent"
    }
}

/// Most protective stop among its children (highest for a long, lowest for a short).
#[derive(Default)]
pub struct CompositeStop {
    stops: Vec<Box<dyn StopStrategy>>,
}

impl CompositeStop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, stop: impl StopStrategy + 'static) -> Self {
        self.stops.push(Box::new(stop));
        self
    }
}

impl StopStrategy for CompositeStop {
    fn stop_price(&self, entry: Decimal, current: Decimal, is_long: bool) -> Option<Decimal> {
        self.stops
            .iter()
            .filter_map(|s| s.stop_price(entry, current, is_long))
            .reduce(|a, b| if is_long { a.max(b) } else { a.min(b) })
    }

    fn name(&self) -> &str {
        "Composite"
    }
}

impl std::fmt::Debug for CompositeStop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.stops.iter().map(|s| s.name()))
            .finish()
    }
}

/// Lifts a [`StopStrategy`] into the [`Trailing`] contract.
///
/// The profile is ignored; the strategy carries its own parameters. A
/// strategy with no opinion leaves the prior stop in place.
#[derive(Debug, Clone)]
pub struct RatchetAdapter<S> {
    strategy: S,
}

impl<S: StopStrategy> RatchetAdapter<S> {
    pub fn new(strategy: S) -> Self {
        Self { strategy }
    }
}

impl<S: StopStrategy> Trailing for RatchetAdapter<S> {
    fn compute_stop(
        &self,
        entry: Decimal,
        current: Decimal,
        is_long: bool,
        _profile: &TrailingProfile,
        prior_stop: Decimal,
    ) -> Decimal {
        match self.strategy.stop_price(entry, current, is_long) {
            Some(candidate) => tighten(is_long, prior_stop, candidate),
            None => prior_stop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fixed_ticks_stop() {
        let s = FixedTicksStop::new(10, dec!(0.25));
        assert_eq!(s.stop_price(dec!(100), dec!(110), true), Some(dec!(107.5)));
        assert_eq!(s.stop_price(dec!(100), dec!(90), false), Some(dec!(92.5)));
        assert_eq!(FixedTicksStop::new(0, dec!(0.25)).stop_price(dec!(1), dec!(1), true), None);
        assert_eq!(FixedTicksStop::new(4, dec!(0)).stop_price(dec!(1), dec!(1), true), None);
    }

    #[test]
    fn test_percent_stop() {
        let s = PercentStop::new(dec!(0.1));
        assert_eq!(s.stop_price(dec!(100), dec!(120), true), Some(dec!(108.0)));
        assert_eq!(s.stop_price(dec!(100), dec!(80), false), Some(dec!(88.0)));
        assert_eq!(PercentStop::new(dec!(0)).stop_price(dec!(1), dec!(1), true), None);
    }

    #[test]
    fn test_composite_picks_most_protective() {
        let c = CompositeStop::new()
            .with(FixedTicksStop::new(10, dec!(0.25)))
            .with(PercentStop::new(dec!(0.1)));
        // long: 117.5 vs 108
        assert_eq!(c.stop_price(dec!(100), dec!(120), true), Some(dec!(117.5)));
        // short: 82.5 vs 88
        assert_eq!(c.stop_price(dec!(100), dec!(80), false), Some(dec!(82.5)));
        assert_eq!(CompositeStop::new().stop_price(dec!(1), dec!(1), true), None);
    }

    #[test]
    fn test_adapter_never_loosens() {
        let a = RatchetAdapter::new(FixedTicksStop::new(4, dec!(1)));
        let p = TrailingProfile::default();
        let s1 = a.compute_stop(dec!(100), dec!(120), true, &p, dec!(100));
        assert_eq!(s1, dec!(116));
        let s2 = a.compute_stop(dec!(100), dec!(110), true, &p, s1);
        assert_eq!(s2, dec!(116));

        let s1 = a.compute_stop(dec!(100), dec!(80), false, &p, dec!(0));
        assert_eq!(s1, dec!(84));
        let s2 = a.compute_stop(dec!(100), dec!(90), false, &p, s1);
        assert_eq!(s2, dec!(84));
    }

    #[test]
    fn test_adapter_keeps_prior_without_opinion() {
        let a = RatchetAdapter::new(PercentStop::new(dec!(0)));
        let p = TrailingProfile::default();
        assert_eq!(a.compute_stop(dec!(100), dec!(50), true, &p, dec!(97)), dec!(97));
    }
}
