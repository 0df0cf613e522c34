use super::{tighten, Trailing, TrailingKind, TrailingProfile};
use rust_decimal::Decimal;

/// Ticks used when a profile's `param1` is not positive.
pub const DEFAULT_DISTANCE_TICKS: u32 = 10;

/// Fixed-distance trailing stop.
///
/// The distance is `param1` ticks times the engine's tick size. With a tick
/// size of zero or less, `param1` is taken as a raw price distance.
///
/// With no prior stop the stop is seeded from the entry, so the first stop is
/// never tighter than `entry ∓ distance`:
///
/// ```
/// use rust_decimal::Decimal;
/// use tradeguard_core::trailing::{Trailing, TrailingEngine, TrailingProfile};
///
/// let engine = TrailingEngine::new(Decimal::new(25, 2)); // 0.25
/// let profile = TrailingProfile::fixed_ticks(Decimal::from(8));
/// let stop = engine.compute_stop(
///     Decimal::from(100), Decimal::from(100), true, &profile, Decimal::ZERO,
/// );
/// assert_eq!(stop, Decimal::from(98));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailingEngine {
    tick_size: Decimal,
}

impl TrailingEngine {
    pub fn new(tick_size: Decimal) -> Self {
        Self { tick_size }
    }

    pub fn tick_size(&self) -> Decimal {
        self.tick_size
    }

    /// Price distance between the reference price and the stop.
    pub fn distance(&self, profile: &TrailingProfile) -> Decimal {
        if profile.kind != TrailingKind::FixedTicks {
            tracing::trace!(kind = ?profile.kind, "trailing kind falls back to fixed distance");
        }
        let ticks = if profile.param1 <= Decimal::ZERO {
            Decimal::from(DEFAULT_DISTANCE_TICKS)
        } else {
            profile.param1
        };
        if self.tick_size > Decimal::ZERO {
            ticks * self.tick_size
        } else {
            ticks
        }
    }
}

impl Trailing for TrailingEngine {
    fn compute_stop(
        &self,
        entry: Decimal,
        current: Decimal,
        is_long: bool,
        profile: &TrailingProfile,
        prior_stop: Decimal,
    ) -> Decimal {
        let distance = self.distance(profile);
        let (candidate, seed) = if is_long {
            (current - distance, entry - distance)
        } else {
            (current + distance, entry + distance)
        };
        let prior = if prior_stop <= Decimal::ZERO {
            seed
        } else {
            prior_stop
        };
        tighten(is_long, prior, candidate)
    }

    fn compute_stop_with_tick(
        &self,
        tick_size: Decimal,
        entry: Decimal,
        current: Decimal,
        is_long: bool,
        profile: &TrailingProfile,
        prior_stop: Decimal,
    ) -> Decimal {
        TrailingEngine::new(tick_size).compute_stop(entry, current, is_long, profile, prior_stop)
    }
}
