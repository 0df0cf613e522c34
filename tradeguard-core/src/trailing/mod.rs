//! Protective stop placement and trailing
//!
//! **Core rule:** a stop may tighten, never loosen. For a long the stop only
//! rises; for a short it only falls. Every [`Trailing`] implementation in
//! this module enforces it regardless of profile kind.

pub mod engine;
pub mod strategies;
pub mod tracker;

pub use engine::TrailingEngine;
pub use strategies::{CompositeStop, FixedTicksStop, PercentStop, RatchetAdapter, StopStrategy};
pub use tracker::StopTracker;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrailingKind {
    FixedTicks,
    /// Not yet computed from ATR; degrades to the fixed distance in `param1`.
    AtrMultiple,
    /// Not yet computed from the opening range; degrades like `AtrMultiple`.
    OpeningRangeWidth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailingProfile {
    pub kind: TrailingKind,
    pub param1: Decimal,
    pub param2: Decimal,
}

impl TrailingProfile {
    pub fn fixed_ticks(ticks: Decimal) -> Self {
        Self {
            kind: TrailingKind::FixedTicks,
            param1: ticks,
            param2: Decimal::ZERO,
        }
    }
}

impl Default for TrailingProfile {
    /// Fixed 10 ticks.
    fn default() -> Self {
        Self::fixed_ticks(Decimal::from(10))
    }
}

/// Next-stop computation.
pub trait Trailing: Send + Sync {
    /// Compute the next stop. `prior_stop <= 0` means no stop yet.
    ///
    /// The result never loosens relative to a positive `prior_stop`.
    fn compute_stop(
        &self,
        entry: Decimal,
        current: Decimal,
        is_long: bool,
        profile: &TrailingProfile,
        prior_stop: Decimal,
    ) -> Decimal;

    /// [`compute_stop`](Self::compute_stop) for a caller that knows the
    /// instrument's tick size. Tick-based implementations measure their
    /// distance in `tick_size` instead of a tick fixed at construction.
    fn compute_stop_with_tick(
        &self,
        tick_size: Decimal,
        entry: Decimal,
        current: Decimal,
        is_long: bool,
        profile: &TrailingProfile,
        prior_stop: Decimal,
    ) -> Decimal {
        let _ = tick_size;
        self.compute_stop(entry, current, is_long, profile, prior_stop)
    }
}

/// Combine a prior stop and a candidate without loosening.
pub(crate) fn tighten(is_long: bool, prior_stop: Decimal, candidate: Decimal) -> Decimal {
    if prior_stop <= Decimal::ZERO {
        candidate
    } else if is_long {
        prior_stop.max(candidate)
    } else {
        prior_stop.min(candidate)
    }
}
