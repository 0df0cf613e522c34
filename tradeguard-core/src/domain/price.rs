//! Tick-size normalization.

use rust_decimal::{Decimal, RoundingStrategy};

/// Tick size used when none is configured: 0.25, the index-futures quarter point.
pub const DEFAULT_TICK_SIZE: Decimal = Decimal::from_parts(25, 0, 0, false, 2);

/// Round `price` to the nearest multiple of `tick_size`, midpoints away from
/// zero. A tick size <= 0 disables rounding.
pub fn round_to_tick(price: Decimal, tick_size: Decimal) -> Decimal {
    if tick_size <= Decimal::ZERO {
        return price;
    }
    let ticks = (price / tick_size).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    ticks * tick_size
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rounds_to_nearest_tick() {
        assert_eq!(round_to_tick(dec!(4500.10), dec!(0.25)), dec!(4500.00));
        assert_eq!(round_to_tick(dec!(4500.15), dec!(0.25)), dec!(4500.25));
        assert_eq!(round_to_tick(dec!(100.126), dec!(0.01)), dec!(100.13));
    }

    #[test]
    fn test_midpoint_rounds_away_from_zero() {
        assert_eq!(round_to_tick(dec!(4500.125), dec!(0.25)), dec!(4500.25));
        assert_eq!(round_to_tick(dec!(-4500.125), dec!(0.25)), dec!(-4500.25));
    }

    #[test]
    fn test_non_positive_tick_passes_through() {
        assert_eq!(round_to_tick(dec!(4500.13), Decimal::ZERO), dec!(4500.13));
        assert_eq!(round_to_tick(dec!(4500.13), dec!(-0.25)), dec!(4500.13));
    }

    #[test]
    fn test_default_tick_is_a_quarter() {
        assert_eq!(DEFAULT_TICK_SIZE, dec!(0.25));
    }

    #[test]
    fn test_aligned_price_unchanged() {
        assert_eq!(round_to_tick(dec!(4500.75), dec!(0.25)), dec!(4500.75));
    }
}
