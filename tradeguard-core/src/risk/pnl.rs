//! Account P&L bookkeeping that feeds the hard caps.
//!
//! [`PnlTracker`] books fills per symbol with average-price accounting,
//! marks open positions, and keeps the equity high-water mark, so a
//! [`CapsRule`](super::CapsRule) can read a complete [`RiskSnapshot`]
//! without the host computing drawdown itself.

use super::caps::RiskSnapshot;
use super::rules::SnapshotSource;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// One symbol's open position and realized P&L.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Book {
    /// Signed: > 0 long, < 0 short.
    quantity: i64,
    avg_price: Decimal,
    realized: Decimal,
    mark: Option<Decimal>,
    point_value: Decimal,
}

impl Book {
    fn unrealized(&self) -> Decimal {
        let Some(mark) = self.mark else {
            return Decimal::ZERO;
        };
        if self.quantity == 0 {
            return Decimal::ZERO;
        }
        let mut diff = mark - self.avg_price;
        if self.quantity < 0 {
            diff = -diff;
        }
        diff * Decimal::from(self.quantity.unsigned_abs()) * self.point_value
    }

    /// Apply a fill and return the P&L it realized.
    fn apply(&mut self, is_buy: bool, quantity: u32, price: Decimal, point_value: Decimal) -> Decimal {
        self.point_value = point_value;
        let signed = if is_buy { i64::from(quantity) } else { -i64::from(quantity) };

        // same direction (or flat): extend at a weighted average
        if (self.quantity >= 0 && signed > 0) || (self.quantity <= 0 && signed < 0) {
            let held = Decimal::from(self.quantity.unsigned_abs());
            let added = Decimal::from(quantity);
            self.avg_price = if self.quantity == 0 {
                price
            } else {
                (self.avg_price * held + price * added) / (held + added)
            };
            self.quantity += signed;
            return Decimal::ZERO;
        }

        let closed = self.quantity.unsigned_abs().min(u64::from(quantity));
        let mut per_unit = price - self.avg_price;
        if self.quantity < 0 {
            per_unit = -per_unit;
        }
        let realized = per_unit * Decimal::from(closed) * point_value;
        self.realized += realized;

        let closed = closed as i64;
        self.quantity += if is_buy { closed } else { -closed };
        let remaining = signed + if is_buy { -closed } else { closed };
        if remaining != 0 {
            // flipped: the remainder opens at the fill price
            self.avg_price = price;
            self.quantity += remaining;
        } else if self.quantity == 0 {
            self.avg_price = Decimal::ZERO;
        }
        realized
    }
}

#[derive(Debug)]
struct Ledger {
    starting_equity: Decimal,
    peak_equity: Decimal,
    daily_pnl: Decimal,
    weekly_pnl: Decimal,
    books: HashMap<String, Book>,
}

impl Ledger {
    fn equity(&self) -> Decimal {
        self.books
            .values()
            .fold(self.starting_equity, |acc, b| acc + b.realized + b.unrealized())
    }

    fn raise_peak(&mut self) {
        let equity = self.equity();
        if equity > self.peak_equity {
            self.peak_equity = equity;
        }
    }
}

/// Per-symbol P&L with an equity high-water mark.
///
/// Symbols are case-insensitive. Daily and weekly P&L count realized P&L
/// only and are reset by the host at session boundaries.
///
/// # Example
///
/// ```
/// use rust_decimal::Decimal;
/// use tradeguard_core::risk::{PnlTracker, SnapshotSource};
///
/// let pnl = PnlTracker::new(Decimal::from(10_000));
/// pnl.on_fill("ES", true, 2, Decimal::from(100), Decimal::ONE);
/// pnl.on_fill("ES", false, 1, Decimal::from(105), Decimal::ONE);
///
/// let snap = pnl.snapshot();
/// assert_eq!(snap.daily_pnl, Decimal::from(5));
/// assert_eq!(snap.account_quantity, 1);
/// ```
#[derive(Debug)]
pub struct PnlTracker {
    ledger: Mutex<Ledger>,
}

impl PnlTracker {
    pub fn new(starting_equity: Decimal) -> Self {
        Self {
            ledger: Mutex::new(Ledger {
                starting_equity,
                peak_equity: starting_equity,
                daily_pnl: Decimal::ZERO,
                weekly_pnl: Decimal::ZERO,
                books: HashMap::new(),
            }),
        }
    }

    /// Book a fill. Zero quantities are ignored.
    pub fn on_fill(&self, symbol: &str, is_buy: bool, quantity: u32, price: Decimal, point_value: Decimal) {
        if quantity == 0 {
            return;
        }
        let mut ledger = self.ledger.lock();
        let book = ledger.books.entry(key(symbol)).or_default();
        let realized = book.apply(is_buy, quantity, price, point_value);
        book.mark = Some(price);
        ledger.daily_pnl += realized;
        ledger.weekly_pnl += realized;
        ledger.raise_peak();
        tracing::debug!(symbol, is_buy, quantity, %price, %realized, "fill booked");
    }

    /// Mark an open position to `price`.
    pub fn mark(&self, symbol: &str, price: Decimal) {
        let mut ledger = self.ledger.lock();
        if let Some(book) = ledger.books.get_mut(&key(symbol)) {
            book.mark = Some(price);
            ledger.raise_peak();
        }
    }

    pub fn position(&self, symbol: &str) -> i64 {
        self.book(symbol).quantity
    }

    /// Average price of the open position, zero when flat.
    pub fn avg_price(&self, symbol: &str) -> Decimal {
        let book = self.book(symbol);
        if book.quantity == 0 {
            Decimal::ZERO
        } else {
            book.avg_price
        }
    }

    pub fn realized(&self, symbol: &str) -> Decimal {
        self.book(symbol).realized
    }

    /// Unrealized P&L at the last mark or fill price.
    pub fn unrealized(&self, symbol: &str) -> Decimal {
        self.book(symbol).unrealized()
    }

    pub fn equity(&self) -> Decimal {
        self.ledger.lock().equity()
    }

    pub fn peak_equity(&self) -> Decimal {
        self.ledger.lock().peak_equity
    }

    pub fn reset_day(&self) {
        self.ledger.lock().daily_pnl = Decimal::ZERO;
    }

    /// Also resets the day.
    pub fn reset_week(&self) {
        let mut ledger = self.ledger.lock();
        ledger.daily_pnl = Decimal::ZERO;
        ledger.weekly_pnl = Decimal::ZERO;
    }

    fn book(&self, symbol: &str) -> Book {
        self.ledger
            .lock()
            .books
            .get(&key(symbol))
            .copied()
            .unwrap_or_default()
    }
}

impl SnapshotSource for PnlTracker {
    fn snapshot(&self) -> RiskSnapshot {
        let ledger = self.ledger.lock();
        let contracts: u64 = ledger.books.values().map(|b| b.quantity.unsigned_abs()).sum();
        RiskSnapshot {
            account_quantity: u32::try_from(contracts).unwrap_or(u32::MAX),
            equity: ledger.equity(),
            peak_equity: ledger.peak_equity,
            daily_pnl: ledger.daily_pnl,
            weekly_pnl: ledger.weekly_pnl,
        }
    }
}

fn key(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PositionIntent;
    use crate::risk::{CapsRule, RiskCaps, RiskRule};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    #[test]
    fn test_partial_close_realizes_and_marks() {
        let pnl = PnlTracker::new(dec!(0));
        pnl.on_fill("ES", true, 2, dec!(100), dec!(1));
        pnl.on_fill("es", false, 1, dec!(105), dec!(1));
        assert_eq!(pnl.realized("ES"), dec!(5));
        assert_eq!(pnl.position("ES"), 1);
        pnl.mark("ES", dec!(104));
        assert_eq!(pnl.unrealized("ES"), dec!(4));
    }

    #[test]
    fn test_averaging_in() {
        let pnl = PnlTracker::new(dec!(0));
        pnl.on_fill("CL", false, 1, dec!(70), dec!(1000));
        pnl.on_fill("CL", false, 3, dec!(74), dec!(1000));
        assert_eq!(pnl.position("CL"), -4);
        assert_eq!(pnl.avg_price("CL"), dec!(73));
        pnl.mark("CL", dec!(72));
        // short 4 from 73, marked at 72: +1 * 4 * 1000
        assert_eq!(pnl.unrealized("CL"), dec!(4000));
    }

    #[test]
    fn test_flip_opens_remainder_at_fill_price() {
        let pnl = PnlTracker::new(dec!(0));
        pnl.on_fill("NQ", true, 1, dec!(100), dec!(1));
        pnl.on_fill("NQ", false, 3, dec!(98), dec!(1));
        assert_eq!(pnl.realized("NQ"), dec!(-2));
        assert_eq!(pnl.position("NQ"), -2);
        assert_eq!(pnl.avg_price("NQ"), dec!(98));
    }

    #[test]
    fn test_flat_book_has_zero_avg_price() {
        let pnl = PnlTracker::new(dec!(0));
        pnl.on_fill("ES", true, 1, dec!(100), dec!(1));
        pnl.on_fill("ES", false, 1, dec!(101), dec!(1));
        assert_eq!(pnl.position("ES"), 0);
        assert_eq!(pnl.avg_price("ES"), dec!(0));
        assert_eq!(pnl.unrealized("ES"), dec!(0));
    }

    #[test]
    fn test_peak_is_a_high_water_mark() {
        let pnl = PnlTracker::new(dec!(1000));
        pnl.on_fill("ES", true, 1, dec!(100), dec!(50));
        pnl.mark("ES", dec!(110));
        assert_eq!(pnl.peak_equity(), dec!(1500));
        pnl.mark("ES", dec!(90));
        assert_eq!(pnl.equity(), dec!(500));
        assert_eq!(pnl.peak_equity(), dec!(1500));
        assert_eq!(pnl.snapshot().drawdown(), dec!(1000));
    }

    #[test]
    fn test_resets_clear_period_pnl_only() {
        let pnl = PnlTracker::new(dec!(0));
        pnl.on_fill("ES", true, 1, dec!(100), dec!(1));
        pnl.on_fill("ES", false, 1, dec!(90), dec!(1));
        pnl.reset_day();
        let snap = pnl.snapshot();
        assert_eq!(snap.daily_pnl, dec!(0));
        assert_eq!(snap.weekly_pnl, dec!(-10));
        pnl.reset_week();
        assert_eq!(pnl.snapshot().weekly_pnl, dec!(0));
        assert_eq!(pnl.realized("ES"), dec!(-10));
    }

    #[test]
    fn test_caps_rule_reads_tracked_drawdown() {
        let pnl = Arc::new(PnlTracker::new(dec!(10000)));
        let caps = RiskCaps {
            trailing_drawdown: dec!(500),
            ..RiskCaps::uncapped()
        };
        let rule = CapsRule::new(caps, pnl.clone());
        let intent = PositionIntent::long("ES");

        pnl.on_fill("ES", true, 1, dec!(4500), dec!(50));
        pnl.mark("ES", dec!(4520));
        assert_eq!(rule.evaluate_entry(&intent), Ok(()));

        // peak 11_000, now 10_500: drawdown reaches the limit
        pnl.mark("ES", dec!(4510));
        assert_eq!(rule.evaluate_entry(&intent), Err("TrailingDrawdown".to_string()));
    }
}
