//! Stateless account-level hard caps.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hard limits. A zero (or negative) limit leaves that dimension uncapped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskCaps {
    pub max_contracts: u32,
    pub daily_loss_limit: Decimal,
    pub weekly_loss_limit: Decimal,
    pub trailing_drawdown: Decimal,
}

impl RiskCaps {
    pub fn uncapped() -> Self {
        Self::default()
    }

    pub fn is_uncapped(&self) -> bool {
        self.max_contracts == 0
            && self.daily_loss_limit <= Decimal::ZERO
            && self.weekly_loss_limit <= Decimal::ZERO
            && self.trailing_drawdown <= Decimal::ZERO
    }
}

/// Account state supplied fresh by the caller for each evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSnapshot {
    pub account_quantity: u32,
    pub equity: Decimal,
    pub peak_equity: Decimal,
    pub daily_pnl: Decimal,
    pub weekly_pnl: Decimal,
}

impl RiskSnapshot {
    pub fn drawdown(&self) -> Decimal {
        self.peak_equity - self.equity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskDecision {
    Allow,
    BlockMaxContracts,
    BlockDailyLoss,
    BlockWeeklyLoss,
    BlockTrailingDrawdown,
}

impl RiskDecision {
    pub fn is_allow(&self) -> bool {
        matches!(self, RiskDecision::Allow)
    }

    /// Short reason code, used as the rejection reason by [`CapsRule`](super::CapsRule).
    pub fn reason(&self) -> &'static str {
        match self {
            RiskDecision::Allow => "OK",
            RiskDecision::BlockMaxContracts => "MaxContracts",
            RiskDecision::BlockDailyLoss => "DailyLossLimit",
            RiskDecision::BlockWeeklyLoss => "WeeklyLossLimit",
            RiskDecision::BlockTrailingDrawdown => "TrailingDrawdown",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RiskDecision::Allow => "Allowed",
            RiskDecision::BlockMaxContracts => "Account position exceeds MaxContracts",
            RiskDecision::BlockDailyLoss => "Daily loss limit breached",
            RiskDecision::BlockWeeklyLoss => "Weekly loss limit breached",
            RiskDecision::BlockTrailingDrawdown => "Trailing drawdown breached",
        }
    }
}

impl fmt::Display for RiskDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Evaluate caps in fixed priority order; the first breach wins.
///
/// 1. position above `max_contracts`
/// 2. daily loss at or beyond `daily_loss_limit`
/// 3. weekly loss at or beyond `weekly_loss_limit`
/// 4. drawdown from peak at or beyond `trailing_drawdown`
///
/// # Example
///
/// ```
/// use rust_decimal::Decimal;
/// use tradeguard_core::risk::{evaluate_caps, RiskCaps, RiskDecision, RiskSnapshot};
///
/// let caps = RiskCaps { daily_loss_limit: Decimal::from(500), ..RiskCaps::default() };
/// let snap = RiskSnapshot { daily_pnl: Decimal::from(-500), ..RiskSnapshot::default() };
/// assert_eq!(evaluate_caps(&caps, &snap), RiskDecision::BlockDailyLoss);
/// ```
pub fn evaluate_caps(caps: &RiskCaps, snapshot: &RiskSnapshot) -> RiskDecision {
    if caps.max_contracts > 0 && snapshot.account_quantity > caps.max_contracts {
        return RiskDecision::BlockMaxContracts;
    }
    if caps.daily_loss_limit > Decimal::ZERO && -snapshot.daily_pnl >= caps.daily_loss_limit {
        return RiskDecision::BlockDailyLoss;
    }
    if caps.weekly_loss_limit > Decimal::ZERO && -snapshot.weekly_pnl >= caps.weekly_loss_limit {
        return RiskDecision::BlockWeeklyLoss;
    }
    if caps.trailing_drawdown > Decimal::ZERO && snapshot.drawdown() >= caps.trailing_drawdown {
        return RiskDecision::BlockTrailingDrawdown;
    }
    RiskDecision::Allow
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_max_contracts_is_strictly_above() {
        let caps = RiskCaps {
            max_contracts: 1,
            ..RiskCaps::default()
        };
        let mut snap = RiskSnapshot {
            account_quantity: 1,
            ..RiskSnapshot::default()
        };
        assert_eq!(evaluate_caps(&caps, &snap), RiskDecision::Allow);
        snap.account_quantity = 2;
        assert_eq!(evaluate_caps(&caps, &snap), RiskDecision::BlockMaxContracts);
    }

    #[test]
    fn test_daily_loss_breaches_at_limit() {
        let caps = RiskCaps {
            daily_loss_limit: dec!(500),
            ..RiskCaps::default()
        };
        let mut snap = RiskSnapshot {
            daily_pnl: dec!(-499.99),
            ..RiskSnapshot::default()
        };
        assert!(evaluate_caps(&caps, &snap).is_allow());
        snap.daily_pnl = dec!(-500);
        assert_eq!(evaluate_caps(&caps, &snap), RiskDecision::BlockDailyLoss);
    }

    #[test]
    fn test_weekly_and_drawdown() {
        let caps = RiskCaps {
            weekly_loss_limit: dec!(1000),
            trailing_drawdown: dec!(750),
            ..RiskCaps::default()
        };
        let snap = RiskSnapshot {
            weekly_pnl: dec!(-1000),
            equity: dec!(49000),
            peak_equity: dec!(50000),
            ..RiskSnapshot::default()
        };
        assert_eq!(evaluate_caps(&caps, &snap), RiskDecision::BlockWeeklyLoss);

        let snap = RiskSnapshot {
            weekly_pnl: dec!(-10),
            ..snap
        };
        assert_eq!(evaluate_caps(&caps, &snap), RiskDecision::BlockTrailingDrawdown);
    }

    #[test]
    fn test_uncapped_always_allows() {
        let caps = RiskCaps::uncapped();
        assert!(caps.is_uncapped());
        let snap = RiskSnapshot {
            account_quantity: 1000,
            equity: dec!(0),
            peak_equity: dec!(1000000),
            daily_pnl: dec!(-1000000),
            weekly_pnl: dec!(-1000000),
        };
        assert_eq!(evaluate_caps(&caps, &snap), RiskDecision::Allow);
    }

    #[test]
    fn test_negative_limits_are_skipped() {
        let caps = RiskCaps {
            daily_loss_limit: dec!(-5),
            ..RiskCaps::default()
        };
        let snap = RiskSnapshot {
            daily_pnl: dec!(10),
            ..RiskSnapshot::default()
        };
        assert!(evaluate_caps(&caps, &snap).is_allow());
    }

    #[test]
    fn test_reason_and_message() {
        assert_eq!(RiskDecision::Allow.reason(), "OK");
        assert_eq!(RiskDecision::Allow.message(), "Allowed");
        assert_eq!(RiskDecision::BlockTrailingDrawdown.to_string(), "TrailingDrawdown");
        assert_eq!(
            RiskDecision::BlockMaxContracts.message(),
            "Account position exceeds MaxContracts"
        );
    }
}
