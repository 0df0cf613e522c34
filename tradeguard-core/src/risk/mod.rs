//! Risk acceptance: lockout state machine, hard caps, and the rule chain
//!
//! Every rule speaks the same contract ([`RiskRule`]) so engines, cap
//! checks, and wrappers compose freely inside a [`RiskChain`].

pub mod caps;
pub mod chain;
pub mod lockout;
pub mod pnl;
pub mod rules;

pub use caps::{evaluate_caps, RiskCaps, RiskDecision, RiskSnapshot};
pub use chain::RiskChain;
pub use lockout::LockoutEngine;
pub use pnl::PnlTracker;
pub use rules::{CapsRule, LossStreakGuard, RiskSwitch, SharedSnapshot, SnapshotSource};

use crate::domain::{LockoutState, PositionIntent};
use std::sync::Arc;

/// Risk acceptance contract
///
/// # Responsibilities
/// - Accept or reject a proposed entry with a user-visible reason
/// - Report its lockout state and whether trading is permitted right now
/// - Observe every closed-trade outcome
///
/// # Non-Responsibilities
/// - Rules do NOT size trades (that's the sizing chain's job)
/// - Rules do NOT look at the trading calendar (that's the session gate's job)
pub trait RiskRule: Send + Sync {
    /// `Ok(())` accepts; `Err(reason)` rejects with a non-empty reason.
    fn evaluate_entry(&self, intent: &PositionIntent) -> Result<(), String>;

    /// Current lockout state. Pure read: never clears an expired lockout.
    fn lockout_state(&self) -> LockoutState;

    /// Whether an entry may be taken now.
    ///
    /// This is the one read that may mutate: a time-based rule clears an
    /// expired lockout here before answering.
    fn can_trade_now(&self) -> bool;

    fn record_outcome(&self, win: bool);

    /// Rule name for logging
    fn name(&self) -> &str;
}

impl<T: RiskRule + ?Sized> RiskRule for Arc<T> {
    fn evaluate_entry(&self, intent: &PositionIntent) -> Result<(), String> {
        (**self).evaluate_entry(intent)
    }

    fn lockout_state(&self) -> LockoutState {
        (**self).lockout_state()
    }

    fn can_trade_now(&self) -> bool {
        (**self).can_trade_now()
    }

    fn record_outcome(&self, win: bool) {
        (**self).record_outcome(win)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: RiskRule + ?Sized> RiskRule for Box<T> {
    fn evaluate_entry(&self, intent: &PositionIntent) -> Result<(), String> {
        (**self).evaluate_entry(intent)
    }

    fn lockout_state(&self) -> LockoutState {
        (**self).lockout_state()
    }

    fn can_trade_now(&self) -> bool {
        (**self).can_trade_now()
    }

    fn record_outcome(&self, win: bool) {
        (**self).record_outcome(win)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
