//! Consecutive-loss / cooldown state machine.
//!
//! ```text
//! None ──loss #1──▶ CoolingDown ──loss #N──▶ LockedOut ──cooldown elapsed──▶ None
//!   ▲                    │
//!   └──────win───────────┘
//! ```
//!
//! One engine is one shared fate: every symbol routed through the same
//! engine shares its lockout. Use one engine per symbol for isolation.

use super::RiskRule;
use crate::clock::Clock;
use crate::domain::{LockoutState, PositionIntent, RiskMode};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_LOSS_STREAK_THRESHOLD: u32 = 2;
pub const DEFAULT_COOLDOWN_MINUTES: i64 = 15;
/// Longest accepted cooldown: one week.
pub const MAX_COOLDOWN_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Clear,
    CoolingDown,
    LockedOut { until: DateTime<Utc> },
}

#[derive(Debug)]
struct Inner {
    loss_streak: u32,
    phase: Phase,
}

pub struct LockoutEngine {
    mode: RiskMode,
    threshold: u32,
    cooldown: Duration,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

impl LockoutEngine {
    /// `threshold` below 1 is raised to 1; a non-positive `cooldown`
    /// falls back to 15 minutes and one longer than a week is cut to a week.
    pub fn new(mode: RiskMode, threshold: u32, cooldown: Duration, clock: Arc<dyn Clock>) -> Self {
        let threshold = if threshold == 0 {
            tracing::warn!("loss streak threshold 0 raised to 1");
            1
        } else {
            threshold
        };
        let cooldown = if cooldown <= Duration::zero() {
            tracing::warn!(
                cooldown_secs = cooldown.num_seconds(),
                "non-positive cooldown replaced with default"
            );
            Duration::minutes(DEFAULT_COOLDOWN_MINUTES)
        } else if cooldown > Duration::minutes(MAX_COOLDOWN_MINUTES) {
            tracing::warn!(
                cooldown_mins = cooldown.num_minutes(),
                max_mins = MAX_COOLDOWN_MINUTES,
                "cooldown capped"
            );
            Duration::minutes(MAX_COOLDOWN_MINUTES)
        } else {
            cooldown
        };

        Self {
            mode,
            threshold,
            cooldown,
            clock,
            inner: Mutex::new(Inner {
                loss_streak: 0,
                phase: Phase::Clear,
            }),
        }
    }

    /// Threshold 2, 15 minute cooldown.
    pub fn with_defaults(mode: RiskMode, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            mode,
            DEFAULT_LOSS_STREAK_THRESHOLD,
            Duration::minutes(DEFAULT_COOLDOWN_MINUTES),
            clock,
        )
    }

    pub fn mode(&self) -> RiskMode {
        self.mode
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn loss_streak(&self) -> u32 {
        self.inner.lock().loss_streak
    }

    /// Expiry of the active lockout, if locked out.
    pub fn cooldown_until(&self) -> Option<DateTime<Utc>> {
        match self.inner.lock().phase {
            Phase::LockedOut { until } => Some(until),
            _ => None,
        }
    }

    /// Lock out now, regardless of the loss streak.
    pub fn force_lockout(&self) {
        let until = self.lockout_until();
        self.inner.lock().phase = Phase::LockedOut { until };
        tracing::info!(mode = %self.mode, %until, "forced lockout");
    }

    /// Now plus the cooldown, saturating at the latest representable instant.
    fn lockout_until(&self) -> DateTime<Utc> {
        self.clock
            .now()
            .checked_add_signed(self.cooldown)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn state_of(phase: Phase) -> LockoutState {
        match phase {
            Phase::Clear => LockoutState::None,
            Phase::CoolingDown => LockoutState::CoolingDown,
            Phase::LockedOut { .. } => LockoutState::LockedOut,
        }
    }
}

impl RiskRule for LockoutEngine {
    fn evaluate_entry(&self, intent: &PositionIntent) -> Result<(), String> {
        if intent.symbol.is_empty() {
            return Err("symbol missing".into());
        }
        if !self.can_trade_now() {
            return Err("risk lockout in effect".into());
        }
        Ok(())
    }

    fn lockout_state(&self) -> LockoutState {
        Self::state_of(self.inner.lock().phase)
    }

    /// Clears an expired lockout and resets the loss streak before answering.
    fn can_trade_now(&self) -> bool {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        if let Phase::LockedOut { until } = inner.phase {
            if now >= until {
                inner.phase = Phase::Clear;
                inner.loss_streak = 0;
                tracing::info!(mode = %self.mode, "lockout cooldown elapsed");
            }
        }
        Self::state_of(inner.phase).permits_trading()
    }

    fn record_outcome(&self, win: bool) {
        let mut inner = self.inner.lock();
        if win {
            inner.loss_streak = 0;
            if inner.phase == Phase::CoolingDown {
                inner.phase = Phase::Clear;
            }
            return;
        }

        inner.loss_streak = inner.loss_streak.saturating_add(1);
        if inner.loss_streak >= self.threshold {
            let until = self.lockout_until();
            inner.phase = Phase::LockedOut { until };
            tracing::info!(
                mode = %self.mode,
                loss_streak = inner.loss_streak,
                %until,
                "loss streak threshold reached, locked out"
            );
        } else if inner.loss_streak == 1 && inner.phase == Phase::Clear {
            inner.phase = Phase::CoolingDown;
            tracing::debug!(mode = %self.mode, "first loss, cooling down");
        }
    }

    fn name(&self) -> &str {
        "lockout"
    }
}

impl fmt::Debug for LockoutEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("LockoutEngine")
            .field("mode", &self.mode)
            .field("threshold", &self.threshold)
            .field("cooldown", &self.cooldown)
            .field("loss_streak", &inner.loss_streak)
            .field("phase", &inner.phase)
            .finish()
    }
}
