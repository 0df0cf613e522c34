//! Additional risk rules: cap checks, count-only loss guard, and an
//! enable/manual-lockout switch.

use super::caps::{evaluate_caps, RiskCaps, RiskDecision, RiskSnapshot};
use super::RiskRule;
use crate::domain::{LockoutState, PositionIntent};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// Supplies a fresh account snapshot on every evaluation.
pub trait SnapshotSource: Send + Sync {
    fn snapshot(&self) -> RiskSnapshot;
}

impl<F> SnapshotSource for F
where
    F: Fn() -> RiskSnapshot + Send + Sync,
{
    fn snapshot(&self) -> RiskSnapshot {
        self()
    }
}

/// Snapshot cell updated by the host as fills and P&L arrive.
#[derive(Debug, Default)]
pub struct SharedSnapshot {
    current: RwLock<RiskSnapshot>,
}

impl SharedSnapshot {
    pub fn new(initial: RiskSnapshot) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    pub fn set(&self, snapshot: RiskSnapshot) {
        *self.current.write() = snapshot;
    }

    pub fn get(&self) -> RiskSnapshot {
        *self.current.read()
    }
}

impl SnapshotSource for SharedSnapshot {
    fn snapshot(&self) -> RiskSnapshot {
        self.get()
    }
}

// ── Caps ──

/// Hard caps as a risk rule. Rejects with the decision's reason code.
pub struct CapsRule {
    caps: RiskCaps,
    source: Arc<dyn SnapshotSource>,
}

impl CapsRule {
    pub fn new(caps: RiskCaps, source: Arc<dyn SnapshotSource>) -> Self {
        Self { caps, source }
    }

    pub fn caps(&self) -> &RiskCaps {
        &self.caps
    }

    pub fn decide(&self) -> RiskDecision {
        evaluate_caps(&self.caps, &self.source.snapshot())
    }
}

impl RiskRule for CapsRule {
    fn evaluate_entry(&self, _intent: &PositionIntent) -> Result<(), String> {
        match self.decide() {
            RiskDecision::Allow => Ok(()),
            blocked => {
                tracing::debug!(reason = blocked.reason(), message = blocked.message(), "cap breached");
                Err(blocked.reason().to_string())
            }
        }
    }

    fn lockout_state(&self) -> LockoutState {
        LockoutState::None
    }

    fn can_trade_now(&self) -> bool {
        self.decide().is_allow()
    }

    fn record_outcome(&self, _win: bool) {}

    fn name(&self) -> &str {
        "caps"
    }
}

// ── Loss streak guard ──

/// Blocks after `max_losses` consecutive losses until a win arrives.
/// No time component.
#[derive(Debug)]
pub struct LossStreakGuard {
    max_losses: u32,
    tag: String,
    streak: AtomicU32,
}

impl LossStreakGuard {
    pub fn new(max_losses: u32) -> Self {
        Self::with_tag(max_losses, "LossStreak")
    }

    pub fn with_tag(max_losses: u32, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self {
            max_losses: max_losses.max(1),
            tag: if tag.is_empty() { "LossStreak".into() } else { tag },
            streak: AtomicU32::new(0),
        }
    }

    pub fn streak(&self) -> u32 {
        self.streak.load(Ordering::SeqCst)
    }

    pub fn max_losses(&self) -> u32 {
        self.max_losses
    }

    pub fn reset(&self) {
        self.streak.store(0, Ordering::SeqCst);
    }

    fn blocked(&self) -> bool {
        self.streak() >= self.max_losses
    }
}

impl RiskRule for LossStreakGuard {
    fn evaluate_entry(&self, _intent: &PositionIntent) -> Result<(), String> {
        if self.blocked() {
            Err(self.tag.clone())
        } else {
            Ok(())
        }
    }

    fn lockout_state(&self) -> LockoutState {
        if self.blocked() {
            LockoutState::LockedOut
        } else {
            LockoutState::None
        }
    }

    fn can_trade_now(&self) -> bool {
        !self.blocked()
    }

    fn record_outcome(&self, win: bool) {
        if win {
            self.reset();
        } else {
            // saturating increment
            let _ = self
                .streak
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1));
        }
    }

    fn name(&self) -> &str {
        &self.tag
    }
}

// ── Switch ──

/// Operator controls around another rule.
///
/// Disabled rejects with `RiskDisabled`; a manual lockout rejects with
/// `RiskManualLockout`. Either one reports `LockedOut`.
#[derive(Debug)]
pub struct RiskSwitch<R> {
    inner: R,
    enabled: AtomicBool,
    manual_lockout: AtomicBool,
}

impl<R: RiskRule> RiskSwitch<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            enabled: AtomicBool::new(true),
            manual_lockout: AtomicBool::new(false),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        tracing::info!(enabled, "risk switch toggled");
    }

    pub fn is_manually_locked(&self) -> bool {
        self.manual_lockout.load(Ordering::SeqCst)
    }

    pub fn set_manual_lockout(&self, locked: bool) {
        self.manual_lockout.store(locked, Ordering::SeqCst);
        tracing::info!(locked, "manual lockout toggled");
    }

    fn blocked_reason(&self) -> Option<&'static str> {
        if !self.is_enabled() {
            Some("RiskDisabled")
        } else if self.is_manually_locked() {
            Some("RiskManualLockout")
        } else {
            None
        }
    }
}

impl<R: RiskRule> RiskRule for RiskSwitch<R> {
    fn evaluate_entry(&self, intent: &PositionIntent) -> Result<(), String> {
        match self.blocked_reason() {
            Some(reason) => Err(reason.to_string()),
            None => self.inner.evaluate_entry(intent),
        }
    }

    fn lockout_state(&self) -> LockoutState {
        match self.blocked_reason() {
            Some(_) => LockoutState::LockedOut,
            None => self.inner.lockout_state(),
        }
    }

    fn can_trade_now(&self) -> bool {
        self.blocked_reason().is_none() && self.inner.can_trade_now()
    }

    fn record_outcome(&self, win: bool) {
        self.inner.record_outcome(win);
    }

    fn name(&self) -> &str {
        "switch"
    }
}
