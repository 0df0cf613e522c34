//! Position sizing: how many contracts an accepted entry may carry
//!
//! Sizers always answer; rules may decline. A [`SizingChain`] asks its rules
//! in order, falls back to a sizer, and clamps the result to the active
//! tier's band.

pub mod chain;
pub mod fixed;
pub mod tiers;

pub use chain::SizingChain;
pub use fixed::{BracketedQuantity, FixedQuantity, ModeBaseSizer, SymbolQuantityRule};
pub use tiers::{RiskTiers, Tier};

use crate::domain::{PositionIntent, RiskMode};
use serde::{Deserialize, Serialize};

/// Quantity decision with a reason that is always present (possibly empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeDecision {
    pub quantity: u32,
    pub reason: String,
    pub mode: RiskMode,
}

impl SizeDecision {
    pub fn new(quantity: u32, reason: impl Into<String>, mode: RiskMode) -> Self {
        Self {
            quantity,
            reason: reason.into(),
            mode,
        }
    }

    pub fn zero(reason: impl Into<String>, mode: RiskMode) -> Self {
        Self::new(0, reason, mode)
    }
}

/// Position sizing logic
///
/// # Responsibilities
/// - Convert risk mode + intent into a contract quantity
///
/// # Non-Responsibilities
/// - Sizers do NOT accept or reject trades (that's the risk chain's job)
/// - Sizers do NOT choose order types or stops (that's the planner's job)
pub trait Sizer: Send + Sync {
    fn decide(&self, intent: &PositionIntent, mode: RiskMode) -> SizeDecision;

    /// Sizer name for logging
    fn name(&self) -> &str;
}

/// A sizing rule that may decline with `None`.
pub trait SizeRule: Send + Sync {
    fn try_decide(&self, intent: &PositionIntent, mode: RiskMode) -> Option<SizeDecision>;

    fn name(&self) -> &str;
}
