use serde::{Deserialize, Serialize};
use std::fmt;

/// Capital protection mode.
///
/// Selects tier bounds and base sizing. Fixed for the lifetime of the
/// component that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskMode {
    /// Extreme capital protection (ECP).
    #[serde(alias = "ECP")]
    ExtremeCapitalProtection,
    /// Protective capital preservation (PCP).
    #[serde(alias = "PCP")]
    ProtectiveCapitalPreservation,
    /// Default capital protection (DCP).
    #[serde(alias = "DCP")]
    DefaultCapitalProtection,
    /// High risk (HR).
    #[serde(alias = "HR")]
    HighRisk,
}

impl RiskMode {
    pub const ALL: [RiskMode; 4] = [
        RiskMode::ExtremeCapitalProtection,
        RiskMode::ProtectiveCapitalPreservation,
        RiskMode::DefaultCapitalProtection,
        RiskMode::HighRisk,
    ];

    /// Short code used in reasons and tier tags.
    pub fn code(self) -> &'static str {
        match self {
            RiskMode::ExtremeCapitalProtection => "ECP",
            RiskMode::ProtectiveCapitalPreservation => "PCP",
            RiskMode::DefaultCapitalProtection => "DCP",
            RiskMode::HighRisk => "HR",
        }
    }
}

impl Default for RiskMode {
    fn default() -> Self {
        RiskMode::DefaultCapitalProtection
    }
}

impl fmt::Display for RiskMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Lockout state reported by a risk rule.
///
/// `None` and `CoolingDown` both permit trading; `LockedOut` does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockoutState {
    None,
    /// Soft state after the first loss of a streak. Still tradeable.
    CoolingDown,
    LockedOut,
}

impl LockoutState {
    pub fn permits_trading(self) -> bool {
        !matches!(self, LockoutState::LockedOut)
    }
}
