use crate::domain::RiskMode;
use serde::{Deserialize, Serialize};

/// Quantity band for one risk mode. `max` is never below `min`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTier")]
pub struct Tier {
    min: u32,
    max: u32,
    tag: String,
}

#[derive(Deserialize)]
struct RawTier {
    #[serde(default)]
    min: u32,
    #[serde(default = "unbounded")]
    max: u32,
    #[serde(default)]
    tag: String,
}

fn unbounded() -> u32 {
    u32::MAX
}

impl From<RawTier> for Tier {
    fn from(raw: RawTier) -> Self {
        Tier::new(raw.min, raw.max, raw.tag)
    }
}

impl Tier {
    /// `max < min` is raised to `min`.
    pub fn new(min: u32, max: u32, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let max = if max < min {
            tracing::warn!(min, max, tag = %tag, "tier max below min, raised to min");
            min
        } else {
            max
        };
        Self { min, max, tag }
    }

    /// Band `[0, u32::MAX]` with no tag; never clamps.
    pub fn unbounded() -> Self {
        Self::new(0, u32::MAX, "")
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Clamp `quantity` into the band, annotating `reason` when it moves.
    ///
    /// A quantity already inside the band leaves the reason untouched;
    /// otherwise exactly one of `ClampedMin` / `ClampedMax` is appended,
    /// followed by the tier tag if it has one.
    ///
    /// # Example
    ///
    /// ```
    /// use tradeguard_core::sizing::Tier;
    ///
    /// let tier = Tier::new(1, 3, "DCP");
    /// assert_eq!(tier.clamp(5, "bracket"), (3, "bracket+ClampedMax+DCP".to_string()));
    /// assert_eq!(tier.clamp(2, "bracket"), (2, "bracket".to_string()));
    /// ```
    pub fn clamp(&self, quantity: u32, reason: &str) -> (u32, String) {
        let (quantity, marker) = if quantity < self.min {
            (self.min, "ClampedMin")
        } else if quantity > self.max {
            (self.max, "ClampedMax")
        } else {
            return (quantity, reason.to_string());
        };

        let mut reason = append_tag(reason, marker);
        if !self.tag.is_empty() {
            reason = append_tag(&reason, &self.tag);
        }
        (quantity, reason)
    }
}

fn append_tag(reason: &str, tag: &str) -> String {
    if reason.is_empty() {
        tag.to_string()
    } else {
        format!("{reason}+{tag}")
    }
}

/// One tier per risk mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskTiers {
    pub ecp: Tier,
    pub pcp: Tier,
    pub dcp: Tier,
    pub hr: Tier,
}

impl RiskTiers {
    /// ECP 1..1, PCP 1..2, DCP 1..3, HR 1..1, each tagged with its code.
    pub fn defaults() -> Self {
        Self {
            ecp: Tier::new(1, 1, "ECP"),
            pcp: Tier::new(1, 2, "PCP"),
            dcp: Tier::new(1, 3, "DCP"),
            hr: Tier::new(1, 1, "HR"),
        }
    }

    pub fn for_mode(&self, mode: RiskMode) -> &Tier {
        match mode {
            RiskMode::ExtremeCapitalProtection => &self.ecp,
            RiskMode::ProtectiveCapitalPreservation => &self.pcp,
            RiskMode::DefaultCapitalProtection => &self.dcp,
            RiskMode::HighRisk => &self.hr,
        }
    }
}

impl Default for RiskTiers {
    fn default() -> Self {
        Self::defaults()
    }
}
