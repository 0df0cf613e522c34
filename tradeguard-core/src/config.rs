//! TOML configuration for a full gate stack.
//!
//! Every section has defaults, so an empty file is a valid (conservative)
//! configuration:
//!
//! ```toml
//! risk_mode = "DCP"
//! tick_size = 0.25
//! timezone = "America/New_York"
//!
//! [lockout]
//! loss_streak_threshold = 2
//! cooldown_minutes = 15
//!
//! [caps]
//! max_contracts = 3
//! daily_loss_limit = 500
//!
//! [sizing.symbol_quantities]
//! CL = 1
//! ```

use crate::domain::{RiskMode, DEFAULT_TICK_SIZE};
use crate::risk::lockout::{DEFAULT_COOLDOWN_MINUTES, MAX_COOLDOWN_MINUTES};
use crate::risk::RiskCaps;
use crate::sizing::{BracketedQuantity, RiskTiers};
use crate::trailing::TrailingProfile;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown timezone {0:?}")]
    UnknownTimezone(String),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub risk_mode: RiskMode,
    pub tick_size: Decimal,
    /// IANA timezone of the exchange calendar.
    pub timezone: String,
    /// Explicit build identifier reported by the host.
    pub build_stamp: Option<String>,
    pub lockout: LockoutConfig,
    pub caps: RiskCaps,
    pub tiers: RiskTiers,
    pub sizing: SizingConfig,
    pub trailing: TrailingProfile,
    pub diagnostics: DiagnosticsConfig,
    pub logging: LoggingConfig,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            risk_mode: RiskMode::default(),
            tick_size: DEFAULT_TICK_SIZE,
            timezone: "America/New_York".into(),
            build_stamp: None,
            lockout: LockoutConfig::default(),
            caps: RiskCaps::default(),
            tiers: RiskTiers::defaults(),
            sizing: SizingConfig::default(),
            trailing: TrailingProfile::default(),
            diagnostics: DiagnosticsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockoutConfig {
    pub loss_streak_threshold: u32,
    pub cooldown_minutes: i64,
    /// Adds a count-only loss streak guard when set.
    pub max_consecutive_losses: Option<u32>,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            loss_streak_threshold: 2,
            cooldown_minutes: 15,
            max_consecutive_losses: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    /// Fallback quantity per mode.
    pub bracket: BracketedQuantity,
    /// Per-symbol overrides, consulted before the fallback.
    pub symbol_quantities: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub enabled: bool,
    pub capacity: usize,
    /// Tag allowlist; empty captures everything.
    pub tags: Vec<String>,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: crate::diagnostics::DEFAULT_CAPACITY,
            tags: Vec::new(),
        }
    }
}

/// Read by the binary when it installs its subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// `pretty` or `json`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

impl GateConfig {
    /// Parse and validate.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let mut cfg: GateConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::UnknownTimezone(self.timezone.clone()))
    }

    /// Reject what cannot be repaired; repair the rest with a warning.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.tz()?;

        let limits = [
            ("caps.daily_loss_limit", self.caps.daily_loss_limit),
            ("caps.weekly_loss_limit", self.caps.weekly_loss_limit),
            ("caps.trailing_drawdown", self.caps.trailing_drawdown),
        ];
        for (field, value) in limits {
            if value < Decimal::ZERO {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is negative; use 0 for uncapped"),
                });
            }
        }

        if self.trailing.param1 < Decimal::ZERO {
            return Err(ConfigError::Invalid {
                field: "trailing.param1",
                reason: format!("{} is negative", self.trailing.param1),
            });
        }

        if self.tick_size <= Decimal::ZERO {
            tracing::warn!(tick_size = %self.tick_size, "non-positive tick size disables price rounding");
        }
        if self.lockout.loss_streak_threshold == 0 {
            tracing::warn!("lockout.loss_streak_threshold 0 raised to 1");
            self.lockout.loss_streak_threshold = 1;
        }
        if self.lockout.cooldown_minutes <= 0 {
            tracing::warn!(
                cooldown_minutes = self.lockout.cooldown_minutes,
                "lockout.cooldown_minutes replaced with 15"
            );
            self.lockout.cooldown_minutes = DEFAULT_COOLDOWN_MINUTES;
        } else if self.lockout.cooldown_minutes > MAX_COOLDOWN_MINUTES {
            tracing::warn!(
                cooldown_minutes = self.lockout.cooldown_minutes,
                max = MAX_COOLDOWN_MINUTES,
                "lockout.cooldown_minutes capped at one week"
            );
            self.lockout.cooldown_minutes = MAX_COOLDOWN_MINUTES;
        }
        if self.diagnostics.capacity == 0 {
            tracing::warn!("diagnostics.capacity 0 raised to 1");
            self.diagnostics.capacity = 1;
        }
        Ok(())
    }
}
