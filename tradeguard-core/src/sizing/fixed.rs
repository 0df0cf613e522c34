//! Fixed and per-mode quantity sizers, and the per-symbol override rule.

use super::{SizeDecision, SizeRule, Sizer};
use crate::domain::{PositionIntent, RiskMode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Always trade the same quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedQuantity {
    quantity: u32,
}

impl FixedQuantity {
    pub fn new(quantity: u32) -> Self {
        Self { quantity }
    }
}

impl Sizer for FixedQuantity {
    fn decide(&self, _intent: &PositionIntent, mode: RiskMode) -> SizeDecision {
        SizeDecision::new(self.quantity, "FixedQuantity", mode)
    }

    fn name(&self) -> &str {
        "FixedQuantity"
    }
}

/// One quantity per risk mode. The reason is the configured tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BracketedQuantity {
    pub ecp: u32,
    pub pcp: u32,
    pub dcp: u32,
    pub hr: u32,
    pub tag: String,
}

impl BracketedQuantity {
    pub fn new(ecp: u32, pcp: u32, dcp: u32, hr: u32) -> Self {
        Self {
            ecp,
            pcp,
            dcp,
            hr,
            tag: "BracketedQuantity".into(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn quantity_for(&self, mode: RiskMode) -> u32 {
        match mode {
            RiskMode::ExtremeCapitalProtection => self.ecp,
            RiskMode::ProtectiveCapitalPreservation => self.pcp,
            RiskMode::DefaultCapitalProtection => self.dcp,
            RiskMode::HighRisk => self.hr,
        }
    }
}

impl Default for BracketedQuantity {
    /// 1 / 2 / 3 / 1 tagged `bracket`.
    fn default() -> Self {
        Self::new(1, 2, 3, 1).with_tag("bracket")
    }
}

impl Sizer for BracketedQuantity {
    fn decide(&self, _intent: &PositionIntent, mode: RiskMode) -> SizeDecision {
        SizeDecision::new(self.quantity_for(mode), self.tag.clone(), mode)
    }

    fn name(&self) -> &str {
        "BracketedQuantity"
    }
}

/// Base quantity by mode (ECP 1, PCP 1, DCP 2, HR 3), zero for an
/// untradeable intent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeBaseSizer;

impl Sizer for ModeBaseSizer {
    fn decide(&self, intent: &PositionIntent, mode: RiskMode) -> SizeDecision {
        if intent.symbol.is_empty() {
            return SizeDecision::zero("symbol missing", mode);
        }
        if intent.side.is_flat() {
            return SizeDecision::zero("flat intent", mode);
        }
        let quantity = match mode {
            RiskMode::ExtremeCapitalProtection | RiskMode::ProtectiveCapitalPreservation => 1,
            RiskMode::DefaultCapitalProtection => 2,
            RiskMode::HighRisk => 3,
        };
        SizeDecision::new(quantity, format!("{} base {}", mode.code(), quantity), mode)
    }

    fn name(&self) -> &str {
        "ModeBase"
    }
}

/// Per-symbol quantity override. Declines for symbols it does not know.
#[derive(Debug, Clone, Default)]
pub struct SymbolQuantityRule {
    quantities: HashMap<String, u32>,
}

impl SymbolQuantityRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, symbol: &str, quantity: u32) -> Self {
        self.insert(symbol, quantity);
        self
    }

    pub fn insert(&mut self, symbol: &str, quantity: u32) {
        self.quantities
            .insert(symbol.trim().to_ascii_uppercase(), quantity);
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }
}

impl FromIterator<(String, u32)> for SymbolQuantityRule {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        let mut rule = Self::new();
        for (symbol, quantity) in iter {
            rule.insert(&symbol, quantity);
        }
        rule
    }
}

impl SizeRule for SymbolQuantityRule {
    fn try_decide(&self, intent: &PositionIntent, mode: RiskMode) -> Option<SizeDecision> {
        let key = intent.symbol.trim().to_ascii_uppercase();
        let quantity = *self.quantities.get(&key)?;
        Some(SizeDecision::new(quantity, format!("symbol {key}"), mode))
    }

    fn name(&self) -> &str {
        "SymbolQuantity"
    }
}
