use super::tiers::RiskTiers;
use super::{SizeDecision, SizeRule, Sizer};
use crate::domain::{PositionIntent, RiskMode};

/// Rules first, then the fallback; the result is clamped to the tier of
/// the mode the decision was made under.
///
/// The fallback is a required constructor argument, so a chain can always
/// answer.
pub struct SizingChain {
    rules: Vec<Box<dyn SizeRule>>,
    fallback: Box<dyn Sizer>,
    tiers: Option<RiskTiers>,
}

impl SizingChain {
    pub fn new(fallback: impl Sizer + 'static) -> Self {
        Self {
            rules: Vec::new(),
            fallback: Box::new(fallback),
            tiers: None,
        }
    }

    pub fn with_rule(mut self, rule: impl SizeRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn with_tiers(mut self, tiers: RiskTiers) -> Self {
        self.tiers = Some(tiers);
        self
    }

    pub fn tiers(&self) -> Option<&RiskTiers> {
        self.tiers.as_ref()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Unclamped decision: first rule that answers, else the fallback.
    pub fn raw_decide(&self, intent: &PositionIntent, mode: RiskMode) -> SizeDecision {
        self.rules
            .iter()
            .find_map(|rule| {
                let d = rule.try_decide(intent, mode)?;
                tracing::trace!(rule = rule.name(), quantity = d.quantity, "sizing rule decided");
                Some(d)
            })
            .unwrap_or_else(|| self.fallback.decide(intent, mode))
    }
}

impl Sizer for SizingChain {
    fn decide(&self, intent: &PositionIntent, mode: RiskMode) -> SizeDecision {
        let decision = self.raw_decide(intent, mode);
        let Some(tiers) = &self.tiers else {
            return decision;
        };
        let (quantity, reason) = tiers
            .for_mode(decision.mode)
            .clamp(decision.quantity, &decision.reason);
        SizeDecision {
            quantity,
            reason,
            mode: decision.mode,
        }
    }

    fn name(&self) -> &str {
        "SizingChain"
    }
}

impl std::fmt::Debug for SizingChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SizingChain")
            .field("rules", &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>())
            .field("fallback", &self.fallback.name())
            .field("tiers", &self.tiers)
            .finish()
    }
}
