use super::RiskRule;
use crate::domain::{LockoutState, PositionIntent, RiskMode};

/// Ordered composite of risk rules.
///
/// - `evaluate_entry`: first rejection wins, later rules are not consulted.
/// - `lockout_state`: `LockedOut` beats `CoolingDown` beats `None`.
/// - `can_trade_now`: every rule must agree.
/// - `record_outcome`: broadcast to every rule, no short-circuit.
pub struct RiskChain {
    mode: RiskMode,
    rules: Vec<Box<dyn RiskRule>>,
}

impl RiskChain {
    pub fn new(mode: RiskMode) -> Self {
        Self {
            mode,
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: impl RiskRule + 'static) -> Self {
        self.push(rule);
        self
    }

    pub fn push(&mut self, rule: impl RiskRule + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn mode(&self) -> RiskMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }
}

impl RiskRule for RiskChain {
    fn evaluate_entry(&self, intent: &PositionIntent) -> Result<(), String> {
        for rule in &self.rules {
            if let Err(reason) = rule.evaluate_entry(intent) {
                tracing::debug!(rule = rule.name(), %reason, symbol = %intent.symbol, "risk rule rejected entry");
                return Err(reason);
            }
        }
        Ok(())
    }

    fn lockout_state(&self) -> LockoutState {
        let mut cooling = false;
        for rule in &self.rules {
            match rule.lockout_state() {
                LockoutState::LockedOut => return LockoutState::LockedOut,
                LockoutState::CoolingDown => cooling = true,
                LockoutState::None => {}
            }
        }
        if cooling {
            LockoutState::CoolingDown
        } else {
            LockoutState::None
        }
    }

    fn can_trade_now(&self) -> bool {
        // Every rule is polled so each can clear its own expired state.
        self.rules
            .iter()
            .fold(true, |ok, rule| rule.can_trade_now() && ok)
    }

    fn record_outcome(&self, win: bool) {
        for rule in &self.rules {
            rule.record_outcome(win);
        }
    }

    fn name(&self) -> &str {
        "chain"
    }
}

impl std::fmt::Debug for RiskChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskChain")
            .field("mode", &self.mode)
            .field("rules", &self.rule_names())
            .finish()
    }
}
