//! One-call wiring of every component from a [`GateConfig`].

use crate::clock::Clock;
use crate::config::{ConfigError, GateConfig};
use crate::diagnostics::{DiagnosticEvent, DiagnosticsFilter, InMemoryDiagnostics};
use crate::domain::{EntryPlan, OrderKind, Side};
use crate::planner::{EntryPlanner, EntryRequest};
use crate::risk::lockout::MAX_COOLDOWN_MINUTES;
use crate::risk::{
    CapsRule, LockoutEngine, LossStreakGuard, RiskChain, RiskRule, RiskSnapshot, RiskSwitch,
    SharedSnapshot,
};
use crate::session::{CalendarProvider, SessionGate};
use crate::sizing::{SizingChain, SymbolQuantityRule};
use crate::trailing::TrailingEngine;
use chrono::Duration;
use rust_decimal::Decimal;
use std::sync::Arc;

/// A complete, configured gate.
///
/// Risk: operator switch around a chain of lockout engine, caps rule and an
/// optional loss streak guard. Sizing: per-symbol overrides, then the
/// bracket fallback, clamped to the configured tiers.
pub struct GateStack {
    config: GateConfig,
    lockout: Arc<LockoutEngine>,
    snapshot: Arc<SharedSnapshot>,
    risk: RiskSwitch<RiskChain>,
    sizing: SizingChain,
    trailing: TrailingEngine,
    session: SessionGate,
    diagnostics: Option<DiagnosticsFilter<Arc<InMemoryDiagnostics>>>,
}

impl GateStack {
    pub fn from_config(
        mut config: GateConfig,
        calendar: Arc<dyn CalendarProvider>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mode = config.risk_mode;

        let lockout = Arc::new(LockoutEngine::new(
            mode,
            config.lockout.loss_streak_threshold,
            Duration::try_minutes(config.lockout.cooldown_minutes)
                .unwrap_or_else(|| Duration::minutes(MAX_COOLDOWN_MINUTES)),
            clock.clone(),
        ));
        let snapshot = Arc::new(SharedSnapshot::default());

        let mut chain = RiskChain::new(mode)
            .with_rule(lockout.clone())
            .with_rule(CapsRule::new(config.caps, snapshot.clone()));
        if let Some(max_losses) = config.lockout.max_consecutive_losses {
            chain.push(LossStreakGuard::new(max_losses));
        }

        let mut sizing = SizingChain::new(config.sizing.bracket.clone()).with_tiers(config.tiers.clone());
        if !config.sizing.symbol_quantities.is_empty() {
            let rule: SymbolQuantityRule = config
                .sizing
                .symbol_quantities
                .iter()
                .map(|(sym, qty)| (sym.clone(), *qty))
                .collect();
            sizing = sizing.with_rule(rule);
        }

        let session = SessionGate::with_shared_calendar(calendar)
            .with_timezone(config.tz()?)
            .with_clock(clock);

        let diagnostics = config.diagnostics.enabled.then(|| {
            DiagnosticsFilter::new(Arc::new(InMemoryDiagnostics::new(config.diagnostics.capacity)))
                .allow_tags(&config.diagnostics.tags)
        });

        tracing::info!(
            mode = %mode,
            rules = ?chain.rule_names(),
            build = config.build_stamp.as_deref().unwrap_or("unknown"),
            "gate stack ready"
        );

        Ok(Self {
            trailing: TrailingEngine::new(config.tick_size),
            lockout,
            snapshot,
            risk: RiskSwitch::new(chain),
            sizing,
            session,
            diagnostics,
            config,
        })
    }

    /// Request at the current exchange-local time with the configured
    /// trailing profile and tick size.
    pub fn request(&self, symbol: &str, side: Side, kind: OrderKind, price: Decimal) -> EntryRequest {
        EntryRequest::new(self.session.local_now(), symbol, side, kind, price)
            .with_profile(self.config.trailing)
            .with_tick_size(self.config.tick_size)
    }

    pub fn plan(&self, symbol: &str, side: Side, kind: OrderKind, price: Decimal) -> EntryPlan {
        self.plan_request(&self.request(symbol, side, kind, price))
    }

    pub fn plan_request(&self, req: &EntryRequest) -> EntryPlan {
        let planner = EntryPlanner::new(
            self.config.risk_mode,
            &self.risk,
            &self.session,
            &self.sizing,
            &self.trailing,
        );
        match &self.diagnostics {
            Some(sink) => planner.with_sink(sink).build(req),
            None => planner.build(req),
        }
    }

    pub fn record_outcome(&self, win: bool) {
        self.risk.record_outcome(win);
    }

    pub fn update_snapshot(&self, snapshot: RiskSnapshot) {
        self.snapshot.set(snapshot);
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn lockout(&self) -> &LockoutEngine {
        &self.lockout
    }

    pub fn risk(&self) -> &RiskSwitch<RiskChain> {
        &self.risk
    }

    pub fn session(&self) -> &SessionGate {
        &self.session
    }

    pub fn sizing(&self) -> &SizingChain {
        &self.sizing
    }

    pub fn trailing(&self) -> &TrailingEngine {
        &self.trailing
    }

    /// Captured diagnostic events, oldest first. Empty when disabled.
    pub fn diagnostics(&self) -> Vec<DiagnosticEvent> {
        self.diagnostics
            .as_ref()
            .map(|d| d.inner().snapshot())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for GateStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateStack")
            .field("mode", &self.config.risk_mode)
            .field("lockout", &self.lockout)
            .field("sizing", &self.sizing)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
