//! Entry planning: one call from "I want to be long ES" to a sized,
//! tick-aligned entry with its protective stop, or a rejection reason.
//!
//! Gates run in a fixed order and the first rejection ends the call:
//!
//! 1. intent: symbol present, side not flat
//! 2. risk rules
//! 3. session: settlement window, then blackouts
//! 4. sizing: quantity must be positive
//! 5. price: limit-style kinds need a positive price
//! 6. stop: must sit on the protective side of the entry
//!
//! The planner performs no I/O and never submits anything; the returned
//! [`EntryPlan`] is a value for the host's order sink.

use crate::diagnostics::{DiagnosticEvent, DiagnosticsSink};
use crate::domain::{
    round_to_tick, EntryPlan, OrderIntent, OrderKind, PositionIntent, RiskMode, Side,
    DEFAULT_TICK_SIZE,
};
use crate::risk::RiskRule;
use crate::session::SessionGate;
use crate::sizing::Sizer;
use crate::trailing::{Trailing, TrailingProfile};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ENTRY_SIGNAL: &str = "entry";
pub const PROTECT_SIGNAL: &str = "protect";
pub const SESSION_WINDOW: &str = "session window";

/// Inputs for one planning call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRequest {
    /// Exchange-local wall-clock time.
    pub now: NaiveDateTime,
    pub symbol: String,
    pub side: Side,
    pub kind: OrderKind,
    /// Limit/stop price for limit-style kinds; reference price otherwise.
    pub price: Decimal,
    #[serde(default)]
    pub profile: TrailingProfile,
    /// Drives both price rounding and the stop distance.
    #[serde(default = "default_tick_size")]
    pub tick_size: Decimal,
}

fn default_tick_size() -> Decimal {
    DEFAULT_TICK_SIZE
}

impl EntryRequest {
    pub fn new(
        now: NaiveDateTime,
        symbol: impl Into<String>,
        side: Side,
        kind: OrderKind,
        price: Decimal,
    ) -> Self {
        Self {
            now,
            symbol: symbol.into(),
            side,
            kind,
            price,
            profile: TrailingProfile::default(),
            tick_size: default_tick_size(),
        }
    }

    pub fn with_profile(mut self, profile: TrailingProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_tick_size(mut self, tick_size: Decimal) -> Self {
        self.tick_size = tick_size;
        self
    }

    pub fn intent(&self) -> PositionIntent {
        PositionIntent::new(self.symbol.clone(), self.side)
    }
}

/// Orchestrates risk, session, sizing and trailing into an [`EntryPlan`].
///
/// Collaborators are borrowed, so a planner is cheap to build per call and
/// safe to use from several threads when they are.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use tradeguard_core::domain::{OrderKind, RiskMode, Side};
/// use tradeguard_core::planner::{EntryPlanner, EntryRequest};
/// use tradeguard_core::risk::RiskChain;
/// use tradeguard_core::session::SessionGate;
/// use tradeguard_core::sizing::FixedQuantity;
/// use tradeguard_core::trailing::TrailingEngine;
///
/// let risk = RiskChain::new(RiskMode::DefaultCapitalProtection);
/// let session = SessionGate::unrestricted();
/// let sizing = FixedQuantity::new(2);
/// let trailing = TrailingEngine::new(Decimal::new(25, 2));
/// let planner = EntryPlanner::new(RiskMode::DefaultCapitalProtection, &risk, &session, &sizing, &trailing);
///
/// let now = NaiveDate::from_ymd_opt(2025, 9, 2).unwrap().and_hms_opt(10, 0, 0).unwrap();
/// let req = EntryRequest::new(now, "ES", Side::Long, OrderKind::Limit, Decimal::new(450010, 2))
///     .with_tick_size(Decimal::new(25, 2));
/// let plan = planner.build(&req);
/// assert!(plan.is_accepted());
/// assert_eq!(plan.entry_order().unwrap().price, Decimal::from(4500));
/// ```
pub struct EntryPlanner<'a> {
    mode: RiskMode,
    risk: &'a dyn RiskRule,
    session: &'a SessionGate,
    sizing: &'a dyn Sizer,
    trailing: &'a dyn Trailing,
    sink: Option<&'a dyn DiagnosticsSink>,
}

impl<'a> EntryPlanner<'a> {
    pub fn new(
        mode: RiskMode,
        risk: &'a dyn RiskRule,
        session: &'a SessionGate,
        sizing: &'a dyn Sizer,
        trailing: &'a dyn Trailing,
    ) -> Self {
        Self {
            mode,
            risk,
            session,
            sizing,
            trailing,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: &'a dyn DiagnosticsSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn build(&self, req: &EntryRequest) -> EntryPlan {
        let plan = self.run_gates(req);
        if plan.is_accepted() {
            self.note("plan", format!("{} accepted oco={}", req.symbol, plan.oco_group()));
        }
        plan
    }

    fn run_gates(&self, req: &EntryRequest) -> EntryPlan {
        // 1. intent
        if req.symbol.is_empty() {
            return self.reject("intent", "symbol missing");
        }
        if req.side.is_flat() {
            return self.reject("intent", "flat intent");
        }
        let intent = req.intent();
        let is_long = req.side.is_long();

        // 2. risk
        if let Err(reason) = self.risk.evaluate_entry(&intent) {
            return self.reject("risk", reason);
        }

        // 3. session
        if let Some(block) = self.session.blocking_window(&req.symbol, req.now) {
            self.note("session", format!("{} blocked by {block} at {}", req.symbol, req.now));
            return self.reject("session", SESSION_WINDOW);
        }

        // 4. sizing
        let size = self.sizing.decide(&intent, self.mode);
        if size.quantity == 0 {
            let reason = if size.reason.is_empty() {
                "size <= 0".to_string()
            } else {
                size.reason
            };
            return self.reject("sizing", reason);
        }
        tracing::debug!(symbol = %req.symbol, quantity = size.quantity, reason = %size.reason, "sized");

        // 5. price
        if req.kind.is_price_based() && req.price <= Decimal::ZERO {
            return self.reject("price", "bad price");
        }
        let entry_price = if req.kind.is_price_based() {
            round_to_tick(req.price, req.tick_size)
        } else {
            req.price
        };

        // 6. stop
        let stop_price = round_to_tick(
            self.trailing.compute_stop_with_tick(
                req.tick_size,
                entry_price,
                entry_price,
                is_long,
                &req.profile,
                Decimal::ZERO,
            ),
            req.tick_size,
        );
        if is_long && stop_price >= entry_price {
            return self.reject("stop", "stop side invalid (long)");
        }
        if !is_long && stop_price <= entry_price {
            return self.reject("stop", "stop side invalid (short)");
        }

        let oco = Uuid::new_v4().simple().to_string();
        let entry = OrderIntent::new(
            req.symbol.clone(),
            is_long,
            size.quantity,
            req.kind,
            entry_price,
            ENTRY_SIGNAL,
            oco.clone(),
        );
        let stop = OrderIntent::new(
            req.symbol.clone(),
            is_long,
            size.quantity,
            OrderKind::StopMarket,
            stop_price,
            PROTECT_SIGNAL,
            oco.clone(),
        );
        tracing::debug!(
            symbol = %req.symbol,
            %entry_price,
            %stop_price,
            quantity = size.quantity,
            %oco,
            "entry planned"
        );
        EntryPlan::accepted(entry, stop, oco)
    }

    fn reject(&self, gate: &str, reason: impl Into<String>) -> EntryPlan {
        let reason = reason.into();
        tracing::debug!(gate, %reason, "entry rejected");
        self.note(gate, reason.clone());
        EntryPlan::rejected(reason)
    }

    fn note(&self, tag: &str, message: String) {
        if let Some(sink) = self.sink {
            sink.capture(DiagnosticEvent::new(tag, message));
        }
    }
}
