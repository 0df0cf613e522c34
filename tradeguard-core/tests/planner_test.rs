//! End-to-end entry planning through real collaborators.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tradeguard_core::diagnostics::InMemoryDiagnostics;
use tradeguard_core::domain::{OrderKind, RiskMode, Side};
use tradeguard_core::planner::{EntryPlanner, EntryRequest};
use tradeguard_core::risk::{CapsRule, RiskCaps, RiskChain, RiskSnapshot, SharedSnapshot};
use tradeguard_core::session::{CalendarDay, SessionGate, StaticCalendar};
use tradeguard_core::sizing::{
    BracketedQuantity, FixedQuantity, ModeBaseSizer, RiskTiers, Sizer, SizingChain,
};
use tradeguard_core::trailing::{PercentStop, RatchetAdapter, Trailing, TrailingEngine, TrailingProfile};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 2).unwrap()
}

fn at(h: u32, m: u32) -> NaiveDateTime {
    day().and_hms_opt(h, m, 0).unwrap()
}

fn session() -> SessionGate {
    let cal = StaticCalendar::new().with_day(
        "ES",
        day(),
        CalendarDay {
            settlement: Some("16:00-16:15".into()),
            blackouts: vec!["08:29-08:31".into(), "16:10-16:30".into(), "23:55-00:10".into()],
        },
    );
    SessionGate::new(cal)
}

fn request(now: NaiveDateTime) -> EntryRequest {
    EntryRequest::new(now, "ES", Side::Long, OrderKind::Limit, dec!(4500))
        .with_tick_size(dec!(0.25))
}

// ── Session ──────────────────────────────────────────────────────────

#[test]
fn blackout_rejects_regardless_of_sizing_and_trailing() {
    let risk = RiskChain::new(RiskMode::DefaultCapitalProtection);
    let gate = session();
    let sizers: Vec<Box<dyn Sizer>> = vec![
        Box::new(FixedQuantity::new(1)),
        Box::new(FixedQuantity::new(0)),
        Box::new(ModeBaseSizer),
        Box::new(SizingChain::new(BracketedQuantity::default()).with_tiers(RiskTiers::defaults())),
    ];
    let trailers: Vec<Box<dyn Trailing>> = vec![
        Box::new(TrailingEngine::new(dec!(0.25))),
        Box::new(TrailingEngine::new(dec!(0))),
        Box::new(RatchetAdapter::new(PercentStop::new(dec!(0)))),
    ];

    for sizer in &sizers {
        for trailer in &trailers {
            let planner = EntryPlanner::new(
                RiskMode::DefaultCapitalProtection,
                &risk,
                &gate,
                sizer.as_ref(),
                trailer.as_ref(),
            );
            for now in [at(8, 30), at(23, 58), at(0, 5)] {
                let plan = planner.build(&request(now));
                assert!(!plan.is_accepted());
                assert_eq!(plan.reason(), "session window");
            }
        }
    }
}

#[test]
fn settlement_rejects_with_same_reason() {
    let risk = RiskChain::new(RiskMode::DefaultCapitalProtection);
    let gate = session();
    let sizing = FixedQuantity::new(1);
    let trailing = TrailingEngine::new(dec!(0.25));
    let sink = InMemoryDiagnostics::new(8);
    let planner = EntryPlanner::new(RiskMode::DefaultCapitalProtection, &risk, &gate, &sizing, &trailing)
        .with_sink(&sink);

    let plan = planner.build(&request(at(16, 12)));
    assert_eq!(plan.reason(), "session window");
    assert!(sink
        .snapshot()
        .iter()
        .any(|e| e.message.contains("settlement 16:00-16:15")));
}

#[test]
fn other_days_and_symbols_are_open() {
    let risk = RiskChain::new(RiskMode::DefaultCapitalProtection);
    let gate = session();
    let sizing = FixedQuantity::new(1);
    let trailing = TrailingEngine::new(dec!(0.25));
    let planner = EntryPlanner::new(RiskMode::DefaultCapitalProtection, &risk, &gate, &sizing, &trailing);

    let next_day = NaiveDate::from_ymd_opt(2025, 9, 3).unwrap().and_hms_opt(8, 30, 0).unwrap();
    assert!(planner.build(&request(next_day)).is_accepted());

    let mut nq = request(at(8, 30));
    nq.symbol = "NQ".into();
    assert!(planner.build(&nq).is_accepted());
}

// ── Gate ordering ────────────────────────────────────────────────────

#[test]
fn risk_is_checked_before_session() {
    let snapshot = Arc::new(SharedSnapshot::new(RiskSnapshot {
        account_quantity: 2,
        ..RiskSnapshot::default()
    }));
    let caps = RiskCaps {
        max_contracts: 1,
        ..RiskCaps::default()
    };
    let risk = RiskChain::new(RiskMode::DefaultCapitalProtection).with_rule(CapsRule::new(caps, snapshot));
    let gate = session();
    let sizing = FixedQuantity::new(1);
    let trailing = TrailingEngine::new(dec!(0.25));
    let planner = EntryPlanner::new(RiskMode::DefaultCapitalProtection, &risk, &gate, &sizing, &trailing);

    assert_eq!(planner.build(&request(at(8, 30))).reason(), "MaxContracts");
}

#[test]
fn tiered_sizing_flows_into_both_orders() {
    let risk = RiskChain::new(RiskMode::ProtectiveCapitalPreservation);
    let gate = session();
    let sizing = SizingChain::new(FixedQuantity::new(9)).with_tiers(RiskTiers::defaults());
    let trailing = TrailingEngine::new(dec!(0.25));
    let planner = EntryPlanner::new(RiskMode::ProtectiveCapitalPreservation, &risk, &gate, &sizing, &trailing);

    let req = request(at(10, 0)).with_profile(TrailingProfile::fixed_ticks(dec!(12)));
    let plan = planner.build(&req);
    assert!(plan.is_accepted());
    let (entry, stop) = (plan.entry_order().unwrap(), plan.stop_order().unwrap());
    assert_eq!(entry.quantity, 2);
    assert_eq!(stop.quantity, 2);
    assert_eq!(stop.price, dec!(4497));
    assert!(stop.is_long);
}

#[test]
fn oco_groups_are_unique_per_plan() {
    let risk = RiskChain::new(RiskMode::DefaultCapitalProtection);
    let gate = SessionGate::unrestricted();
    let sizing = FixedQuantity::new(1);
    let trailing = TrailingEngine::new(dec!(0.25));
    let planner = EntryPlanner::new(RiskMode::DefaultCapitalProtection, &risk, &gate, &sizing, &trailing);

    let a = planner.build(&request(at(10, 0)));
    let b = planner.build(&request(at(10, 0)));
    assert_ne!(a.oco_group(), b.oco_group());
    assert!(a.oco_group().chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn unrounded_tick_passes_prices_through() {
    let risk = RiskChain::new(RiskMode::DefaultCapitalProtection);
    let gate = SessionGate::unrestricted();
    let sizing = FixedQuantity::new(1);
    let trailing = TrailingEngine::new(Decimal::ZERO);
    let planner = EntryPlanner::new(RiskMode::DefaultCapitalProtection, &risk, &gate, &sizing, &trailing);

    let req = EntryRequest::new(at(10, 0), "ES", Side::Short, OrderKind::StopLimit, dec!(4500.13))
        .with_tick_size(Decimal::ZERO)
        .with_profile(TrailingProfile::fixed_ticks(dec!(1.07)));
    let plan = planner.build(&req);
    assert_eq!(plan.entry_order().unwrap().price, dec!(4500.13));
    assert_eq!(plan.stop_order().unwrap().price, dec!(4501.20));
}
