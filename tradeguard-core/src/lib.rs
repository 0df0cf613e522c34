//! TradeGuard Core: risk gating and order planning for algorithmic entries.
//!
//! This crate decides whether a proposed trade may proceed, how large it may
//! be, and where its protective stop sits:
//! - Lockout state machine over consecutive losses with timed cooldown
//! - Stateless account-level hard caps (contracts, daily/weekly loss, drawdown)
//! - Composable first-rejection-wins risk chain
//! - Rule-based sizing clamped to per-mode tiers
//! - Non-loosening trailing stops
//! - Time-of-day blackout and settlement gate with midnight wrap
//! - Entry planner that composes all of the above into one plan
//!
//! Order submission, calendar acquisition, and persistence belong to the host.

pub mod clock;
pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod planner;
pub mod risk;
pub mod session;
pub mod sizing;
pub mod stack;
pub mod trailing;

pub use config::{ConfigError, GateConfig};
pub use planner::{EntryPlanner, EntryRequest};
pub use stack::GateStack;
