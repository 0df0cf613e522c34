//! Domain types for the decision core.
//!
//! Pure values: nothing in here holds locks, reads clocks, or logs.

pub mod intent;
pub mod mode;
pub mod order;
pub mod plan;
pub mod price;

pub use intent::{PositionIntent, Side};
pub use mode::{LockoutState, RiskMode};
pub use order::{OrderIntent, OrderKind};
pub use plan::EntryPlan;
pub use price::{round_to_tick, DEFAULT_TICK_SIZE};
