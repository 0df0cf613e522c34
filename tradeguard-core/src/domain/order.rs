//! Order intents handed to the external order sink.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Supported order kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderKind {
    Market,
    Limit,
    StopMarket,
    StopLimit,
}

impl OrderKind {
    /// Kinds whose price is a limit that must be positive and tick-aligned.
    pub fn is_price_based(self) -> bool {
        matches!(self, OrderKind::Limit | OrderKind::StopLimit)
    }
}

/// Pure description of an intended order. No side effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub symbol: String,
    pub is_long: bool,
    pub quantity: u32,
    pub kind: OrderKind,
    pub price: Decimal,
    /// Signal tag, e.g. "entry" or "protect".
    pub signal_tag: String,
    pub oco_group: String,
}

impl OrderIntent {
    pub fn new(
        symbol: impl Into<String>,
        is_long: bool,
        quantity: u32,
        kind: OrderKind,
        price: Decimal,
        signal_tag: impl Into<String>,
        oco_group: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            is_long,
            quantity,
            kind,
            price,
            signal_tag: signal_tag.into(),
            oco_group: oco_group.into(),
        }
    }
}
