use serde::{Deserialize, Serialize};

/// Direction of a desired position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// No position. Never tradeable.
    Flat,
    Long,
    Short,
}

impl Side {
    pub fn is_long(self) -> bool {
        self == Side::Long
    }

    pub fn is_flat(self) -> bool {
        self == Side::Flat
    }
}

/// Intent to hold a position in a given direction for a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionIntent {
    pub symbol: String,
    pub side: Side,
}

impl PositionIntent {
    pub fn new(symbol: impl Into<String>, side: Side) -> Self {
        Self {
            symbol: symbol.into(),
            side,
        }
    }

    pub fn long(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Side::Long)
    }

    pub fn short(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Side::Short)
    }

    /// Non-empty symbol and a directional side.
    pub fn is_tradeable(&self) -> bool {
        !self.symbol.is_empty() && !self.side.is_flat()
    }
}
