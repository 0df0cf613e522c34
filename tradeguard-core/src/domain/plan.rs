use crate::domain::OrderIntent;
use serde::{Deserialize, Serialize};

/// Outcome of one planning call: an entry plus its protective stop, or a
/// rejection reason.
///
/// `reason` is empty iff `accepted`. Fields are private so a plan cannot be
/// altered once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPlan {
    accepted: bool,
    reason: String,
    entry_order: Option<OrderIntent>,
    stop_order: Option<OrderIntent>,
    oco_group: String,
}

impl EntryPlan {
    /// A rejected plan. An empty reason is replaced with "rejected" so the
    /// `reason` / `accepted` pairing always holds.
    pub fn rejected(reason: impl Into<String>) -> Self {
        let mut reason = reason.into();
        if reason.is_empty() {
            reason = "rejected".to_string();
        }
        Self {
            accepted: false,
            reason,
            entry_order: None,
            stop_order: None,
            oco_group: String::new(),
        }
    }

    pub fn accepted(entry: OrderIntent, stop: OrderIntent, oco_group: impl Into<String>) -> Self {
        Self {
            accepted: true,
            reason: String::new(),
            entry_order: Some(entry),
            stop_order: Some(stop),
            oco_group: oco_group.into(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn entry_order(&self) -> Option<&OrderIntent> {
        self.entry_order.as_ref()
    }

    pub fn stop_order(&self) -> Option<&OrderIntent> {
        self.stop_order.as_ref()
    }

    pub fn oco_group(&self) -> &str {
        &self.oco_group
    }
}
