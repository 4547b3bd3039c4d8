use core::str::FromStr;

use serde::{Deserialize, Serialize};

use courier_core::DomainError;

/// Delivery order status lifecycle.
///
/// `Pending` is the only state an order can be created in. The allowed edges
/// are listed in [`OrderStatus::allowed_next`]; every state not listed as
/// having successors is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
    Delivered,
    Returned,
    Completed,
    Lost,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 8] = [
        OrderStatus::Pending,
        OrderStatus::Accepted,
        OrderStatus::Rejected,
        OrderStatus::Cancelled,
        OrderStatus::Delivered,
        OrderStatus::Returned,
        OrderStatus::Completed,
        OrderStatus::Lost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Accepted => "ACCEPTED",
            OrderStatus::Rejected => "REJECTED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Returned => "RETURNED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Lost => "LOST",
        }
    }

    /// Adjacency table of the lifecycle.
    pub fn allowed_next(self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[
                OrderStatus::Accepted,
                OrderStatus::Rejected,
                OrderStatus::Cancelled,
            ],
            OrderStatus::Accepted => &[
                OrderStatus::Cancelled,
                OrderStatus::Delivered,
                OrderStatus::Lost,
            ],
            OrderStatus::Delivered => &[OrderStatus::Returned, OrderStatus::Completed],
            OrderStatus::Rejected
            | OrderStatus::Cancelled
            | OrderStatus::Returned
            | OrderStatus::Completed
            | OrderStatus::Lost => &[],
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }

    /// Whether order fields (detail, package, addresses, driver) may still be edited.
    pub fn allows_field_updates(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Accepted)
    }

    /// Whether the persistence layer may delete an order in this state.
    pub fn allows_deletion(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Cancelled)
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single validation point for external status strings (case-insensitive).
impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| {
                DomainError::validation(
                    "ParseOrderStatus",
                    "status",
                    format!("unknown order status '{s}'"),
                )
            })
    }
}
