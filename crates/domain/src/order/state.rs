//! Order status state machine.

use serde::{Deserialize, Serialize};

/// The status of a laundry order.
///
/// State transitions:
/// ```text
/// Received ──► Washing ──► Ready ──► PickedUp
/// ```
/// Strictly linear: no branching, no skipping. `PickedUp` is terminal.
///
/// Serialized as the customer-facing label, which is also what persisted
/// data from earlier releases contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order accepted at the counter.
    #[default]
    #[serde(rename = "Pesanan masuk", alias = "Received")]
    Received,

    /// Laundry is being washed.
    #[serde(rename = "Sedang dicuci", alias = "Washing")]
    Washing,

    /// Washing finished, waiting for pickup.
    #[serde(rename = "Selesai dicuci", alias = "Ready")]
    Ready,

    /// Customer collected the laundry (terminal state).
    #[serde(rename = "Sudah diambil", alias = "PickedUp")]
    PickedUp,
}

/// Result of asking the state machine for the next status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The order moves to the contained status.
    To(OrderStatus),
    /// The order is already picked up; nothing changes.
    AlreadyComplete,
}

impl OrderStatus {
    /// All statuses in pipeline order.
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Received,
        OrderStatus::Washing,
        OrderStatus::Ready,
        OrderStatus::PickedUp,
    ];

    /// Computes the next step in the pipeline.
    pub fn next(&self) -> Transition {
        match self {
            OrderStatus::Received => Transition::To(OrderStatus::Washing),
            OrderStatus::Washing => Transition::To(OrderStatus::Ready),
            OrderStatus::Ready => Transition::To(OrderStatus::PickedUp),
            OrderStatus::PickedUp => Transition::AlreadyComplete,
        }
    }

    /// Returns true if this is the terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::PickedUp)
    }

    /// Returns the customer-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Received => "Pesanan masuk",
            OrderStatus::Washing => "Sedang dicuci",
            OrderStatus::Ready => "Selesai dicuci",
            OrderStatus::PickedUp => "Sudah diambil",
        }
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Received => "Received",
            OrderStatus::Washing => "Washing",
            OrderStatus::Ready => "Ready",
            OrderStatus::PickedUp => "PickedUp",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
