//! Order record.

use serde::{Deserialize, Serialize};

use super::{Customer, OrderCode, OrderStatus, Price, Transition, Weight};

/// A laundry order.
///
/// Customer fields are a snapshot taken at creation time. The serialized
/// form uses camelCase keys and is the persisted record format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order code.
    pub code: OrderCode,

    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,

    /// Weight as entered at the counter.
    pub weight_kg: Weight,

    pub price: Price,

    /// Current pipeline status.
    pub status: OrderStatus,

    /// Creation time, already formatted for display (`dd/MM/yyyy HH:mm`).
    pub created_at: String,
}

impl Order {
    /// Creates a freshly received order for `customer`.
    pub fn receive(
        code: OrderCode,
        customer: &Customer,
        weight_kg: Weight,
        price: Price,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            code,
            customer_name: customer.name.clone(),
            customer_phone: customer.phone.clone(),
            customer_address: customer.address.clone(),
            weight_kg,
            price,
            status: OrderStatus::Received,
            created_at: created_at.into(),
        }
    }

    /// Moves the order one step along the pipeline.
    ///
    /// Returns the transition that was applied. A picked-up order is left
    /// unchanged and reports [`Transition::AlreadyComplete`].
    pub fn advance(&mut self) -> Transition {
        let transition = self.status.next();
        if let Transition::To(next) = transition {
            self.status = next;
        }
        transition
    }

    /// Returns true once the customer has collected the laundry.
    pub fn is_complete(&self) -> bool {
        self.status.is_terminal()
    }

    /// Builds the customer notification text for the current status.
    pub fn status_message(&self) -> String {
        format!(
            "Halo {}, status pesanan {} sekarang: {}.",
            self.customer_name,
            self.code,
            self.status.label()
        )
    }
}
