//! Laundry orders and related types.

mod aggregate;
mod commands;
mod state;
mod value_objects;

pub use aggregate::Order;
pub use commands::{CustomerSelection, NewCustomerRequest, NewOrderRequest};
pub use state::{OrderStatus, Transition};
pub use value_objects::{Customer, ORDER_CODE_PREFIX, OrderCode, Price, Weight};

use thiserror::Error;

/// Errors from validating order and customer input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Weight is required.
    #[error("Weight is required")]
    MissingWeight,

    /// Price is required.
    #[error("Price is required")]
    MissingPrice,

    /// Price is not a non-negative whole number.
    #[error("Invalid price: {0:?} (must be a whole number of at least 0)")]
    InvalidPrice(String),

    /// A new customer is missing a field.
    #[error("Customer {field} is required")]
    MissingCustomerField { field: &'static str },

    /// An existing customer was requested but none are registered.
    #[error("No customers registered yet, add a new customer")]
    NoCustomers,

    /// The referenced customer does not exist.
    #[error("Customer #{index} does not exist")]
    UnknownCustomer { index: usize },
}
