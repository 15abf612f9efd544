//! Order creation requests.

use serde::{Deserialize, Serialize};

use super::{Customer, Price, ValidationError, Weight};

/// Fields for registering a new customer alongside an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomerRequest {
    pub name: String,
    pub phone: String,
    pub address: String,
}

impl NewCustomerRequest {
    /// Creates a new request.
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            address: address.into(),
        }
    }

    /// Validates into a [`Customer`].
    pub fn validate(&self) -> Result<Customer, ValidationError> {
        Customer::new(&self.name, &self.phone, &self.address)
    }
}

/// Who the order is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CustomerSelection {
    /// Register a new customer and use it.
    New(NewCustomerRequest),
    /// Use the customer at this position in the customer list.
    Existing { index: usize },
}

/// Request to create an order, as collected by the input surface.
///
/// Weight and price arrive as raw text; validation happens in the
/// repository before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderRequest {
    pub customer: CustomerSelection,
    pub weight_kg: String,
    pub price: String,
}

impl NewOrderRequest {
    /// Creates a request for a brand-new customer.
    pub fn for_new_customer(
        customer: NewCustomerRequest,
        weight_kg: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            customer: CustomerSelection::New(customer),
            weight_kg: weight_kg.into(),
            price: price.into(),
        }
    }

    /// Creates a request for an already registered customer.
    pub fn for_existing_customer(
        index: usize,
        weight_kg: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            customer: CustomerSelection::Existing { index },
            weight_kg: weight_kg.into(),
            price: price.into(),
        }
    }

    /// Validates weight and price.
    ///
    /// Emptiness of either field is reported before the price format, the
    /// same order the counter form checks them in.
    pub fn validate_amounts(&self) -> Result<(Weight, Price), ValidationError> {
        if self.weight_kg.trim().is_empty() {
            return Err(ValidationError::MissingWeight);
        }
        if self.price.trim().is_empty() {
            return Err(ValidationError::MissingPrice);
        }
        Ok((Weight::parse(&self.weight_kg)?, Price::parse(&self.price)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_amounts() {
        let req = NewOrderRequest::for_existing_customer(0, "5", "25000");
        let (weight, price) = req.validate_amounts().unwrap();
        assert_eq!(weight.as_str(), "5");
        assert_eq!(price.rupiah(), 25000);
    }

    #[test]
    fn test_missing_weight_reported_before_bad_price() {
        let req = NewOrderRequest::for_existing_customer(0, "", "abc");
        assert_eq!(
            req.validate_amounts(),
            Err(ValidationError::MissingWeight)
        );
    }

    #[test]
    fn test_selection_json_shape() {
        let req = NewOrderRequest::for_new_customer(
            NewCustomerRequest::new("Budi", "0812", "Jl. Mawar 1"),
            "3",
            "15000",
        );
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["customer"]["kind"], "new");
        assert_eq!(json["customer"]["name"], "Budi");

        let existing: CustomerSelection =
            serde_json::from_value(serde_json::json!({"kind": "existing", "index": 2})).unwrap();
        assert_eq!(existing, CustomerSelection::Existing { index: 2 });
    }
}
