//! Value objects for the order domain.

use common::EpochMillis;
use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Prefix of every generated order code.
pub const ORDER_CODE_PREFIX: &str = "LND-";

/// Order code printed on the receipt barcode and used for scan lookup.
///
/// Generated codes are `LND-` followed by the creation time in epoch
/// milliseconds. Codes loaded from storage are kept verbatim, whatever
/// their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderCode(String);

impl OrderCode {
    /// Builds the code for an order issued at `at`.
    pub fn issued_at(at: EpochMillis) -> Self {
        Self(format!("{ORDER_CODE_PREFIX}{}", at.as_millis()))
    }

    /// Wraps an existing code string, e.g. from a scan.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the timestamp embedded in a generated code.
    pub fn timestamp(&self) -> Option<EpochMillis> {
        self.0
            .strip_prefix(ORDER_CODE_PREFIX)
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse::<i64>().ok())
            .map(EpochMillis::new)
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OrderCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for OrderCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Laundry weight as entered at the counter.
///
/// Kept as free-form text so existing records stay byte-identical; use
/// [`Weight::kilograms`] for a numeric reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weight(String);

impl Weight {
    /// Parses counter input. Surrounding whitespace is dropped; empty input
    /// is rejected.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::MissingWeight);
        }
        Ok(Self(text.to_string()))
    }

    /// Returns the weight in kilograms, if the text is numeric.
    ///
    /// Accepts either `.` or `,` as the decimal separator.
    pub fn kilograms(&self) -> Option<f64> {
        self.0
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|kg| kg.is_finite())
    }

    /// Returns the text as entered.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Weight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} kg", self.0)
    }
}

/// Order price in whole rupiah.
///
/// New orders are validated to be non-negative. Records written by earlier
/// releases were never validated, so loading accepts any integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// Creates a price from whole rupiah.
    pub fn from_rupiah(rupiah: i64) -> Self {
        Self(rupiah)
    }

    /// Parses counter input as a non-negative whole number.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::MissingPrice);
        }
        match text.parse::<i64>() {
            Ok(rupiah) if rupiah >= 0 => Ok(Self(rupiah)),
            _ => Err(ValidationError::InvalidPrice(text.to_string())),
        }
    }

    /// Returns the amount in whole rupiah.
    pub fn rupiah(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        if self.0 < 0 {
            write!(f, "-Rp{grouped}")
        } else {
            write!(f, "Rp{grouped}")
        }
    }
}

/// A registered customer.
///
/// Immutable once created. Duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    pub address: String,
}

impl Customer {
    /// Creates a customer, trimming and requiring every field.
    pub fn new(
        name: impl AsRef<str>,
        phone: impl AsRef<str>,
        address: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        let required = |value: &str, field: &'static str| {
            let value = value.trim();
            if value.is_empty() {
                Err(ValidationError::MissingCustomerField { field })
            } else {
                Ok(value.to_string())
            }
        };

        Ok(Self {
            name: required(name.as_ref(), "name")?,
            phone: required(phone.as_ref(), "phone")?,
            address: required(address.as_ref(), "address")?,
        })
    }
}
