//! HTTP route handlers.

pub mod customers;
pub mod health;
pub mod license;
pub mod metrics;
pub mod orders;
pub mod remote;
