//! Domain layer for the laundry order tracker.
//!
//! This crate provides:
//! - the license engine (active, grace and expired windows)
//! - the order model and its linear status state machine
//! - outbound ports for customer notification and remote mirroring
//! - [`OrderRepository`], which ties them to local persistence

pub mod error;
pub mod license;
pub mod order;
pub mod ports;
pub mod repository;

pub use error::DomainError;
pub use license::{
    GRACE_DAYS, LicenseEngine, LicenseError, LicensePlan, LicenseStatus, LicenseSummary,
    LicenseWindow,
};
pub use order::{
    Customer, CustomerSelection, NewCustomerRequest, NewOrderRequest, Order, OrderCode,
    OrderStatus, Price, Transition, ValidationError, Weight,
};
pub use ports::{
    Disconnected, NotificationError, OrderNotifier, RecordMirror, RecordingMirror,
    RecordingNotifier, SyncError,
};
pub use repository::{
    AdvanceOutcome, CREATED_AT_FORMAT, CreatedOrder, DEFAULT_UTC_OFFSET_MINUTES, Dispatch,
    OrderRepository, REMOTE_TABLE_CUSTOMERS, REMOTE_TABLE_ORDERS, REMOTE_TABLE_STATUS_UPDATES,
    RepositoryBuilder,
};
