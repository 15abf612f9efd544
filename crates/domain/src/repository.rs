//! Order repository: the single writer over customers and orders.

use std::sync::Arc;

use chrono::{FixedOffset, Offset, Utc};
use common::{Clock, EpochMillis, SystemClock};
use serde::Serialize;
use storage::{KeyValueStore, PersistenceStore, Snapshot};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::error::{DomainError, Result};
use crate::license::LicenseEngine;
use crate::order::{
    Customer, CustomerSelection, NewOrderRequest, Order, OrderCode, OrderStatus, Transition,
    ValidationError,
};
use crate::ports::{Disconnected, NotificationError, OrderNotifier, RecordMirror, SyncError};

/// Remote table receiving new customers.
pub const REMOTE_TABLE_CUSTOMERS: &str = "customers";

/// Remote table receiving new orders.
pub const REMOTE_TABLE_ORDERS: &str = "orders";

/// Remote table receiving one row per status change.
pub const REMOTE_TABLE_STATUS_UPDATES: &str = "order_status_updates";

/// Display format of [`Order::created_at`].
pub const CREATED_AT_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Default display offset for timestamps (UTC+7).
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 7 * 60;

type RepositorySnapshot = Snapshot<Customer, Order>;

/// A newly created order and its background mirror task.
#[derive(Debug)]
pub struct CreatedOrder {
    pub order: Order,

    /// The customer registered by this request, if any.
    pub new_customer: Option<Customer>,

    /// Remote mirroring of the new records. May be awaited or dropped.
    pub mirror: JoinHandle<std::result::Result<(), SyncError>>,
}

/// Background tasks started by a status change.
#[derive(Debug)]
pub struct Dispatch {
    /// Customer notification. May be awaited or dropped.
    pub notification: JoinHandle<std::result::Result<(), NotificationError>>,

    /// Remote mirroring of the status change. May be awaited or dropped.
    pub mirror: JoinHandle<std::result::Result<(), SyncError>>,
}

/// Result of advancing an order.
#[derive(Debug)]
pub enum AdvanceOutcome {
    /// The order moved forward and the change is saved.
    Advanced {
        order: Order,
        previous: OrderStatus,
        dispatch: Dispatch,
    },

    /// The order was already picked up. Nothing was saved or sent.
    AlreadyComplete(Order),
}

impl AdvanceOutcome {
    /// Returns the order as it stands after the call.
    pub fn order(&self) -> &Order {
        match self {
            AdvanceOutcome::Advanced { order, .. } => order,
            AdvanceOutcome::AlreadyComplete(order) => order,
        }
    }
}

/// Builder for [`OrderRepository`].
pub struct RepositoryBuilder<S: KeyValueStore + Clone> {
    store: S,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn OrderNotifier>,
    mirror: Arc<dyn RecordMirror>,
    utc_offset_minutes: i32,
}

impl<S: KeyValueStore + Clone> RepositoryBuilder<S> {
    fn new(store: S) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            notifier: Arc::new(Disconnected),
            mirror: Arc::new(Disconnected),
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
        }
    }

    /// Sets the time source.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the customer notifier.
    pub fn notifier(mut self, notifier: Arc<dyn OrderNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Sets the remote mirror.
    pub fn mirror(mut self, mirror: Arc<dyn RecordMirror>) -> Self {
        self.mirror = mirror;
        self
    }

    /// Sets the UTC offset used to render `createdAt`.
    pub fn utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// Loads the persisted snapshot and returns the repository.
    pub async fn open(self) -> OrderRepository<S> {
        let persistence = PersistenceStore::new(self.store);
        let state: RepositorySnapshot = persistence.load().await;
        let last_code_at = state
            .orders
            .iter()
            .filter_map(|o| o.code.timestamp())
            .max();

        let display_offset = self
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                tracing::warn!(
                    minutes = self.utc_offset_minutes,
                    "display offset out of range, using UTC"
                );
                Utc.fix()
            });

        tracing::info!(
            customers = state.customers.len(),
            orders = state.orders.len(),
            "order repository opened"
        );

        OrderRepository {
            license: LicenseEngine::new(persistence.clone(), self.clock.clone()),
            persistence,
            clock: self.clock,
            notifier: self.notifier,
            mirror: self.mirror,
            display_offset,
            state,
            last_code_at,
        }
    }
}

/// In-memory customers and orders, kept in step with local storage.
///
/// Mutations need `&mut self`: the host serializes calls. Every mutation is
/// license-checked and validated first, then saved, and only then applied
/// in memory, so a failed save leaves the repository unchanged.
/// Notification and remote mirroring run afterwards on spawned tasks.
pub struct OrderRepository<S: KeyValueStore + Clone> {
    persistence: PersistenceStore<S>,
    license: LicenseEngine<S>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn OrderNotifier>,
    mirror: Arc<dyn RecordMirror>,
    display_offset: FixedOffset,
    state: RepositorySnapshot,
    last_code_at: Option<EpochMillis>,
}

impl<S: KeyValueStore + Clone> OrderRepository<S> {
    /// Starts building a repository over `store`.
    pub fn builder(store: S) -> RepositoryBuilder<S> {
        RepositoryBuilder::new(store)
    }

    /// Returns the license engine sharing this repository's storage.
    pub fn license(&self) -> &LicenseEngine<S> {
        &self.license
    }

    /// Returns the remote mirror, for read-side fetches.
    pub fn mirror(&self) -> Arc<dyn RecordMirror> {
        self.mirror.clone()
    }

    /// Returns all orders, newest first.
    pub fn orders(&self) -> &[Order] {
        &self.state.orders
    }

    /// Returns all registered customers in registration order.
    pub fn customers(&self) -> &[Customer] {
        &self.state.customers
    }

    /// Looks up an order by its code.
    pub fn find_by_code(&self, code: &str) -> Result<&Order> {
        self.state
            .orders
            .iter()
            .find(|o| o.code.as_str() == code)
            .ok_or_else(|| DomainError::NotFound {
                code: code.to_string(),
            })
    }

    /// Creates an order and places it first in the list.
    ///
    /// Requires an active license. The new order (and customer, if one is
    /// registered) is saved before this returns; mirroring happens in the
    /// background.
    #[tracing::instrument(skip(self, request))]
    pub async fn create_order(&mut self, request: NewOrderRequest) -> Result<CreatedOrder> {
        self.ensure_writable().await?;

        let (weight, price) = request.validate_amounts()?;
        let (customer, new_customer) = match &request.customer {
            CustomerSelection::New(fields) => {
                let customer = fields.validate()?;
                (customer.clone(), Some(customer))
            }
            CustomerSelection::Existing { index } => {
                if self.state.customers.is_empty() {
                    return Err(ValidationError::NoCustomers.into());
                }
                let customer = self
                    .state
                    .customers
                    .get(*index)
                    .cloned()
                    .ok_or(ValidationError::UnknownCustomer { index: *index })?;
                (customer, None)
            }
        };

        let now = self.clock.now();
        let code_at = self.next_code_instant(now);
        let order = Order::receive(
            OrderCode::issued_at(code_at),
            &customer,
            weight,
            price,
            now.format_in(self.display_offset, CREATED_AT_FORMAT),
        );

        let mut next = self.state.clone();
        if let Some(customer) = &new_customer {
            next.customers.push(customer.clone());
        }
        next.orders.insert(0, order.clone());
        self.commit(next).await?;
        self.last_code_at = Some(code_at);

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(
            code = %order.code,
            price = %order.price,
            new_customer = new_customer.is_some(),
            "order created"
        );

        let mut records = Vec::with_capacity(2);
        if let Some(customer) = &new_customer {
            records.push((REMOTE_TABLE_CUSTOMERS, encode(customer)));
        }
        records.push((REMOTE_TABLE_ORDERS, encode(&order)));
        let mirror = spawn_mirror(self.mirror.clone(), records);

        Ok(CreatedOrder {
            order,
            new_customer,
            mirror,
        })
    }

    /// Advances the order with `code` to its next status.
    ///
    /// This is the scan flow: lookup first, then license. An unknown code
    /// is [`DomainError::NotFound`] even on a read-only install. A
    /// picked-up order is reported as [`AdvanceOutcome::AlreadyComplete`]
    /// without saving or notifying.
    #[tracing::instrument(skip(self))]
    pub async fn advance_by_code(&mut self, code: &str) -> Result<AdvanceOutcome> {
        let current = self.find_by_code(code)?.clone();
        self.ensure_writable().await?;

        if current.is_complete() {
            tracing::info!(code, "order already picked up");
            return Ok(AdvanceOutcome::AlreadyComplete(current));
        }
        let previous = current.status;

        let mut next = self.state.clone();
        let Some(order) = next.orders.iter_mut().find(|o| o.code.as_str() == code) else {
            return Err(DomainError::NotFound {
                code: code.to_string(),
            });
        };
        if let Transition::AlreadyComplete = order.advance() {
            return Ok(AdvanceOutcome::AlreadyComplete(order.clone()));
        }
        let order = order.clone();
        self.commit(next).await?;

        metrics::counter!("order_status_advanced_total", "status" => order.status.as_str())
            .increment(1);
        tracing::info!(
            code = %order.code,
            from = %previous,
            to = %order.status,
            "order status advanced"
        );

        let status_update = serde_json::json!({
            "code": order.code,
            "status": order.status,
            "updatedAt": self.clock.now(),
        });
        let dispatch = Dispatch {
            notification: spawn_notification(self.notifier.clone(), order.clone()),
            mirror: spawn_mirror(
                self.mirror.clone(),
                vec![(REMOTE_TABLE_STATUS_UPDATES, Ok(status_update))],
            ),
        };

        Ok(AdvanceOutcome::Advanced {
            order,
            previous,
            dispatch,
        })
    }

    /// Advances `order` to its next status. See [`Self::advance_by_code`].
    pub async fn advance(&mut self, order: &Order) -> Result<AdvanceOutcome> {
        self.advance_by_code(order.code.as_str()).await
    }

    async fn ensure_writable(&self) -> Result<()> {
        let status = self.license.status().await;
        if status.can_write() {
            return Ok(());
        }
        metrics::counter!("write_denied_total").increment(1);
        tracing::info!(%status, "write denied, license is read-only");
        Err(DomainError::WriteDenied { status })
    }

    /// Saves `next` and makes it the in-memory state.
    async fn commit(&mut self, next: RepositorySnapshot) -> Result<()> {
        self.persistence.save(&next).await?;
        self.state = next;
        Ok(())
    }

    /// Picks the instant encoded in the next order code.
    ///
    /// Codes are the creation time in milliseconds. If the clock has not
    /// moved past the newest existing code (two orders in one millisecond,
    /// or the clock stepped back), the code is bumped one millisecond past
    /// it so codes stay unique and increasing.
    fn next_code_instant(&self, now: EpochMillis) -> EpochMillis {
        match self.last_code_at {
            Some(last) if now <= last => {
                let bumped = last.plus_millis(1);
                tracing::warn!(
                    %now,
                    code_at = %bumped,
                    "clock has not advanced past the newest order code, bumping code timestamp"
                );
                bumped
            }
            _ => now,
        }
    }
}

fn encode<T: Serialize>(value: &T) -> std::result::Result<serde_json::Value, SyncError> {
    serde_json::to_value(value).map_err(|e| SyncError::Encode(e.to_string()))
}

fn spawn_notification(
    notifier: Arc<dyn OrderNotifier>,
    order: Order,
) -> JoinHandle<std::result::Result<(), NotificationError>> {
    let span = tracing::info_span!("notify_customer", code = %order.code);
    tokio::spawn(
        async move {
            let result = notifier.notify(&order).await;
            match &result {
                Ok(()) => {
                    metrics::counter!("notifications_total", "outcome" => "delivered").increment(1);
                    tracing::info!(status = %order.status, "customer notified");
                }
                Err(NotificationError::NotConfigured) => {
                    metrics::counter!("notifications_total", "outcome" => "not_configured")
                        .increment(1);
                    tracing::warn!("customer notification skipped, webhook not configured");
                }
                Err(e) => {
                    metrics::counter!("notifications_total", "outcome" => "failed").increment(1);
                    tracing::warn!(error = %e, "customer notification failed");
                }
            }
            result
        }
        .instrument(span),
    )
}

fn spawn_mirror(
    mirror: Arc<dyn RecordMirror>,
    records: Vec<(&'static str, std::result::Result<serde_json::Value, SyncError>)>,
) -> JoinHandle<std::result::Result<(), SyncError>> {
    let span = tracing::info_span!("remote_sync", records = records.len());
    tokio::spawn(
        async move {
            let mut first_error = None;
            for (table, record) in records {
                let result = match record {
                    Ok(record) => mirror.post(table, record).await,
                    Err(e) => Err(e),
                };
                match result {
                    Ok(()) => {
                        metrics::counter!("remote_sync_total", "outcome" => "ok").increment(1);
                        tracing::debug!(table, "record mirrored");
                    }
                    Err(e) => {
                        metrics::counter!("remote_sync_total", "outcome" => "failed").increment(1);
                        tracing::warn!(table, error = %e, "remote sync failed");
                        first_error.get_or_insert(e);
                    }
                }
            }
            first_error.map_or(Ok(()), Err)
        }
        .instrument(span),
    )
}
