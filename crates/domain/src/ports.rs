//! Outbound ports: customer notification and remote mirroring.
//!
//! Both are advisory. The repository calls them from spawned tasks after
//! the local write is durable, and their failures never touch local state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::order::Order;

/// Errors from a notification attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotificationError {
    /// Webhook URL, API key or owner identity is not configured.
    #[error("Notification webhook is not configured")]
    NotConfigured,

    /// The request could not be sent or the connection failed.
    #[error("Notification request failed: {0}")]
    Request(String),

    /// The webhook answered with a non-success status.
    #[error("Notification rejected with HTTP {0}")]
    Status(u16),
}

/// Errors from a remote sync call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// The remote base URL is not configured.
    #[error("Remote store URL is not configured")]
    NotConfigured,

    /// The table name is not a plain identifier.
    #[error("Invalid remote table name: {0:?}")]
    InvalidTable(String),

    /// The request could not be sent or the connection failed.
    #[error("Remote request failed: {0}")]
    Request(String),

    /// The remote store answered with a non-success status.
    #[error("Remote store rejected the request with HTTP {0}")]
    Status(u16),

    /// The response body was not the expected JSON array.
    #[error("Unexpected remote response: {0}")]
    Response(String),

    /// The local record could not be encoded as JSON.
    #[error("Failed to encode record: {0}")]
    Encode(String),
}

/// Sends a status update to the customer.
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    /// Makes exactly one delivery attempt for the order's current status.
    async fn notify(&self, order: &Order) -> Result<(), NotificationError>;
}

/// Best-effort mirror of local writes to a remote REST store.
#[async_trait]
pub trait RecordMirror: Send + Sync {
    /// Inserts one record into `table`.
    async fn post(&self, table: &str, record: serde_json::Value) -> Result<(), SyncError>;

    /// Reads the `select` columns of every record in `table`.
    async fn fetch(&self, table: &str, select: &str) -> Result<Vec<serde_json::Value>, SyncError>;
}

/// Port implementation for when no integration is wired in.
///
/// Every call reports "not configured" without doing any work.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disconnected;

#[async_trait]
impl OrderNotifier for Disconnected {
    async fn notify(&self, _order: &Order) -> Result<(), NotificationError> {
        Err(NotificationError::NotConfigured)
    }
}

#[async_trait]
impl RecordMirror for Disconnected {
    async fn post(&self, _table: &str, _record: serde_json::Value) -> Result<(), SyncError> {
        Err(SyncError::NotConfigured)
    }

    async fn fetch(&self, _table: &str, _select: &str) -> Result<Vec<serde_json::Value>, SyncError> {
        Err(SyncError::NotConfigured)
    }
}

#[derive(Debug, Default)]
struct RecordingNotifierState {
    sent: Vec<Order>,
}

/// Notifier that records what it was asked to send.
///
/// Useful for tests and for running without a webhook.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    state: Arc<Mutex<RecordingNotifierState>>,
    fail: Arc<AtomicBool>,
}

impl RecordingNotifier {
    /// Creates a new recording notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures every subsequent attempt to fail.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Returns the orders successfully "sent", oldest first.
    pub async fn sent(&self) -> Vec<Order> {
        self.state.lock().await.sent.clone()
    }
}

#[async_trait]
impl OrderNotifier for RecordingNotifier {
    async fn notify(&self, order: &Order) -> Result<(), NotificationError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotificationError::Status(503));
        }
        self.state.lock().await.sent.push(order.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct RecordingMirrorState {
    posted: Vec<(String, serde_json::Value)>,
}

/// Mirror that keeps posted records in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingMirror {
    state: Arc<Mutex<RecordingMirrorState>>,
    fail: Arc<AtomicBool>,
}

impl RecordingMirror {
    /// Creates a new recording mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures every subsequent call to fail.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Returns every posted `(table, record)` pair, oldest first.
    pub async fn posted(&self) -> Vec<(String, serde_json::Value)> {
        self.state.lock().await.posted.clone()
    }

    /// Returns the records posted to `table`.
    pub async fn posted_to(&self, table: &str) -> Vec<serde_json::Value> {
        self.state
            .lock()
            .await
            .posted
            .iter()
            .filter(|(t, _)| t == table)
            .map(|(_, record)| record.clone())
            .collect()
    }
}

#[async_trait]
impl RecordMirror for RecordingMirror {
    async fn post(&self, table: &str, record: serde_json::Value) -> Result<(), SyncError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SyncError::Request("connection refused".to_string()));
        }
        self.state
            .lock()
            .await
            .posted
            .push((table.to_string(), record));
        Ok(())
    }

    async fn fetch(&self, table: &str, _select: &str) -> Result<Vec<serde_json::Value>, SyncError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SyncError::Request("connection refused".to_string()));
        }
        Ok(self.posted_to(table).await)
    }
}
