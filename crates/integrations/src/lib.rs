//! HTTP integrations for the laundry order tracker.
//!
//! - [`WebhookNotifier`] sends status messages to the WhatsApp reminder
//!   webhook.
//! - [`RemoteSyncClient`] mirrors records to a Supabase-style REST store.
//!
//! Both make exactly one attempt per call and report failures as the
//! domain's port errors. Neither retries.

pub mod remote;
pub mod webhook;

pub use remote::{RemoteSyncClient, RemoteSyncConfig};
pub use webhook::{WebhookConfig, WebhookNotifier};

/// Records the outcome of one outbound request.
fn record_outcome(target: &'static str, ok: bool) {
    let outcome = if ok { "success" } else { "error" };
    metrics::counter!("outbound_requests_total", "target" => target, "outcome" => outcome)
        .increment(1);
}
