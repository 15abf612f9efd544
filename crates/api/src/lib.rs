//! HTTP API server for the laundry order tracker.
//!
//! Exposes the order repository and license engine as JSON endpoints,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::OrderRepository;
use integrations::{RemoteSyncClient, WebhookNotifier};
use metrics_exporter_prometheus::PrometheusHandle;
use storage::{FileKeyValueStore, KeyValueStore};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;

/// Shared application state accessible from all handlers.
///
/// The repository is a single writer; the mutex serializes every
/// request that touches it.
pub struct AppState<S: KeyValueStore + Clone> {
    pub repository: Mutex<OrderRepository<S>>,
}

impl<S: KeyValueStore + Clone> AppState<S> {
    /// Wraps an opened repository.
    pub fn new(repository: OrderRepository<S>) -> Arc<Self> {
        Arc::new(Self {
            repository: Mutex::new(repository),
        })
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: KeyValueStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/license", get(routes::license::get::<S>))
        .route("/license/activate", post(routes::license::activate::<S>))
        .route("/customers", get(routes::customers::list::<S>))
        .route(
            "/orders",
            get(routes::orders::list::<S>).post(routes::orders::create::<S>),
        )
        .route("/orders/{code}", get(routes::orders::get::<S>))
        .route("/orders/{code}/advance", post(routes::orders::advance::<S>))
        .route("/remote/{table}", get(routes::remote::fetch::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Opens the file-backed repository with the HTTP integrations wired in.
///
/// Both integrations share one HTTP client. Unconfigured integrations are
/// still installed; their calls report "not configured".
pub async fn create_default_state(config: &Config) -> Arc<AppState<FileKeyValueStore>> {
    let client = reqwest::Client::new();
    let notifier = WebhookNotifier::with_client(client.clone(), config.webhook.clone());
    let mirror = RemoteSyncClient::with_client(client, config.remote.clone());

    if !notifier.is_configured() {
        tracing::warn!("WhatsApp webhook not configured, customer notifications are disabled");
    }
    if !mirror.is_configured() {
        tracing::warn!("SUPABASE_URL not configured, remote sync is disabled");
    }

    let repository = OrderRepository::builder(FileKeyValueStore::new(config.data_path.clone()))
        .notifier(Arc::new(notifier))
        .mirror(Arc::new(mirror))
        .utc_offset_minutes(config.utc_offset_minutes)
        .open()
        .await;

    AppState::new(repository)
}
