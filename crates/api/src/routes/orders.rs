//! Order creation, lookup and status advance endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::{AdvanceOutcome, Customer, NewOrderRequest, Order, OrderStatus};
use serde::Serialize;
use storage::KeyValueStore;

use crate::AppState;
use crate::error::ApiError;

// -- Response types --

#[derive(Serialize)]
pub struct OrderCreatedResponse {
    pub order: Order,
    /// Set when the request registered a new customer.
    pub new_customer: Option<Customer>,
}

#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AdvanceResponse {
    Advanced { previous: OrderStatus, order: Order },
    AlreadyComplete { order: Order },
}

// -- Handlers --

/// GET /orders: all orders, newest first.
pub async fn list<S: KeyValueStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<Vec<Order>> {
    Json(state.repository.lock().await.orders().to_vec())
}

/// POST /orders: create an order for a new or existing customer.
///
/// The remote mirror runs in the background and is not awaited.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: KeyValueStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<NewOrderRequest>,
) -> Result<(StatusCode, Json<OrderCreatedResponse>), ApiError> {
    let created = state.repository.lock().await.create_order(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderCreatedResponse {
            order: created.order,
            new_customer: created.new_customer,
        }),
    ))
}

/// GET /orders/:code: look up an order by its code.
#[tracing::instrument(skip(state))]
pub async fn get<S: KeyValueStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(code): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let repository = state.repository.lock().await;
    Ok(Json(repository.find_by_code(&code)?.clone()))
}

/// POST /orders/:code/advance: the barcode scan flow.
///
/// Moves the order to its next status. The customer notification and
/// remote mirror run in the background and are not awaited.
#[tracing::instrument(skip(state))]
pub async fn advance<S: KeyValueStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(code): Path<String>,
) -> Result<Json<AdvanceResponse>, ApiError> {
    let outcome = state.repository.lock().await.advance_by_code(&code).await?;

    let response = match outcome {
        AdvanceOutcome::Advanced {
            order, previous, ..
        } => AdvanceResponse::Advanced { previous, order },
        AdvanceOutcome::AlreadyComplete(order) => AdvanceResponse::AlreadyComplete { order },
    };
    Ok(Json(response))
}
