//! Customer list endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use domain::Customer;
use storage::KeyValueStore;

use crate::AppState;

/// GET /customers: registered customers, in registration order.
///
/// A customer's position in this list is the `index` used to place an
/// order for an existing customer.
pub async fn list<S: KeyValueStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<Vec<Customer>> {
    Json(state.repository.lock().await.customers().to_vec())
}
