//! License status and activation endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use domain::{LicensePlan, LicenseSummary};
use serde::Deserialize;
use storage::KeyValueStore;

use crate::AppState;
use crate::error::ApiError;

/// Activation by explicit day count or preset plan.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ActivateRequest {
    Days { days: u32 },
    Plan { plan: LicensePlan },
}

/// GET /license: current license summary.
#[tracing::instrument(skip(state))]
pub async fn get<S: KeyValueStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<LicenseSummary> {
    let repository = state.repository.lock().await;
    Json(repository.license().summary().await)
}

/// POST /license/activate: extend the license and return the new summary.
#[tracing::instrument(skip(state))]
pub async fn activate<S: KeyValueStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<ActivateRequest>,
) -> Result<Json<LicenseSummary>, ApiError> {
    let repository = state.repository.lock().await;
    let license = repository.license();
    match req {
        ActivateRequest::Days { days } => license.activate(days).await?,
        ActivateRequest::Plan { plan } => license.activate_plan(plan).await?,
    };
    Ok(Json(license.summary().await))
}
