//! Read-through to the remote mirror.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use storage::KeyValueStore;

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct FetchQuery {
    pub select: Option<String>,
}

/// GET /remote/:table?select=: records mirrored to the remote store.
#[tracing::instrument(skip(state))]
pub async fn fetch<S: KeyValueStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(table): Path<String>,
    Query(query): Query<FetchQuery>,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    // Released before the network call.
    let mirror = state.repository.lock().await.mirror();
    let select = query.select.as_deref().unwrap_or("*");
    Ok(Json(mirror.fetch(&table, select).await?))
}
