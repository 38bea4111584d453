//! API Handlers
//!
//! HTTP request handlers that expose one [`CachedStore`] over the network.
//! Store calls block on the remote tier, so they run on the blocking pool.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::cache::CachedStore;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, ErrorBody, HealthBody, SetRequest, StatsBody, ValueBody, WriteAck, WriteOp,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The embedded two-tier store
    pub store: Arc<CachedStore>,
}

impl AppState {
    /// Creates a new AppState around the given store.
    pub fn new(store: CachedStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Fails if the store or its remote tier cannot be initialized.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(CachedStore::connect(config)?))
    }

    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&CachedStore) -> Result<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(&*store))
            .await
            .map_err(|e| CacheError::Internal(format!("store task failed: {}", e)))?
    }
}

/// Handler for PUT /set
///
/// Writes a key-value pair through both tiers.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<WriteAck>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let SetRequest { key, value } = req;
    let ack = state
        .run(move |store| {
            store.set(&key, &value)?;
            Ok(WriteAck::new(WriteOp::Set, key, store.local_len()))
        })
        .await?;

    Ok(Json(ack))
}

/// Handler for GET /get/:key
///
/// Reads a key, answering 404 when neither tier has it.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response> {
    if let Some(error_msg) = validate_key(&key) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let lookup = key.clone();
    let value = state.run(move |store| store.get(&lookup)).await?;

    Ok(match value {
        Some(value) => Json(ValueBody { key, value }).into_response(),
        None => (StatusCode::NOT_FOUND, Json(ErrorBody::missing_key(&key))).into_response(),
    })
}

/// Handler for DELETE /del/:key
///
/// Deletes a key from both tiers. Deleting an absent key succeeds.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<WriteAck>> {
    if let Some(error_msg) = validate_key(&key) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ack = state
        .run(move |store| {
            store.delete(&key)?;
            Ok(WriteAck::new(WriteOp::Delete, key, store.local_len()))
        })
        .await?;

    Ok(Json(ack))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsBody> {
    Json(StatsBody::from(state.store.stats()))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthBody> {
    Json(HealthBody::up(
        state.store.local_len(),
        state.store.options().capacity,
    ))
}
