use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::refresh::Refresher;
use crate::store::{Snapshot, SnapshotStore};

pub const SNAPSHOT_CREATED_HEADER: &str = "x-snapshot-created-at";

const NOT_YET_AVAILABLE: &str = "No VPN data available. Please run the updater.";
const GENERIC_FAILURE: &str = "Failed to retrieve VPN data.";

/// What a reader gets: data, not-yet-available, or failure. Nothing else.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadResponse {
    Data {
        snapshot: Snapshot,
        max_age_secs: u64,
    },
    NotYetAvailable,
    Failure,
}

impl IntoResponse for ReadResponse {
    fn into_response(self) -> Response {
        match self {
            ReadResponse::Data {
                snapshot,
                max_age_secs,
            } => {
                let mut headers = HeaderMap::new();
                if let Ok(v) = HeaderValue::from_str(&format!("public, max-age={max_age_secs}")) {
                    headers.insert(header::CACHE_CONTROL, v);
                }
                if let Ok(v) = HeaderValue::from_str(&snapshot.created_at.to_rfc3339()) {
                    headers.insert(SNAPSHOT_CREATED_HEADER, v);
                }
                (StatusCode::OK, headers, Json(snapshot.records)).into_response()
            }
            ReadResponse::NotYetAvailable => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": NOT_YET_AVAILABLE })),
            )
                .into_response(),
            ReadResponse::Failure => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": GENERIC_FAILURE })),
            )
                .into_response(),
        }
    }
}

/// Serves the last committed snapshot. Never refreshes, never waits on one.
#[derive(Clone)]
pub struct ReadService {
    store: SnapshotStore,
    max_age_secs: u64,
}

impl ReadService {
    pub fn new(store: SnapshotStore, max_age_secs: u64) -> Self {
        Self {
            store,
            max_age_secs,
        }
    }

    pub async fn handle(&self) -> ReadResponse {
        match self.store.get().await {
            Ok(Some(snapshot)) => ReadResponse::Data {
                snapshot,
                max_age_secs: self.max_age_secs,
            },
            Ok(None) => ReadResponse::NotYetAvailable,
            Err(e) => {
                tracing::error!(error = %e, "error fetching VPN data from snapshot store");
                ReadResponse::Failure
            }
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub reader: ReadService,
    pub refresher: Arc<Refresher>,
    pub trigger_token: Option<String>,
}

impl AppState {
    pub fn new(refresher: Arc<Refresher>, max_age_secs: u64, trigger_token: Option<String>) -> Self {
        Self {
            reader: ReadService::new(refresher.store().clone(), max_age_secs),
            refresher,
            trigger_token,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/vpn-data", get(vpn_data))
        .route("/internal/refresh", post(trigger_refresh))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn vpn_data(State(state): State<AppState>) -> ReadResponse {
    state.reader.handle().await
}

/// Fire-and-forget: the refresh runs detached and the caller gets 202 at once.
async fn trigger_refresh(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(expected) = state.trigger_token.as_deref() {
        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        if presented != Some(expected) {
            tracing::warn!("refresh trigger rejected: bad or missing token");
            return StatusCode::UNAUTHORIZED;
        }
    }

    let refresher = Arc::clone(&state.refresher);
    tokio::spawn(async move {
        let outcome = refresher.refresh_now().await;
        tracing::info!(target: "refresh", ?outcome, "triggered refresh finished");
    });
    StatusCode::ACCEPTED
}
