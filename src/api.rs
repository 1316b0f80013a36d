// Tier List - REST API with Axum
//
// Each endpoint forwards one gesture to the shared store and answers with the
// post-mutation snapshot. Stale ids are no-ops on the store side, so they still
// answer 200; only a malformed tier label is rejected.

use crate::store::{Snapshot, TierStore};
use crate::tier::Tier;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<TierStore>>,
}

impl AppState {
    pub fn new(store: TierStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Every store operation leaves the store consistent, so a poisoned lock
    /// still guards valid data.
    fn store(&self) -> MutexGuard<'_, TierStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

fn snapshot_response(snapshot: Snapshot) -> Response {
    (StatusCode::OK, Json(ApiResponse::ok(snapshot))).into_response()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/state - Current pool, tiers and drag subject
async fn get_state(State(state): State<AppState>) -> Response {
    snapshot_response(state.store().snapshot())
}

/// POST /api/drag/:id - Begin dragging a character
async fn begin_drag(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let mut store = state.store();
    store.begin_drag(&id);
    snapshot_response(store.snapshot())
}

/// POST /api/drop/:tier - Drop the drag subject into a tier
async fn drop_into(State(state): State<AppState>, Path(tier): Path<String>) -> Response {
    let tier: Tier = match tier.parse() {
        Ok(tier) => tier,
        Err(e) => {
            tracing::warn!(error = %e, "rejected drop");
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<Snapshot>::err(e.to_string())),
            )
                .into_response();
        }
    };

    let mut store = state.store();
    store.drop_into(tier);
    snapshot_response(store.snapshot())
}

/// POST /api/cancel - Abandon the current drag
async fn cancel_drag(State(state): State<AppState>) -> Response {
    let mut store = state.store();
    store.cancel_drag();
    snapshot_response(store.snapshot())
}

/// POST /api/remove/:id - Send a ranked character back to the pool
async fn remove_from_tier(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let mut store = state.store();
    store.remove_from_tier(&id);
    snapshot_response(store.snapshot())
}

/// GET / - Serve index.html
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(store: TierStore) -> Router {
    let state = AppState::new(store);

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/state", get(get_state))
        .route("/drag/:id", post(begin_drag))
        .route("/drop/:tier", post(drop_into))
        .route("/cancel", post(cancel_drag))
        .route("/remove/:id", post(remove_from_tier))
        .with_state(state);

    // Build main router
    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
