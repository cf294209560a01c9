//! HTTP routes and middleware.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Method  Path                     Handler          Success              │
//! │  ──────  ───────────────────────  ───────────────  ──────────────────── │
//! │  POST    /receipts/process        process_receipt  201 {"id"}           │
//! │  GET     /receipts/{id}/points    get_points       200 {"points"}       │
//! │  GET     /receipts                list_receipts    200 PaginatedReceipts│
//! │  GET     /health                  health           200 / 503            │
//! │                                                                         │
//! │  Layers (outermost first):                                              │
//! │    deadline    every route, REQUEST_TIMEOUT_SECS                        │
//! │    rate_limit  /receipts routes only, keyed by remote IP                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{ConnectInfo, Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use points_core::{FilterParams, PaginatedReceipts, ReceiptInput};
use points_db::{Database, StoreStats};
use points_service::{RateLimiter, ReceiptService};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};

/// Client key used when the remote address is unknown.
const UNKNOWN_CLIENT: &str = "unknown";

// =============================================================================
// State
// =============================================================================

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: ReceiptService,
    pub limiter: RateLimiter,
    pub db: Database,
    /// Latest store stats from the background monitor.
    pub stats: watch::Receiver<StoreStats>,
    pub request_timeout: Duration,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let receipts = Router::new()
        .route("/receipts/process", post(process_receipt))
        .route("/receipts/{id}/points", get(get_points))
        .route("/receipts", get(list_receipts))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .merge(receipts)
        .route("/health", get(health))
        .layer(middleware::from_fn_with_state(state.clone(), deadline))
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

#[derive(Debug, Serialize)]
struct ProcessResponse {
    id: String,
}

#[derive(Debug, Serialize)]
struct PointsResponse {
    points: i64,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    stats: StoreStats,
}

async fn process_receipt(
    State(state): State<AppState>,
    payload: Result<Json<ReceiptInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(input) = payload?;
    let receipt = state.service.process(&input).await?;

    Ok((StatusCode::CREATED, Json(ProcessResponse { id: receipt.id })))
}

async fn get_points(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PointsResponse>> {
    let points = state.service.get_points_by_id(&id).await?;
    Ok(Json(PointsResponse { points }))
}

async fn list_receipts(
    State(state): State<AppState>,
    query: Result<Query<FilterParams>, QueryRejection>,
) -> ApiResult<Json<PaginatedReceipts>> {
    let Query(params) = query?;
    let page = state.service.get_receipts(&params).await?;
    Ok(Json(page))
}

/// Liveness probe plus the last published store stats.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let stats = *state.stats.borrow();

    if state.db.health_check().await {
        (StatusCode::OK, Json(HealthResponse { status: "ok", stats }))
    } else {
        warn!("Health check failed: database unreachable");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unavailable",
                stats,
            }),
        )
    }
}

// =============================================================================
// Middleware
// =============================================================================

/// Rejects clients that have exhausted their token bucket.
async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());

    match state.limiter.check(&client).await {
        Ok(()) => next.run(req).await,
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Drops the request future once the deadline passes.
async fn deadline(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();

    match tokio::time::timeout(state.request_timeout, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            debug!(path = %path, "Request deadline exceeded");
            ApiError::timeout().into_response()
        }
    }
}
