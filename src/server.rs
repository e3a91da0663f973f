use crate::cache::CacheStats;
use crate::handler::{RequestHandler, ScrapeError, url_from_json};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Clone)]
struct AppState {
    handler: Arc<RequestHandler>,
}

/// Wire shape of `GET /api/cache/stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatsBody {
    pub keys: usize,
    pub hits: u64,
    pub misses: u64,
    pub ksize: usize,
    pub vsize: usize,
}

impl From<CacheStats> for CacheStatsBody {
    fn from(stats: CacheStats) -> Self {
        Self {
            keys: stats.key_count,
            hits: stats.hits,
            misses: stats.misses,
            ksize: stats.key_size,
            vsize: stats.value_size,
        }
    }
}

impl IntoResponse for ScrapeError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body())).into_response()
    }
}

/// Builds the router for the scrape and cache endpoints
pub fn router(handler: Arc<RequestHandler>) -> Router {
    Router::new()
        .route("/api/scrape", post(scrape_handler))
        .route("/api/cache/stats", get(cache_stats_handler))
        .route("/api/cache", delete(clear_cache_handler))
        .route("/api/cache/clear", delete(clear_cache_handler))
        .with_state(AppState { handler })
}

/// Serves the router on `addr` until the process is stopped
pub async fn serve(handler: Arc<RequestHandler>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    ::log::info!("HTTP server listening on {}", listener.local_addr()?);
    axum::serve(listener, router(handler)).await
}

async fn scrape_handler(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ScrapeError> {
    // An unreadable body carries no URL
    let Json(body) = body.map_err(|rejection| {
        ::log::debug!("Rejected scrape body: {}", rejection);
        ScrapeError::MissingUrl
    })?;
    let url = url_from_json(&body)?;
    let envelope = state.handler.scrape(url).await?;
    Ok(Json(envelope).into_response())
}

async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsBody> {
    Json(state.handler.cache_stats().await.into())
}

async fn clear_cache_handler(State(state): State<AppState>) -> Json<Value> {
    state.handler.clear_cache().await;
    Json(serde_json::json!({ "ok": true }))
}
