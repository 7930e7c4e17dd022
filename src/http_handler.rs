use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::model::AppState;
use crate::scanner::{BatchReport, ListKind, ScanContext, ScanError, TabId, Verdict};
use crate::settings::Settings;

async fn root() -> Html<&'static str> {
    Html("<h1>URL Risk Scanner</h1>")
}

#[derive(Serialize, Debug)]
enum ErrorReason {
    NotScannable,
    Network,
    Classifier,
    ListMutation,
}

fn error_parts(e: &ScanError) -> (StatusCode, ErrorReason) {
    match e {
        ScanError::NotScannable => (StatusCode::BAD_REQUEST, ErrorReason::NotScannable),
        ScanError::Network(_) => (StatusCode::BAD_GATEWAY, ErrorReason::Network),
        ScanError::Classifier(_) => (StatusCode::BAD_GATEWAY, ErrorReason::Classifier),
        ScanError::ListMutation(_) => (StatusCode::BAD_GATEWAY, ErrorReason::ListMutation),
    }
}

#[derive(Deserialize, Debug)]
struct ScanRequest {
    url: String,
    tab: Option<TabId>,
}

#[derive(Serialize, Debug)]
#[serde(tag = "type")]
enum ScanResponse {
    Resolved {
        verdict: Verdict,
    },
    Error {
        reason: ErrorReason,
        message: String,
    },
}

async fn scan(
    State(state): State<AppState>,
    Json(req): Json<ScanRequest>,
) -> (StatusCode, Json<ScanResponse>) {
    let ctx = ScanContext { tab: req.tab };

    match state.scanner.scan(&req.url, &ctx).await {
        Ok(verdict) => (StatusCode::OK, Json(ScanResponse::Resolved { verdict })),
        Err(e) => {
            let (status, reason) = error_parts(&e);

            (
                status,
                Json(ScanResponse::Error {
                    reason,
                    message: e.to_string(),
                }),
            )
        }
    }
}

#[derive(Deserialize, Debug)]
struct CachedParams {
    url: String,
}

#[derive(Serialize, Debug)]
#[serde(tag = "type")]
enum CachedResponse {
    Cached { verdict: Verdict },
    Absent,
}

async fn cached(
    State(state): State<AppState>,
    Query(params): Query<CachedParams>,
) -> (StatusCode, Json<CachedResponse>) {
    match state.scanner.get_cached(&params.url).await {
        Some(verdict) => (StatusCode::OK, Json(CachedResponse::Cached { verdict })),
        None => (StatusCode::NOT_FOUND, Json(CachedResponse::Absent)),
    }
}

#[derive(Deserialize, Debug)]
struct ScanLinksRequest {
    urls: Vec<String>,
    tab: Option<TabId>,
}

async fn scan_links(
    State(state): State<AppState>,
    Json(req): Json<ScanLinksRequest>,
) -> Json<BatchReport> {
    let ctx = ScanContext { tab: req.tab };

    Json(state.scanner.scan_batch(&req.urls, &ctx).await)
}

#[derive(Deserialize, Debug)]
struct ListRequest {
    url: String,
    list: ListKind,
}

#[derive(Serialize, Debug)]
#[serde(tag = "type")]
enum ListResponse {
    Accepted,
    Error {
        reason: ErrorReason,
        message: String,
    },
}

async fn lists(
    State(state): State<AppState>,
    Json(req): Json<ListRequest>,
) -> (StatusCode, Json<ListResponse>) {
    match state.scanner.submit_listing(&req.url, req.list).await {
        Ok(()) => (StatusCode::OK, Json(ListResponse::Accepted)),
        Err(e) => {
            let (status, reason) = error_parts(&e);

            (
                status,
                Json(ListResponse::Error {
                    reason,
                    message: e.to_string(),
                }),
            )
        }
    }
}

async fn stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::to_value(state.scanner.counters()).unwrap_or_default())
}

async fn settings_get(State(state): State<AppState>) -> Json<Settings> {
    Json(state.scanner.settings().snapshot())
}

async fn settings_put(
    State(state): State<AppState>,
    Json(settings): Json<Settings>,
) -> Json<Settings> {
    state.scanner.settings().replace(settings);

    Json(settings)
}

async fn cache_clear(State(state): State<AppState>) -> StatusCode {
    state.scanner.clear_cache().await;

    StatusCode::OK
}

pub async fn run(s: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(s, router(state).into_make_service()).await
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/scan", post(scan))
        .route("/api/cached", get(cached))
        .route("/api/scan-links", post(scan_links))
        .route("/api/lists", post(lists))
        .route("/api/stats", get(stats))
        .route("/api/settings", get(settings_get).put(settings_put))
        .route("/api/cache", axum::routing::delete(cache_clear))
        .with_state(state)
}
