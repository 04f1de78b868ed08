//! Public reading API

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, Query, State, WebSocketUpgrade,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

use super::cookies::{request_cookies, set_cookie};
use super::{ApiError, ApiResult, AppState};
use crate::content::Settings;
use crate::gate::{GateOutcome, KeyValueStore, MemoryStorage};
use crate::reader::{resolve_category, CategoryPage, HomeFeed, PostDetail};
use crate::search::{SearchDebouncer, SearchHit};

/// How long an unlocked category stays unlocked in the browser
const GATE_COOKIE_MAX_AGE: u64 = 60 * 60 * 24 * 365;

/// Gate flags the browser sent back as cookies
fn cookie_storage(headers: &HeaderMap) -> MemoryStorage {
    MemoryStorage::from_entries(request_cookies(headers))
}

pub async fn home(State(state): State<Arc<AppState>>) -> ApiResult<Json<HomeFeed>> {
    Ok(Json(state.reader().home()?))
}

pub async fn category(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<CategoryPage>> {
    let storage = cookie_storage(&headers);
    let unlocked = state.gate(&storage).is_authorized();

    state
        .reader()
        .category(&slug, unlocked)?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    #[serde(default)]
    password: String,
}

#[derive(Debug, Serialize)]
pub struct UnlockResponse {
    granted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// Password attempt for a category. Unprotected categories are always open.
pub async fn unlock(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    Json(request): Json<UnlockRequest>,
) -> ApiResult<Response> {
    let categories = state.categories.list()?;
    let category = resolve_category(&categories, &slug).ok_or(ApiError::NotFound)?;

    let granted = Json(UnlockResponse {
        granted: true,
        message: None,
    });
    if !state.reader().is_protected(category) {
        return Ok(granted.into_response());
    }

    let storage = cookie_storage(&headers);
    let gate = state.gate(&storage);
    match gate.verify(&request.password) {
        GateOutcome::Granted => {
            let key = gate.storage_key();
            let value = storage.get(&key).unwrap_or_default();
            let cookie = set_cookie(&key, &value, Some(GATE_COOKIE_MAX_AGE), true);
            Ok(([(header::SET_COOKIE, cookie)], granted).into_response())
        }
        GateOutcome::Denied { message } => {
            tracing::info!("Wrong password for category {}", category.slug);
            Ok((
                StatusCode::FORBIDDEN,
                Json(UnlockResponse {
                    granted: false,
                    message: Some(message),
                }),
            )
                .into_response())
        }
    }
}

pub async fn post(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<PostDetail>> {
    state
        .reader()
        .post(&slug, &state.renderer)?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<SearchHit>>> {
    Ok(Json(state.searcher().search(&params.q)?))
}

/// WebSocket for search-as-you-type: every text frame is a query, and only
/// the last one of a burst is answered
pub async fn live_search(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_search_socket(socket, state))
}

async fn handle_search_socket(mut socket: WebSocket, state: Arc<AppState>) {
    tracing::debug!("Live search client connected");
    let mut debouncer =
        SearchDebouncer::new(Duration::from_millis(state.config.search.debounce_ms));

    loop {
        let deadline = debouncer.deadline();
        tokio::select! {
            // Quiet period over for the latest query
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                let Some(query) = debouncer.take_ready() else {
                    continue;
                };
                let reply = match state.searcher().search(&query) {
                    Ok(hits) => json!({ "query": query, "hits": hits }),
                    Err(e) => {
                        tracing::error!("Search failed: {}", e);
                        json!({ "query": query, "error": "搜索失败" })
                    }
                };
                if socket.send(Message::Text(reply.to_string())).await.is_err() {
                    break;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(query))) => debouncer.push(query),
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live search client disconnected");
}

pub async fn settings(State(state): State<Arc<AppState>>) -> ApiResult<Json<Settings>> {
    Ok(Json(state.settings.read()?))
}
