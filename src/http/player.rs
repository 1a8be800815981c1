//! Player page handlers
//!
//! Both embed routes look the requested video up in the source cache first
//! and only normalize it on a miss. The normalized source is cached for the
//! configured TTL whether or not the URL turns out to be playable.

use axum::{
    extract::{Query, State},
    http::Uri,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::embed;
use crate::error::EmbedError;
use crate::state::AppState;

/// Query string of `/api/embed.js`
#[derive(Debug, Default, Deserialize)]
pub struct EmbedParams {
    pub url: Option<String>,
    pub autoplay: Option<String>,
    pub muted: Option<String>,
}

impl EmbedParams {
    fn flag(value: &Option<String>) -> bool {
        value.as_deref() == Some("true")
    }

    pub fn autoplay(&self) -> bool {
        Self::flag(&self.autoplay)
    }

    pub fn muted(&self) -> bool {
        Self::flag(&self.muted)
    }
}

/// Homepage
pub async fn home(State(state): State<Arc<AppState>>) -> Response {
    match state.templates.home() {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_page(&state, EmbedError::Render(e)),
    }
}

/// `GET /api/embed.js?url=...&autoplay=...&muted=...`
pub async fn embed_query(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EmbedParams>,
) -> Response {
    match render_query_embed(&state, &params) {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_page(&state, e),
    }
}

fn render_query_embed(state: &AppState, params: &EmbedParams) -> Result<String, EmbedError> {
    let url = params
        .url
        .as_deref()
        .filter(|u| !u.is_empty())
        .ok_or(EmbedError::MissingUrl)?;
    let autoplay = params.autoplay();
    let muted = params.muted();

    let key = embed::query_cache_key(url);
    let src = match state.cached_source(&key) {
        Some(src) => {
            info!("[Embed] Serving cached player for {}", url);
            src
        }
        None => {
            info!("[Embed] Processing embed for {}", url);
            let src = embed::resolve_query_source(url);
            state.cache_source(key, src.clone());
            src
        }
    };

    let src = embed::with_player_params(&src, autoplay, muted);
    Ok(state.templates.player(&src, autoplay, muted)?)
}

/// `GET /embed/{*id}`
///
/// The id is taken from the raw request path so that an encoded URL is
/// cached under its encoded form and decoded only on a miss.
pub async fn embed_path(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    let id = uri.path().strip_prefix("/embed/").unwrap_or_default();
    match render_path_embed(&state, id) {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_page(&state, e),
    }
}

fn render_path_embed(state: &AppState, id: &str) -> Result<String, EmbedError> {
    let key = embed::path_cache_key(id);
    let src = match state.cached_source(&key) {
        Some(src) => {
            info!("[Embed] Serving cached player for {}", id);
            src
        }
        None => {
            info!("[Embed] Processing embed for {}", id);
            let src = embed::resolve_path_source(id);
            state.cache_source(key, src.clone());
            src
        }
    };

    Ok(state.templates.player(&src, false, false)?)
}

/// Fallback for unknown routes
pub async fn not_found(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    error_page(&state, EmbedError::NotFound(uri.path().to_string()))
}

/// Render `err` as the HTML error page, falling back to plain text
fn error_page(state: &AppState, err: EmbedError) -> Response {
    let status = err.status();
    if status.is_server_error() {
        error!("Embed error: {}", err);
    }

    let (title, message) = err.page_text();
    match state.templates.error(title, message) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!("Failed to render error page: {}", e);
            (status, format!("{}: {}", title, message)).into_response()
        }
    }
}
