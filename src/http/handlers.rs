use crate::embed::encode_uri_component;
use crate::state::AppState;
use axum::{
    extract::{ConnectInfo, Path, Request, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Version information endpoint
pub async fn version_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "online",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Body of `/api/source/{id}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub success: bool,
    pub id: String,
    pub embed_url: String,
    pub api_url: String,
    pub message: &'static str,
}

impl SourceInfo {
    pub fn new(id: String) -> Self {
        Self {
            success: true,
            embed_url: format!("/embed/{}", id),
            api_url: format!("/api/embed.js?url={}", encode_uri_component(&id)),
            message: "Use embedUrl or apiUrl for video playback",
            id,
        }
    }
}

/// Where to find a player for the given id
pub async fn source_info(Path(id): Path<String>) -> Json<SourceInfo> {
    Json(SourceInfo::new(id))
}

const HIT_MESSAGE: &str = "UptimeRobot hit recorded";

/// Body of `/api/hits`. Field names and message are matched on by uptime
/// monitors, so they stay as deployed.
#[derive(Debug, Serialize)]
pub struct HitReport {
    pub status: &'static str,
    pub message: &'static str,
    pub total_hits: u64,
    pub last_hit_time: String,
    #[serde(rename = "your_vercel_region")]
    pub region: String,
    pub requester_ip: String,
}

/// Uptime monitor endpoint; every call counts as a hit
pub async fn hits(State(state): State<Arc<AppState>>, request: Request) -> Json<HitReport> {
    let (total_hits, at) = state.hits.hit();

    Json(HitReport {
        status: "ok",
        message: HIT_MESSAGE,
        total_hits,
        last_hit_time: at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        region: state.config.region.clone(),
        requester_ip: requester_ip(&request),
    })
}

/// `x-forwarded-for` if present, else the peer address
fn requester_ip(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        return forwarded.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Debug endpoint: cache statistics
pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let stats = state.cache_stats();
    Json(serde_json::json!({
        "size": stats.entry_count,
        "live": stats.live_count,
        "expired": stats.expired_count,
        "ttl_secs": state.config.cache.ttl_secs,
    }))
}
