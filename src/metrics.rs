//! Prometheus-compatible metrics and the uptime hit counter

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::state::AppState;

/// Metrics collector
#[derive(Debug)]
pub struct Metrics {
    /// Server start time
    start_time: Instant,
    /// Total requests processed
    request_count: RwLock<u64>,
    /// Requests by matched route
    requests_by_endpoint: RwLock<HashMap<String, u64>>,
    /// Embed cache hits
    cache_hits: RwLock<u64>,
    /// Embed cache misses
    cache_misses: RwLock<u64>,
    /// Error responses by status class
    errors_by_type: RwLock<HashMap<String, u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            request_count: RwLock::new(0),
            requests_by_endpoint: RwLock::new(HashMap::new()),
            cache_hits: RwLock::new(0),
            cache_misses: RwLock::new(0),
            errors_by_type: RwLock::new(HashMap::new()),
        }
    }

    pub fn record_request(&self, endpoint: &str) {
        *self.request_count.write() += 1;
        *self
            .requests_by_endpoint
            .write()
            .entry(endpoint.to_string())
            .or_insert(0) += 1;
    }

    pub fn record_cache_hit(&self) {
        *self.cache_hits.write() += 1;
    }

    pub fn record_cache_miss(&self) {
        *self.cache_misses.write() += 1;
    }

    pub fn record_error(&self, error_type: &str) {
        *self
            .errors_by_type
            .write()
            .entry(error_type.to_string())
            .or_insert(0) += 1;
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Export metrics in Prometheus format
    pub fn export_prometheus(&self) -> String {
        let mut output = String::new();

        output.push_str("# HELP embed_proxy_uptime_seconds Server uptime in seconds\n");
        output.push_str("# TYPE embed_proxy_uptime_seconds counter\n");
        output.push_str(&format!(
            "embed_proxy_uptime_seconds {}\n",
            self.uptime_secs()
        ));

        output.push_str("\n# HELP embed_proxy_requests_total Total number of HTTP requests\n");
        output.push_str("# TYPE embed_proxy_requests_total counter\n");
        output.push_str(&format!(
            "embed_proxy_requests_total {}\n",
            *self.request_count.read()
        ));

        output.push_str("\n# HELP embed_proxy_requests_by_endpoint Requests by route\n");
        output.push_str("# TYPE embed_proxy_requests_by_endpoint counter\n");
        let mut endpoints: Vec<_> = self
            .requests_by_endpoint
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        endpoints.sort();
        for (endpoint, count) in endpoints {
            output.push_str(&format!(
                "embed_proxy_requests_by_endpoint{{endpoint=\"{}\"}} {}\n",
                endpoint, count
            ));
        }

        let hits = *self.cache_hits.read();
        let misses = *self.cache_misses.read();

        output.push_str("\n# HELP embed_proxy_cache_hits_total Embed source cache hits\n");
        output.push_str("# TYPE embed_proxy_cache_hits_total counter\n");
        output.push_str(&format!("embed_proxy_cache_hits_total {}\n", hits));

        output.push_str("\n# HELP embed_proxy_cache_misses_total Embed source cache misses\n");
        output.push_str("# TYPE embed_proxy_cache_misses_total counter\n");
        output.push_str(&format!("embed_proxy_cache_misses_total {}\n", misses));

        let hit_ratio = if hits + misses > 0 {
            hits as f64 / (hits + misses) as f64
        } else {
            0.0
        };
        output.push_str("\n# HELP embed_proxy_cache_hit_ratio Cache hit ratio\n");
        output.push_str("# TYPE embed_proxy_cache_hit_ratio gauge\n");
        output.push_str(&format!("embed_proxy_cache_hit_ratio {:.4}\n", hit_ratio));

        output.push_str("\n# HELP embed_proxy_errors_total Error responses by status class\n");
        output.push_str("# TYPE embed_proxy_errors_total counter\n");
        for (error_type, count) in self.errors_by_type.read().iter() {
            output.push_str(&format!(
                "embed_proxy_errors_total{{type=\"{}\"}} {}\n",
                error_type, count
            ));
        }

        output
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts every request against its matched route and tallies error statuses
pub async fn track_requests(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    state.metrics.record_request(&endpoint);
    let status = response.status();
    if status.is_client_error() {
        state.metrics.record_error("client_error");
    } else if status.is_server_error() {
        state.metrics.record_error("server_error");
    }

    response
}

/// Metrics endpoint handler
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    (
        StatusCode::OK,
        [("Content-Type", "text/plain; version=0.0.4")],
        state.metrics.export_prometheus(),
    )
        .into_response()
}

/// Uptime monitor hit counter
#[derive(Debug, Default)]
pub struct HitCounter {
    total: AtomicU64,
}

impl HitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a hit and return the new total with its timestamp
    pub fn hit(&self) -> (u64, DateTime<Utc>) {
        let total = self.total.fetch_add(1, Ordering::SeqCst) + 1;
        (total, Utc::now())
    }
}
