//! Axum router configuration

use axum::{
    http::{header, Method},
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::metrics::{metrics_handler, track_requests};
use crate::state::AppState;

use super::handlers::{cache_stats, health_check, hits, source_info, version_check};
use super::player::{embed_path, embed_query, home, not_found};

/// Create the Axum router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/", get(home))
        // Player pages
        .route("/api/embed.js", get(embed_query))
        .route("/embed/{*id}", get(embed_path))
        // JSON API
        .route("/api/source/{id}", get(source_info))
        .route("/api/hits", get(hits))
        // Health and version endpoints
        .route("/health", get(health_check))
        .route("/version", get(version_check))
        .route("/metrics", get(metrics_handler))
        // Debug endpoints
        .route("/debug/cache", get(cache_stats))
        .fallback(not_found)
        // Middleware
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .layer(TraceLayer::new_for_http());

    // The player is meant to be framed from any origin.
    let router = if state.config.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::OPTIONS, Method::HEAD])
            .allow_headers([header::ACCEPT, header::CONTENT_TYPE, header::ORIGIN])
            .max_age(Duration::from_secs(3600));
        router.layer(cors)
    } else {
        router
    };

    router.with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use crate::config::ServerConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use std::net::SocketAddr;
    use tower::util::ServiceExt;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(ServerConfig::default()).unwrap())
    }

    async fn send_get(app: &Router, uri: &str) -> Response {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_homepage() {
        let app = create_router(test_state());
        let response = send_get(&app, "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/html"));
        assert!(body_string(response).await.contains("Video Player API"));
    }

    #[tokio::test]
    async fn test_embed_query_renders_player() {
        let app = create_router(test_state());
        let response = send_get(
            &app,
            "/api/embed.js?url=http%3A%2F%2Fv.com%2Fe%2F1&autoplay=true&muted=true",
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("src=\"https://v.com/e/1?autoplay&#x3D;1&amp;muted&#x3D;1\""));
        assert!(body.contains("    autoplay\n"));
    }

    #[tokio::test]
    async fn test_embed_query_without_url() {
        let app = create_router(test_state());
        let response = send_get(&app, "/api/embed.js").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(response).await.contains("Missing URL Parameter"));
    }

    #[tokio::test]
    async fn test_embed_path_with_slashes() {
        let state = test_state();
        let app = create_router(state.clone());
        let response = send_get(&app, "/embed/http://hglink.to/e/0tmqi4jmtowr").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response)
            .await
            .contains("src=\"https://hglink.to/e/0tmqi4jmtowr\""));
        assert!(state
            .embed_cache
            .contains_key("embed:http://hglink.to/e/0tmqi4jmtowr"));
    }

    #[tokio::test]
    async fn test_repeat_embed_is_a_cache_hit() {
        let state = test_state();
        let app = create_router(state.clone());
        send_get(&app, "/embed/abc").await;
        send_get(&app, "/embed/abc").await;

        let metrics = state.metrics.export_prometheus();
        assert!(metrics.contains("embed_proxy_cache_misses_total 1"));
        assert!(metrics.contains("embed_proxy_cache_hits_total 1"));
        assert_eq!(state.embed_cache.len(), 1);
    }

    #[tokio::test]
    async fn test_cached_source_expires_after_ttl() {
        let clock = Arc::new(ManualClock::new());
        let state =
            Arc::new(AppState::with_clock(ServerConfig::default(), clock.clone()).unwrap());
        let app = create_router(state.clone());

        send_get(&app, "/embed/abc").await;
        clock.advance(Duration::from_secs(1801));
        assert_eq!(state.cache_stats().expired_count, 1);

        send_get(&app, "/embed/abc").await;
        let metrics = state.metrics.export_prometheus();
        assert!(metrics.contains("embed_proxy_cache_misses_total 2"));
        assert!(metrics.contains("embed_proxy_cache_hits_total 0"));
        assert_eq!(state.cache_stats().live_count, 1);
    }

    #[tokio::test]
    async fn test_source_info() {
        let app = create_router(test_state());
        let response = send_get(&app, "/api/source/0tmqi4jmtowr").await;

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["embedUrl"], "/embed/0tmqi4jmtowr");
        assert_eq!(json["apiUrl"], "/api/embed.js?url=0tmqi4jmtowr");
    }

    #[tokio::test]
    async fn test_hits_counts_calls() {
        let app = create_router(test_state());
        send_get(&app, "/api/hits").await;

        let request = Request::builder()
            .uri("/api/hits")
            .header("x-forwarded-for", "198.51.100.4")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();

        assert_eq!(json["status"], "ok");
        assert_eq!(json["total_hits"], 2);
        assert_eq!(json["message"], "UptimeRobot hit recorded");
        assert_eq!(json["your_vercel_region"], "unknown");
        assert_eq!(json["requester_ip"], "198.51.100.4");
        assert!(json["last_hit_time"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_unknown_route_renders_not_found_page() {
        let app = create_router(test_state());
        let response = send_get(&app, "/no/such/page").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_string(response).await.contains("Page Not Found"));
    }

    #[tokio::test]
    async fn test_health_and_debug_cache() {
        let state = test_state();
        let app = create_router(state.clone());

        let response = send_get(&app, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "OK");

        send_get(&app, "/embed/abc").await;
        let response = send_get(&app, "/debug/cache").await;
        let json: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["size"], 1);
        assert_eq!(json["live"], 1);
        assert_eq!(json["ttl_secs"], 1800);
    }

    #[tokio::test]
    async fn test_metrics_endpoint_tracks_routes() {
        let app = create_router(test_state());
        send_get(&app, "/api/embed.js").await;

        let response = send_get(&app, "/metrics").await;
        let body = body_string(response).await;
        assert!(body.contains("embed_proxy_requests_by_endpoint{endpoint=\"/api/embed.js\"} 1"));
        assert!(body.contains("embed_proxy_errors_total{type=\"client_error\"} 1"));
    }

    #[tokio::test]
    async fn test_cors_options() {
        let app = create_router(test_state());

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/embed.js")
            .header(header::ORIGIN, "http://localhost:8080")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_cors_disabled() {
        let config = ServerConfig {
            cors_enabled: false,
            ..Default::default()
        };
        let app = create_router(Arc::new(AppState::new(config).unwrap()));

        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "http://localhost:8080")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_served_over_tcp() {
        let app = create_router(test_state());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        let json: serde_json::Value = reqwest::get(format!("http://{}/api/hits", addr))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(json["total_hits"], 1);
        assert_eq!(json["requester_ip"], "127.0.0.1");

        let page = reqwest::get(format!("http://{}/embed/abc", addr))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(page.contains("src=\"abc\""));
    }
}
