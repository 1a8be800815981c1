//! HTTP server module
//!
//! This module handles HTTP request routing and handling:
//! - Axum router with the player, source-info and health endpoints
//! - Player page handlers backed by the embed source cache
//! - JSON handlers for source info, hits, health and debug stats
//! - CORS and request tracing middleware

pub mod handlers;
pub mod player;
pub mod routes;

pub use routes::create_router;
