//! API Module
//!
//! HTTP handlers and routing for a cache node.
//!
//! # Endpoints
//! - `GET /_cache/:group/:key` - Peer protocol (base path configurable)
//! - `GET /api/:group/:key` - Front-end lookup
//! - `GET /stats` - Group statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
