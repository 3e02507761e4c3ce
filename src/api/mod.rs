//! API Module
//!
//! HTTP handlers and routing that expose the navigation cache as a JSON API.
//!
//! # Endpoints
//! - `GET /cache` - Read a navigation list by `tags` + `mode`
//! - `PUT /cache` - Store a navigation list
//! - `DELETE /cache` - Remove a navigation list
//! - `GET|PUT|DELETE /metadata` - Database metadata record
//! - `POST /cache/clear` - Remove all cache records
//! - `POST /cache/clear-expired` - Remove expired records
//! - `GET /stats` - Get cache statistics
//! - `GET|PUT /settings` - Cache preferences
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
