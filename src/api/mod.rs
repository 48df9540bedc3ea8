//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `PUT /store` - Store a value under a generated key
//! - `GET /get/:key` - Retrieve a value by key
//! - `GET /replay/:name` - Replay a tracked operation
//! - `GET /page?url=` - Fetch a page through the TTL cache
//! - `GET /stats` - Get store statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
