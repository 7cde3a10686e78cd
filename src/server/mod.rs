//! Axum-based HTTP server for the oai2claude gateway.
//!
//! - `handlers`: the individual endpoints (chat completions, messages, models,
//!   health, metrics).
//! - `middleware`: request ID tracking.
//! - `routes`: router assembly and shared state.

mod handlers;
mod middleware;
mod routes;

pub use handlers::HealthResponse;
pub use routes::{create_router, AppState, MAX_BODY_BYTES};
