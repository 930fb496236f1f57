//! REST facade over the local snapshot (plus warehouse-backed and LLM routes).
//!
//! Each route group has its own `create_*_router` factory so tests can mount
//! a single group; `create_api_router` merges them all for the server binary.

use axum::Router;

pub mod connection_routes;
pub mod customer_routes;
pub mod llm_routes;
pub mod location_routes;
pub mod map_routes;
pub mod state;

pub use connection_routes::create_connection_router;
pub use customer_routes::create_customer_router;
pub use llm_routes::create_llm_router;
pub use location_routes::create_location_router;
pub use map_routes::create_map_router;
pub use state::AppState;

pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .merge(create_location_router(state.clone()))
        .merge(create_connection_router(state.clone()))
        .merge(create_map_router(state.clone()))
        .merge(create_customer_router(state.clone()))
        .merge(create_llm_router(state))
}
