//! API routes module

pub mod chat;
mod health;
pub mod poetry;

use std::sync::{Arc, RwLock};

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<RwLock<AppState>>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Streaming chat relay
        .nest("/chat", chat::router())
        // Buffered poetry generation
        .nest("/generate-poetry", poetry::router())
}

/// Routes served outside of the functions prefix
pub fn health_router() -> Router<SharedState> {
    health::router()
}
