//! Liveness check

use std::sync::{Arc, RwLock};

use axum::{Router, routing::get};

use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

async fn health() -> &'static str {
    "ok"
}

pub fn router() -> Router<SharedState> {
    Router::new().route("/health", get(health))
}
