//! Router for the poetry API

use std::sync::{Arc, RwLock};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::core::{AppConfig, ProxyError};
use crate::gateway::{Message, Role, completion};
use crate::poetry::{PoetryStyle, user_prompt};

type SharedState = Arc<RwLock<AppState>>;

/// Generate a poem in one buffered gateway call
async fn generate_poetry(
    State(state): State<SharedState>,
    payload: Result<Json<public::PoetryRequest>, JsonRejection>,
) -> Result<Json<public::PoetryResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| ProxyError::InvalidBody(e.body_text()))?;
    let topic = payload
        .topic
        .filter(|t| !t.trim().is_empty())
        .ok_or(ProxyError::MissingTopic)?;
    let style = PoetryStyle::from_selector(payload.style.as_deref());

    let (api_hostname, api_key, model) = {
        let shared_state = state.read().expect("Unable to read share state");
        let AppConfig {
            gateway_api_hostname,
            gateway_api_key,
            gateway_model,
            ..
        } = &shared_state.config;
        (
            gateway_api_hostname.clone(),
            gateway_api_key.clone(),
            gateway_model.clone(),
        )
    };
    let api_key = api_key.ok_or(ProxyError::MissingApiKey)?;

    tracing::info!("Generating poetry for topic: {} style: {:?}", topic, style);

    let messages = vec![
        Message::new(Role::System, style.system_prompt()),
        Message::new(Role::User, &user_prompt(&topic)),
    ];
    let resp = completion(&messages, &api_hostname, &api_key, &model)
        .await
        .context(public::POETRY_FAILED)?;

    let poetry = resp["choices"][0]["message"]["content"]
        .as_str()
        .filter(|p| !p.trim().is_empty())
        .ok_or(ProxyError::EmptyCompletion)?
        .to_string();

    tracing::info!("Poetry generated successfully");

    Ok(Json(public::PoetryResponse { poetry }))
}

/// Create the poetry router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(generate_poetry))
}
