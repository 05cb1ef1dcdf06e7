//! Router for the chat API

use std::sync::{Arc, RwLock};

use anyhow::Context;
use axum::{
    Json, Router,
    body::Body,
    extract::{State, rejection::JsonRejection},
    http::header,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::Value;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::core::{AppConfig, ProxyError};
use crate::gateway::{Message, Role, completion_stream};

type SharedState = Arc<RwLock<AppState>>;

/// Relay a conversation to the gateway and stream the completion back
/// as it arrives
async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload.map_err(|e| ProxyError::InvalidBody(e.body_text()))?;
    let messages = public::parse_messages(&payload)?;

    let (api_hostname, api_key, model, system_message) = {
        let shared_state = state.read().expect("Unable to read share state");
        let AppConfig {
            gateway_api_hostname,
            gateway_api_key,
            gateway_model,
            system_message,
            ..
        } = &shared_state.config;
        (
            gateway_api_hostname.clone(),
            gateway_api_key.clone(),
            gateway_model.clone(),
            system_message.clone(),
        )
    };
    let api_key = api_key.ok_or(ProxyError::MissingApiKey)?;

    tracing::info!("Processing chat request with {} messages", messages.len());

    let mut transcript = vec![Message::new(Role::System, &system_message)];
    transcript.extend(messages.iter().map(|m| m.to_gateway()));

    let upstream = completion_stream(&transcript, &api_hostname, &api_key, &model)
        .await
        .context(public::CHAT_FAILED)?;

    // Relay the upstream body byte for byte
    let body = Body::from_stream(upstream.bytes_stream());
    let resp = ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response();

    Ok(resp)
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(chat_handler))
}
