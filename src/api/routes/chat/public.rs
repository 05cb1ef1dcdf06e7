//! Public types for the chat API
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chat::ChatMessage;
use crate::core::ProxyError;

/// Shown when the gateway fails for any reason other than rate or
/// quota limits.
pub const CHAT_FAILED: &str = "خطأ في المحادثة";

#[derive(Serialize, Deserialize, Debug)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

/// Validate the `messages` field of a chat request body. The field is
/// read loosely so a missing or mistyped value gets a proper error
/// instead of an extractor rejection.
pub fn parse_messages(payload: &Value) -> Result<Vec<ChatMessage>, ProxyError> {
    let messages = match payload.get("messages") {
        Some(Value::Array(messages)) if !messages.is_empty() => messages,
        _ => return Err(ProxyError::MissingMessages),
    };

    messages
        .iter()
        .map(|m| {
            serde_json::from_value::<ChatMessage>(m.clone())
                .map_err(|e| ProxyError::InvalidMessage(e.to_string()))
        })
        .collect()
}
