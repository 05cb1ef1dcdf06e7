//! The core models for a chat conversation and its saved snapshot.
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::gateway;

pub const DEFAULT_TITLE: &str = "محادثة جديدة";
const TITLE_CHARS: usize = 50;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

impl From<Role> for gateway::Role {
    fn from(role: Role) -> Self {
        match role {
            Role::User => gateway::Role::User,
            Role::Assistant => gateway::Role::Assistant,
        }
    }
}

/// One turn of a conversation. Images are data URIs.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl ChatMessage {
    pub fn new(role: Role, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
            images: None,
        }
    }

    pub fn new_with_images(role: Role, content: &str, images: Vec<String>) -> Self {
        Self {
            role,
            content: content.to_string(),
            images: if images.is_empty() { None } else { Some(images) },
        }
    }

    pub fn images(&self) -> &[String] {
        self.images.as_deref().unwrap_or_default()
    }

    pub fn to_gateway(&self) -> gateway::Message {
        gateway::Message::new_with_images(self.role.into(), &self.content, self.images())
    }
}

/// A saved snapshot of a conversation. The id stays the same for
/// every save of the same conversation.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ChatRecord {
    pub id: String,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    /// Milliseconds since the unix epoch
    pub timestamp: i64,
}

impl ChatRecord {
    pub fn new(id: &str, messages: Vec<ChatMessage>) -> Self {
        Self {
            id: id.to_string(),
            title: Self::title_for(&messages),
            messages,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// First characters of the first message's text.
    pub fn title_for(messages: &[ChatMessage]) -> String {
        match messages.first() {
            Some(msg) if !msg.content.is_empty() => msg.content.chars().take(TITLE_CHARS).collect(),
            _ => DEFAULT_TITLE.to_string(),
        }
    }
}
