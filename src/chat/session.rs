//! A chat session: the conversation being written, its pending image
//! attachments and the archive of saved conversations.

use std::path::Path;

use anyhow::{Error, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use futures::StreamExt;
use thiserror::Error;
use uuid::Uuid;

use super::models::{ChatMessage, ChatRecord, Role};
use super::store::BoxedChatStore;
use crate::client::ProxyClient;
use crate::stream::{AssistantDraft, DecoderLimits, decode_stream};

/// Sent in place of text when only images were attached
pub const DEFAULT_IMAGE_PROMPT: &str = "ما هذا في الصورة؟";
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Error, Debug, PartialEq)]
pub enum SessionError {
    #[error("Nothing to send")]
    EmptyMessage,

    #[error("حجم الصورة يجب أن يكون أقل من 5 ميجابايت")]
    ImageTooLarge,

    #[error("Unsupported image type: {0}")]
    UnsupportedImage(String),

    #[error("Chat {0} not found")]
    ChatNotFound(String),
}

fn image_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

pub fn image_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

pub struct ChatSession {
    client: ProxyClient,
    store: BoxedChatStore,
    limits: DecoderLimits,
    messages: Vec<ChatMessage>,
    pending_images: Vec<String>,
    current_chat_id: Option<String>,
    archive: Vec<ChatRecord>,
}

impl ChatSession {
    /// Start an empty session, reading the saved archive once.
    pub async fn open(client: ProxyClient, store: BoxedChatStore) -> Result<Self, Error> {
        let archive = store.load_all().await?;
        Ok(Self {
            client,
            store,
            limits: DecoderLimits::default(),
            messages: Vec::new(),
            pending_images: Vec::new(),
            current_chat_id: None,
            archive,
        })
    }

    pub fn with_limits(mut self, limits: DecoderLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn archive(&self) -> &[ChatRecord] {
        &self.archive
    }

    pub fn current_chat_id(&self) -> Option<&str> {
        self.current_chat_id.as_deref()
    }

    pub fn pending_images(&self) -> &[String] {
        &self.pending_images
    }

    /// Attach an image file to the next message.
    pub async fn attach_image(&mut self, path: &Path) -> Result<(), Error> {
        let mime_type = image_mime_type(path)
            .ok_or_else(|| SessionError::UnsupportedImage(path.display().to_string()))?;
        let metadata = tokio::fs::metadata(path).await?;
        if metadata.len() > MAX_IMAGE_BYTES {
            return Err(SessionError::ImageTooLarge.into());
        }
        let bytes = tokio::fs::read(path).await?;
        self.pending_images.push(image_data_uri(mime_type, &bytes));
        Ok(())
    }

    pub fn remove_image(&mut self, index: usize) -> Option<String> {
        (index < self.pending_images.len()).then(|| self.pending_images.remove(index))
    }

    /// Send a message and stream the reply. `on_update` receives the
    /// full assistant text after every delta. On failure the
    /// conversation is left with the user's message but without the
    /// partial reply. The conversation is saved either way.
    ///
    /// Taking `&mut self` means a session can only have one exchange
    /// in flight.
    pub async fn send<F>(&mut self, text: &str, on_update: F) -> Result<String, Error>
    where
        F: FnMut(&str),
    {
        let text = text.trim();
        if text.is_empty() && self.pending_images.is_empty() {
            return Err(SessionError::EmptyMessage.into());
        }
        let content = if text.is_empty() {
            DEFAULT_IMAGE_PROMPT
        } else {
            text
        };
        let images = std::mem::take(&mut self.pending_images);
        self.messages
            .push(ChatMessage::new_with_images(Role::User, content, images));

        // Private copy of the conversation for this exchange
        let submitted = self.messages.clone();
        let result = self.stream_reply(&submitted, on_update).await;

        if let Err(e) = &result {
            tracing::error!("Chat exchange failed: {:#}", e);
            self.messages = submitted;
        }

        let saved = self.save_current().await;
        if let Err(e) = &saved {
            tracing::error!("Failed to save chat: {:#}", e);
        }
        let reply = result?;
        saved?;

        Ok(reply)
    }

    async fn stream_reply<F>(
        &mut self,
        submitted: &[ChatMessage],
        mut on_update: F,
    ) -> Result<String, Error>
    where
        F: FnMut(&str),
    {
        let response = self.client.chat(submitted).await?;

        self.messages.push(ChatMessage::new(Role::Assistant, ""));
        let mut draft = AssistantDraft::new();
        let mut deltas = Box::pin(decode_stream(response.bytes_stream(), self.limits));

        while let Some(delta) = deltas.next().await {
            let text = draft.push(&delta?);
            if let Some(last) = self.messages.last_mut() {
                last.content = text.to_string();
            }
            on_update(text);
        }

        Ok(draft.into_text())
    }

    async fn save_current(&mut self) -> Result<(), Error> {
        if self.messages.is_empty() {
            return Ok(());
        }
        let id = self
            .current_chat_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let record = ChatRecord::new(&id, self.messages.clone());
        self.archive = self.store.save_one(record).await?;
        self.current_chat_id = Some(id);
        Ok(())
    }

    /// Start over with an empty conversation. The previous one stays in
    /// the archive.
    pub fn new_chat(&mut self) {
        self.messages.clear();
        self.pending_images.clear();
        self.current_chat_id = None;
    }

    pub fn load(&mut self, id: &str) -> Result<(), Error> {
        let record = self
            .archive
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| SessionError::ChatNotFound(id.to_string()))?;
        self.messages = record.messages.clone();
        self.current_chat_id = Some(record.id.clone());
        Ok(())
    }

    /// Delete a saved conversation. Deleting the open one also clears
    /// it.
    pub async fn delete(&mut self, id: &str) -> Result<(), Error> {
        self.archive = self.store.delete_one(id).await?;
        if self.current_chat_id.as_deref() == Some(id) {
            self.messages.clear();
            self.current_chat_id = None;
        }
        Ok(())
    }
}
