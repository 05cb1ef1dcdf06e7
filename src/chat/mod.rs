//! Chat conversations on the caller's side of the proxy.

mod models;
mod session;
pub mod store;

pub use models::{ChatMessage, ChatRecord, DEFAULT_TITLE, Role};
pub use session::{
    ChatSession, DEFAULT_IMAGE_PROMPT, MAX_IMAGE_BYTES, SessionError, image_data_uri,
};
pub use store::{BoxedChatStore, ChatStore, KvChatStore, MemoryStore};
