//! Storage for saved conversations. The whole archive is kept as one
//! ordered list, most recent first.

use std::sync::Mutex;

use anyhow::{Context, Error, Result, anyhow};
use async_trait::async_trait;
use tokio_rusqlite::Connection;

use super::models::ChatRecord;
use crate::core::db::{kv_get, kv_set};

/// Key the archive is stored under in the key-value store
pub const CHAT_HISTORIES_KEY: &str = "chatHistories";

#[async_trait]
pub trait ChatStore {
    async fn load_all(&self) -> Result<Vec<ChatRecord>, Error>;

    /// Insert or replace the record with the same id and move it to
    /// the front. Returns the updated archive.
    async fn save_one(&self, record: ChatRecord) -> Result<Vec<ChatRecord>, Error>;

    /// Returns the updated archive.
    async fn delete_one(&self, id: &str) -> Result<Vec<ChatRecord>, Error>;
}

pub type BoxedChatStore = Box<dyn ChatStore + Send + Sync + 'static>;

fn upsert_front(mut records: Vec<ChatRecord>, record: ChatRecord) -> Vec<ChatRecord> {
    records.retain(|r| r.id != record.id);
    records.insert(0, record);
    records
}

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<ChatRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn load_all(&self) -> Result<Vec<ChatRecord>, Error> {
        let records = self.records.lock().map_err(|e| anyhow!("{}", e))?;
        Ok(records.clone())
    }

    async fn save_one(&self, record: ChatRecord) -> Result<Vec<ChatRecord>, Error> {
        let mut records = self.records.lock().map_err(|e| anyhow!("{}", e))?;
        *records = upsert_front(std::mem::take(&mut *records), record);
        Ok(records.clone())
    }

    async fn delete_one(&self, id: &str) -> Result<Vec<ChatRecord>, Error> {
        let mut records = self.records.lock().map_err(|e| anyhow!("{}", e))?;
        records.retain(|r| r.id != id);
        Ok(records.clone())
    }
}

/// Archive serialized as a JSON array under `CHAT_HISTORIES_KEY`,
/// rewritten in full on every change.
pub struct KvChatStore {
    db: Connection,
}

impl KvChatStore {
    pub fn new(db: Connection) -> Self {
        Self { db }
    }

    async fn write_all(&self, records: &[ChatRecord]) -> Result<(), Error> {
        let data = serde_json::to_string(records)?;
        kv_set(&self.db, CHAT_HISTORIES_KEY, &data).await
    }
}

#[async_trait]
impl ChatStore for KvChatStore {
    async fn load_all(&self) -> Result<Vec<ChatRecord>, Error> {
        match kv_get(&self.db, CHAT_HISTORIES_KEY).await? {
            Some(data) => serde_json::from_str(&data).context("Saved chats are corrupt"),
            None => Ok(Vec::new()),
        }
    }

    async fn save_one(&self, record: ChatRecord) -> Result<Vec<ChatRecord>, Error> {
        let records = upsert_front(self.load_all().await?, record);
        self.write_all(&records).await?;
        Ok(records)
    }

    async fn delete_one(&self, id: &str) -> Result<Vec<ChatRecord>, Error> {
        let mut records = self.load_all().await?;
        records.retain(|r| r.id != id);
        self.write_all(&records).await?;
        Ok(records)
    }
}
