//! Durable key-value storage backed by sqlite.

use anyhow::{Error, Result};
use tokio_rusqlite::Connection;

pub async fn async_db(db_path: &str) -> Result<Connection, Error> {
    let db = Connection::open(db_path).await?;
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await?;
    Ok(db)
}

pub async fn memory_db() -> Result<Connection, Error> {
    let db = Connection::open_in_memory().await?;
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await?;
    Ok(db)
}

pub fn initialize_db(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )
}

pub async fn kv_get(db: &Connection, key: &str) -> Result<Option<String>, Error> {
    let key = key.to_owned();
    let value = db
        .call(move |conn| {
            let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?")?;
            let mut rows = stmt.query_map([key], |row| row.get::<_, String>(0))?;
            let value = rows.next().transpose()?;
            Ok(value)
        })
        .await?;
    Ok(value)
}

pub async fn kv_set(db: &Connection, key: &str, value: &str) -> Result<(), Error> {
    let key = key.to_owned();
    let value = value.to_owned();
    db.call(move |conn| {
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}
