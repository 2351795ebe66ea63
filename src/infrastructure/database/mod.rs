use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, Result as SqliteResult};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::application::errors::StorageError;
use crate::domain::entities::{GuildId, GuildPolicyConfig};
use crate::domain::traits::ConfigStore;

/// SQLite-backed guild settings, one JSON row per guild
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(path: impl AsRef<Path>) -> SqliteResult<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> SqliteResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> SqliteResult<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_tables()?;
        Ok(db)
    }

    fn init_tables(&self) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.execute(
            "CREATE TABLE IF NOT EXISTS guild_policies (
                guild_id INTEGER PRIMARY KEY,
                config TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;
        Ok(())
    }

    /// Run a closure on the connection off the async runtime
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StorageError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap_or_else(|e| e.into_inner());
            f(&conn)
        })
        .await
        .map_err(|e| StorageError::Unavailable(e.to_string()))?
    }

    /// Number of guilds with stored settings
    pub async fn guild_count(&self) -> Result<i64, StorageError> {
        self.with_conn(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM guild_policies", [], |row| row.get(0))?;
            Ok(count)
        })
        .await
    }
}

// Snowflakes fit in 63 bits, SQLite integers are signed
fn guild_key(guild: GuildId) -> i64 {
    guild.get() as i64
}

#[async_trait]
impl ConfigStore for Database {
    async fn load(&self, guild: GuildId) -> Result<GuildPolicyConfig, StorageError> {
        self.with_conn(move |conn| {
            let raw: Option<String> = conn
                .query_row(
                    "SELECT config FROM guild_policies WHERE guild_id = ?1",
                    [guild_key(guild)],
                    |row| row.get(0),
                )
                .optional()?;
            match raw {
                Some(raw) => Ok(serde_json::from_str(&raw)?),
                None => Ok(GuildPolicyConfig::default()),
            }
        })
        .await
    }

    async fn save(&self, guild: GuildId, config: &GuildPolicyConfig) -> Result<(), StorageError> {
        let raw = serde_json::to_string(config)?;
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO guild_policies (guild_id, config, updated_at)
                 VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT(guild_id) DO UPDATE SET config = excluded.config, updated_at = excluded.updated_at",
                rusqlite::params![guild_key(guild), raw],
            )?;
            Ok(())
        })
        .await
    }

    async fn remove(&self, guild: GuildId) -> Result<(), StorageError> {
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM guild_policies WHERE guild_id = ?1", [guild_key(guild)])?;
            Ok(())
        })
        .await
    }
}
