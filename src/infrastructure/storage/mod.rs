//! File-based storage implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::application::errors::StorageError;
use crate::domain::entities::{GuildId, GuildPolicyConfig};
use crate::domain::traits::ConfigStore;

/// JSON file-based store
///
/// Keeps every guild in memory and rewrites the whole file on each change.
/// Without a path it is purely in-memory.
pub struct JsonStore {
    path: Option<PathBuf>,
    guilds: Arc<RwLock<HashMap<GuildId, GuildPolicyConfig>>>,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            guilds: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            guilds: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Load existing state from disk, creating the parent directory if needed
    pub async fn init(&self) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let loaded: HashMap<GuildId, GuildPolicyConfig> = serde_json::from_str(&content)?;
                tracing::info!("Loaded settings for {} guilds from {}", loaded.len(), path.display());
                *self.guilds.write().await = loaded;
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn flush(&self, guilds: &HashMap<GuildId, GuildPolicyConfig>) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let content = serde_json::to_string_pretty(guilds)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for JsonStore {
    async fn load(&self, guild: GuildId) -> Result<GuildPolicyConfig, StorageError> {
        let guilds = self.guilds.read().await;
        Ok(guilds.get(&guild).cloned().unwrap_or_default())
    }

    async fn save(&self, guild: GuildId, config: &GuildPolicyConfig) -> Result<(), StorageError> {
        let mut guilds = self.guilds.write().await;
        let previous = guilds.insert(guild, config.clone());
        if let Err(e) = self.flush(&guilds).await {
            // Keep memory and disk in agreement
            match previous {
                Some(previous) => guilds.insert(guild, previous),
                None => guilds.remove(&guild),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn remove(&self, guild: GuildId) -> Result<(), StorageError> {
        let mut guilds = self.guilds.write().await;
        if guilds.remove(&guild).is_some() {
            self.flush(&guilds).await?;
        }
        Ok(())
    }
}
