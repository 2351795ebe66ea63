use async_trait::async_trait;
use crate::application::errors::StorageError;
use crate::domain::entities::{GuildId, GuildPolicyConfig};

/// ConfigStore trait - per-guild persistence of policy settings
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load a guild's config, falling back to defaults for unknown guilds
    async fn load(&self, guild: GuildId) -> Result<GuildPolicyConfig, StorageError>;

    /// Replace a guild's config
    async fn save(&self, guild: GuildId, config: &GuildPolicyConfig) -> Result<(), StorageError>;

    /// Forget a guild, e.g. after the bot was removed from it
    async fn remove(&self, guild: GuildId) -> Result<(), StorageError>;
}
