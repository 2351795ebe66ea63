use async_trait::async_trait;
use crate::application::errors::HostError;
use crate::domain::entities::{ChannelId, GuildId, MemberId, RawTarget, Target};

/// VoiceHost trait - voice-channel primitives of the chat platform
#[async_trait]
pub trait VoiceHost: Send + Sync {
    /// Set a voice channel's user limit
    async fn set_channel_capacity(&self, guild: GuildId, channel: ChannelId, capacity: u32) -> Result<(), HostError>;

    /// Create a voice channel hidden from @everyone but visible to the bot
    async fn create_temporary_channel(&self, guild: GuildId, name: &str) -> Result<ChannelId, HostError>;

    /// Move a connected member to another voice channel
    async fn move_member(&self, guild: GuildId, member: MemberId, channel: ChannelId) -> Result<(), HostError>;

    /// Delete a channel
    async fn delete_channel(&self, guild: GuildId, channel: ChannelId) -> Result<(), HostError>;
}

/// TargetResolver trait - turns command arguments into typed targets
#[async_trait]
pub trait TargetResolver: Send + Sync {
    /// Resolve an argument within a guild, `None` when nothing matches
    async fn resolve(&self, guild: GuildId, raw: &RawTarget) -> Result<Option<Target>, HostError>;
}
