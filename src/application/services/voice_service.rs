use std::sync::Arc;

use crate::application::errors::HostError;
use crate::domain::entities::{Action, ChannelId, GuildId, MemberId, VoiceTransitionEvent};
use crate::domain::policy;
use crate::domain::traits::{ConfigStore, VoiceHost};

/// Name of the channel used to disconnect members
pub const DEFAULT_TEMPORARY_CHANNEL_NAME: &str = "Temporary Channel (ForceLimit Module)";

/// Service handling voice-state transitions
///
/// Each event is evaluated once against a fresh config snapshot. Host
/// failures are logged and swallowed so one bad event never blocks the next.
pub struct VoiceService {
    store: Arc<dyn ConfigStore>,
    host: Arc<dyn VoiceHost>,
    temporary_channel_name: String,
}

impl VoiceService {
    pub fn new(store: Arc<dyn ConfigStore>, host: Arc<dyn VoiceHost>) -> Self {
        Self {
            store,
            host,
            temporary_channel_name: DEFAULT_TEMPORARY_CHANNEL_NAME.to_string(),
        }
    }

    pub fn with_temporary_channel_name(mut self, name: impl Into<String>) -> Self {
        self.temporary_channel_name = name.into();
        self
    }

    /// Evaluate an event and carry out the resulting actions.
    /// Returns the actions that were attempted.
    pub async fn handle(&self, event: &VoiceTransitionEvent) -> Vec<Action> {
        let config = match self.store.load(event.guild).await {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to load config for guild {}: {}", event.guild, e);
                return Vec::new();
            }
        };

        let actions = policy::evaluate(event, &config);
        for action in &actions {
            self.execute(event.guild, action).await;
        }
        actions
    }

    async fn execute(&self, guild: GuildId, action: &Action) {
        match *action {
            Action::SetChannelCapacity { channel, capacity, vip } => {
                match self.host.set_channel_capacity(guild, channel, capacity).await {
                    Ok(()) => tracing::info!(
                        "VIP with ID {} moved through voice channel with ID {}, user limit is now {}",
                        vip,
                        channel,
                        capacity
                    ),
                    Err(e) => log_host_error("set user limit", channel, &e),
                }
            }
            Action::ForceDisconnect { member, channel } => {
                if self.force_disconnect(guild, member).await {
                    tracing::info!(
                        "Member with ID {} joined voice channel with ID {} exceeding its limit, disconnecting!",
                        member,
                        channel
                    );
                }
            }
        }
    }

    /// Disconnect a member by moving them into a throwaway channel and
    /// deleting it. The channel is deleted even when the move fails.
    async fn force_disconnect(&self, guild: GuildId, member: MemberId) -> bool {
        let temp = match self
            .host
            .create_temporary_channel(guild, &self.temporary_channel_name)
            .await
        {
            Ok(channel) => channel,
            Err(e) => {
                tracing::warn!("Failed to create temporary channel in guild {}: {}", guild, e);
                return false;
            }
        };

        let moved = match self.host.move_member(guild, member, temp).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to move member {} in guild {}: {}", member, guild, e);
                false
            }
        };

        if let Err(e) = self.host.delete_channel(guild, temp).await {
            log_host_error("delete temporary channel", temp, &e);
        }
        moved
    }
}

fn log_host_error(what: &str, channel: ChannelId, e: &HostError) {
    if e.is_not_found() {
        tracing::warn!("Could not {} for channel {}, it no longer exists", what, channel);
    } else {
        tracing::warn!("Could not {} for channel {}: {}", what, channel, e);
    }
}
