//! Discord implementation of the host primitives

use async_trait::async_trait;
use serenity::all::{
    Cache, ChannelId as DiscordChannelId, ChannelType, CreateChannel, EditChannel, GuildId as DiscordGuildId,
    Http, PermissionOverwrite, PermissionOverwriteType, Permissions, RoleId as DiscordRoleId,
    UserId as DiscordUserId,
};
use std::sync::Arc;

use crate::application::errors::HostError;
use crate::domain::entities::{ChannelId, GuildId, MemberId, RawTarget, RoleId, Target};
use crate::domain::traits::{TargetResolver, VoiceHost};

/// Voice primitives and directory lookups backed by the Discord API
pub struct DiscordHost {
    http: Arc<Http>,
    cache: Arc<Cache>,
}

impl DiscordHost {
    pub fn new(http: Arc<Http>, cache: Arc<Cache>) -> Self {
        Self { http, cache }
    }
}

// Serenity ids panic on zero
fn guild_id(id: GuildId) -> Result<DiscordGuildId, HostError> {
    match id.get() {
        0 => Err(HostError::NotFound("guild 0".to_string())),
        id => Ok(DiscordGuildId::new(id)),
    }
}

fn channel_id(id: ChannelId) -> Result<DiscordChannelId, HostError> {
    match id.get() {
        0 => Err(HostError::NotFound("channel 0".to_string())),
        id => Ok(DiscordChannelId::new(id)),
    }
}

fn user_id(id: MemberId) -> Result<DiscordUserId, HostError> {
    match id.get() {
        0 => Err(HostError::NotFound("member 0".to_string())),
        id => Ok(DiscordUserId::new(id)),
    }
}

/// Map a serenity error, treating HTTP 404 as a vanished object
fn host_error(e: serenity::Error, what: String) -> HostError {
    let not_found = match &e {
        serenity::Error::Http(http) => http.status_code().map(|s| s.as_u16() == 404).unwrap_or(false),
        _ => false,
    };
    if not_found {
        HostError::NotFound(what)
    } else {
        HostError::Rejected(format!("{}: {}", what, e))
    }
}

#[async_trait]
impl VoiceHost for DiscordHost {
    async fn set_channel_capacity(&self, _guild: GuildId, channel: ChannelId, capacity: u32) -> Result<(), HostError> {
        channel_id(channel)?
            .edit(&self.http, EditChannel::new().user_limit(capacity))
            .await
            .map_err(|e| host_error(e, format!("channel {}", channel)))?;
        Ok(())
    }

    async fn create_temporary_channel(&self, guild: GuildId, name: &str) -> Result<ChannelId, HostError> {
        let discord_guild = guild_id(guild)?;
        let bot = self.cache.current_user().id;
        let overwrites = vec![
            PermissionOverwrite {
                allow: Permissions::empty(),
                deny: Permissions::VIEW_CHANNEL,
                kind: PermissionOverwriteType::Role(DiscordRoleId::new(guild.everyone_role().get())),
            },
            PermissionOverwrite {
                allow: Permissions::VIEW_CHANNEL,
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Member(bot),
            },
        ];
        let builder = CreateChannel::new(name)
            .kind(ChannelType::Voice)
            .permissions(overwrites);
        let channel = discord_guild
            .create_channel(&self.http, builder)
            .await
            .map_err(|e| host_error(e, format!("guild {}", guild)))?;
        Ok(ChannelId(channel.id.get()))
    }

    async fn move_member(&self, guild: GuildId, member: MemberId, channel: ChannelId) -> Result<(), HostError> {
        guild_id(guild)?
            .move_member(&self.http, user_id(member)?, channel_id(channel)?)
            .await
            .map_err(|e| host_error(e, format!("member {}", member)))?;
        Ok(())
    }

    async fn delete_channel(&self, _guild: GuildId, channel: ChannelId) -> Result<(), HostError> {
        channel_id(channel)?
            .delete(&self.http)
            .await
            .map_err(|e| host_error(e, format!("channel {}", channel)))?;
        Ok(())
    }
}

#[async_trait]
impl TargetResolver for DiscordHost {
    async fn resolve(&self, guild: GuildId, raw: &RawTarget) -> Result<Option<Target>, HostError> {
        let discord_guild = guild_id(guild)?;

        let cached = {
            let Some(cached_guild) = self.cache.guild(discord_guild) else {
                return Err(HostError::NotFound(format!("guild {}", guild)));
            };
            let has_voice = |id: u64| {
                id != 0
                    && cached_guild
                        .channels
                        .get(&DiscordChannelId::new(id))
                        .map(|c| c.kind == ChannelType::Voice)
                        .unwrap_or(false)
            };
            let has_role = |id: u64| id != 0 && cached_guild.roles.contains_key(&DiscordRoleId::new(id));
            let has_member = |id: u64| id != 0 && cached_guild.members.contains_key(&DiscordUserId::new(id));

            match raw {
                RawTarget::Mention(Target::Channel(id)) => has_voice(id.get()).then_some(Target::Channel(*id)),
                RawTarget::Mention(Target::Role(id)) => has_role(id.get()).then_some(Target::Role(*id)),
                RawTarget::Mention(Target::Member(id)) => has_member(id.get()).then_some(Target::Member(*id)),
                RawTarget::Id(id) => {
                    let id = *id;
                    if has_voice(id) {
                        Some(Target::Channel(ChannelId(id)))
                    } else if has_role(id) {
                        Some(Target::Role(RoleId(id)))
                    } else if has_member(id) {
                        Some(Target::Member(MemberId(id)))
                    } else {
                        None
                    }
                }
                RawTarget::Name(name) => cached_guild
                    .member_named(name)
                    .map(|m| Target::Member(MemberId(m.user.id.get())))
                    .or_else(|| {
                        cached_guild
                            .roles
                            .values()
                            .find(|r| r.name == *name)
                            .map(|r| Target::Role(RoleId(r.id.get())))
                    })
                    .or_else(|| {
                        cached_guild
                            .channels
                            .values()
                            .find(|c| c.kind == ChannelType::Voice && c.name == *name)
                            .map(|c| Target::Channel(ChannelId(c.id.get())))
                    }),
            }
        };

        if cached.is_some() {
            return Ok(cached);
        }

        // Members are often missing from the cache without the members intent
        let member = match raw {
            RawTarget::Id(id) => *id,
            RawTarget::Mention(Target::Member(id)) => id.get(),
            _ => return Ok(None),
        };
        if member == 0 {
            return Ok(None);
        }
        match discord_guild.member(&self.http, DiscordUserId::new(member)).await {
            Ok(found) => Ok(Some(Target::Member(MemberId(found.user.id.get())))),
            Err(e) => match host_error(e, format!("member {}", member)) {
                HostError::NotFound(_) => Ok(None),
                other => Err(other),
            },
        }
    }
}
