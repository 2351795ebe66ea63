use super::ids::{ChannelId, GuildId, MemberId};

/// Message content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Command { name: String, args: Vec<String> },
    Empty,
}

impl Content {
    pub fn is_command(&self) -> bool {
        matches!(self, Content::Command { .. })
    }
}

/// Represents an incoming chat message
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub guild_id: Option<GuildId>,
    pub channel_id: ChannelId,
    pub author: MemberId,
    pub content: Content,
}

impl Message {
    pub fn new(channel_id: impl Into<ChannelId>, author: impl Into<MemberId>, content: Content) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            guild_id: None,
            channel_id: channel_id.into(),
            author: author.into(),
            content,
        }
    }

    pub fn with_guild(mut self, guild_id: impl Into<GuildId>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}
