use std::fmt;

use super::ids::{ChannelId, GuildId, MemberId, RoleId};

/// State of a voice channel as observed right after a voice-state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSnapshot {
    pub id: ChannelId,
    /// User limit, 0 means unlimited
    pub capacity: u32,
    /// Members currently connected, including the one who just moved
    pub occupants: u32,
}

impl ChannelSnapshot {
    pub fn new(id: impl Into<ChannelId>, capacity: u32, occupants: u32) -> Self {
        Self {
            id: id.into(),
            capacity,
            occupants,
        }
    }

    pub fn is_limited(&self) -> bool {
        self.capacity != 0
    }
}

/// A member's voice-state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceTransitionEvent {
    pub guild: GuildId,
    pub member: MemberId,
    pub roles: Vec<RoleId>,
    pub before: Option<ChannelSnapshot>,
    pub after: Option<ChannelSnapshot>,
}

impl VoiceTransitionEvent {
    pub fn new(guild: impl Into<GuildId>, member: impl Into<MemberId>) -> Self {
        Self {
            guild: guild.into(),
            member: member.into(),
            roles: Vec::new(),
            before: None,
            after: None,
        }
    }

    pub fn with_roles(mut self, roles: Vec<RoleId>) -> Self {
        self.roles = roles;
        self
    }

    pub fn from_channel(mut self, channel: ChannelSnapshot) -> Self {
        self.before = Some(channel);
        self
    }

    pub fn to_channel(mut self, channel: ChannelSnapshot) -> Self {
        self.after = Some(channel);
        self
    }

    /// True when the member changed channel, including joining from or
    /// leaving to "no channel". Mute/deafen updates are not transitions.
    pub fn changed_channel(&self) -> bool {
        self.before.map(|c| c.id) != self.after.map(|c| c.id)
    }
}

/// Which VIP rule matched a member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VipMatch {
    Member(MemberId),
    Role(RoleId),
}

impl fmt::Display for VipMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VipMatch::Member(id) => write!(f, "{} (member)", id),
            VipMatch::Role(id) => write!(f, "{} (role)", id),
        }
    }
}

/// Side effect requested from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SetChannelCapacity {
        channel: ChannelId,
        capacity: u32,
        vip: VipMatch,
    },
    ForceDisconnect {
        member: MemberId,
        channel: ChannelId,
    },
}
