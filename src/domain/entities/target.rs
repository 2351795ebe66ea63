use std::fmt;

use super::ids::{ChannelId, MemberId, RoleId};

/// A resolved command argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Member(MemberId),
    Role(RoleId),
    Channel(ChannelId),
}

impl Target {
    /// Discord mention markup
    pub fn mention(&self) -> String {
        match self {
            Target::Member(id) => format!("<@{}>", id),
            Target::Role(id) => format!("<@&{}>", id),
            Target::Channel(id) => format!("<#{}>", id),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mention())
    }
}

/// A command argument before resolution against the guild directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawTarget {
    /// Explicit mention, already typed
    Mention(Target),
    /// Bare snowflake, could be a member, role or channel
    Id(u64),
    /// Anything else, looked up by name
    Name(String),
}

impl fmt::Display for RawTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawTarget::Mention(target) => write!(f, "{}", target),
            RawTarget::Id(id) => write!(f, "{}", id),
            RawTarget::Name(name) => write!(f, "{}", name),
        }
    }
}
