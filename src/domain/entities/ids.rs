use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

snowflake!(
    /// A guild (server) identifier
    GuildId
);
snowflake!(
    /// A guild member (user) identifier
    MemberId
);
snowflake!(
    /// A role identifier
    RoleId
);
snowflake!(
    /// A channel identifier
    ChannelId
);

impl GuildId {
    /// The @everyone role shares its id with the guild
    pub const fn everyone_role(self) -> RoleId {
        RoleId(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let id: MemberId = "123456789012345678".parse().unwrap();
        assert_eq!(id.get(), 123456789012345678);
        assert_eq!(id.to_string(), "123456789012345678");
        assert!("abc".parse::<RoleId>().is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&ChannelId::new(42)).unwrap();
        assert_eq!(json, "42");
        let back: ChannelId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ChannelId(42));
    }

    #[test]
    fn test_everyone_role_shares_guild_id() {
        assert_eq!(GuildId(555).everyone_role(), RoleId(555));
    }
}
