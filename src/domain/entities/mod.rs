//! Domain entities - Core business objects with no external dependencies

pub mod ids;
pub mod policy;
pub mod voice;
pub mod target;
pub mod message;
pub mod command;

pub use ids::{GuildId, MemberId, RoleId, ChannelId};
pub use policy::{GuildPolicyConfig, ListCategory, ListGroup, Feature, ListOutcome, ToggleOutcome};
pub use voice::{VoiceTransitionEvent, ChannelSnapshot, Action, VipMatch};
pub use target::{Target, RawTarget};
pub use message::{Message, Content};
pub use command::{AdminCommand, ForceLimitCommand, VipCommand, HELP_TEXT};
