use super::policy::Feature;
use super::target::RawTarget;

/// Usage overview returned by `help`
pub const HELP_TEXT: &str = "\
Available commands:
  voicetools forcelimit enable|disable - Toggle the ForceLimit module
  voicetools forcelimit ignore <targets...> - Ignore members, roles or voice channels
  voicetools forcelimit unignore <targets...> - Stop ignoring members, roles or voice channels
  voicetools forcelimit ignorelist - Show the ignore list
  voicetools vip enable|disable - Toggle the VIP module
  voicetools vip add <targets...> - Add members or roles to the VIP list
  voicetools vip remove <targets...> - Remove members or roles from the VIP list
  voicetools vip list - Show the VIP list
  help - Show this message
  version - Show version";

/// ForceLimit subcommands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForceLimitCommand {
    Enable,
    Disable,
    IgnoreList,
    Ignore(Vec<RawTarget>),
    Unignore(Vec<RawTarget>),
}

/// VIP subcommands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VipCommand {
    Enable,
    Disable,
    List,
    Add(Vec<RawTarget>),
    Remove(Vec<RawTarget>),
}

/// A parsed administrative command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    Help,
    Version,
    ForceLimit(ForceLimitCommand),
    Vip(VipCommand),
}

impl AdminCommand {
    /// `voicetools` commands need a guild and the bot owner
    pub fn is_privileged(&self) -> bool {
        matches!(self, AdminCommand::ForceLimit(_) | AdminCommand::Vip(_))
    }

    /// Feature and requested state, for enable/disable commands
    pub fn toggle(&self) -> Option<(Feature, bool)> {
        match self {
            AdminCommand::ForceLimit(ForceLimitCommand::Enable) => Some((Feature::ForceLimit, true)),
            AdminCommand::ForceLimit(ForceLimitCommand::Disable) => Some((Feature::ForceLimit, false)),
            AdminCommand::Vip(VipCommand::Enable) => Some((Feature::Vip, true)),
            AdminCommand::Vip(VipCommand::Disable) => Some((Feature::Vip, false)),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AdminCommand::Help => "help",
            AdminCommand::Version => "version",
            AdminCommand::ForceLimit(cmd) => match cmd {
                ForceLimitCommand::Enable => "voicetools forcelimit enable",
                ForceLimitCommand::Disable => "voicetools forcelimit disable",
                ForceLimitCommand::IgnoreList => "voicetools forcelimit ignorelist",
                ForceLimitCommand::Ignore(_) => "voicetools forcelimit ignore",
                ForceLimitCommand::Unignore(_) => "voicetools forcelimit unignore",
            },
            AdminCommand::Vip(cmd) => match cmd {
                VipCommand::Enable => "voicetools vip enable",
                VipCommand::Disable => "voicetools vip disable",
                VipCommand::List => "voicetools vip list",
                VipCommand::Add(_) => "voicetools vip add",
                VipCommand::Remove(_) => "voicetools vip remove",
            },
        }
    }
}
