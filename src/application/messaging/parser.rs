//! Message parser - Parses raw messages into structured commands

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::application::errors::CommandError;
use crate::domain::entities::{
    AdminCommand, ChannelId, Content, ForceLimitCommand, MemberId, Message, RawTarget, RoleId, Target,
    VipCommand,
};

static MEMBER_MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<@!?(\d+)>$").expect("valid regex"));
static ROLE_MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<@&(\d+)>$").expect("valid regex"));
static CHANNEL_MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<#(\d+)>$").expect("valid regex"));
static SNOWFLAKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{15,20}$").expect("valid regex"));

/// Parses incoming messages into structured Message objects
pub struct MessageParser {
    command_prefix: String,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.command_prefix
    }

    /// Split prefixed text into a command name and arguments
    pub fn parse_content(&self, text: &str) -> Content {
        let text = text.trim();
        let Some(cmd_text) = text.strip_prefix(self.command_prefix.as_str()) else {
            return if text.is_empty() {
                Content::Empty
            } else {
                Content::Text(text.to_string())
            };
        };

        let mut parts = cmd_text.split_whitespace().map(str::to_string);
        match parts.next() {
            Some(name) => Content::Command {
                name,
                args: parts.collect(),
            },
            None => Content::Text(text.to_string()),
        }
    }

    /// Parse the text of a message received in a channel
    pub fn parse(&self, channel_id: impl Into<ChannelId>, author: impl Into<MemberId>, text: &str) -> Message {
        Message::new(channel_id, author, self.parse_content(text))
    }
}

/// Turn a command message into an admin command.
///
/// Returns `Ok(None)` for messages that are not commands.
pub fn parse_command(content: &Content) -> Result<Option<AdminCommand>, CommandError> {
    let Content::Command { name, args } = content else {
        return Ok(None);
    };

    // Keywords are case-insensitive, target arguments are kept verbatim
    let keywords: Vec<String> = args.iter().take(2).map(|arg| arg.to_lowercase()).collect();
    let args: Vec<&str> = keywords
        .iter()
        .chain(args.iter().skip(2))
        .map(String::as_str)
        .collect();
    let command = match (name.to_lowercase().as_str(), args.as_slice()) {
        ("help", _) => AdminCommand::Help,
        ("version", _) => AdminCommand::Version,
        ("voicetools", ["forcelimit", rest @ ..]) => AdminCommand::ForceLimit(parse_forcelimit(rest)?),
        ("voicetools", ["vip", rest @ ..]) => AdminCommand::Vip(parse_vip(rest)?),
        ("voicetools", _) => {
            return Err(CommandError::InvalidArgs(
                "expected `voicetools forcelimit ...` or `voicetools vip ...`".to_string(),
            ))
        }
        (other, _) => return Err(CommandError::NotFound(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_forcelimit(args: &[&str]) -> Result<ForceLimitCommand, CommandError> {
    match args {
        ["enable"] => Ok(ForceLimitCommand::Enable),
        ["disable"] => Ok(ForceLimitCommand::Disable),
        ["ignorelist"] => Ok(ForceLimitCommand::IgnoreList),
        ["ignore", targets @ ..] => Ok(ForceLimitCommand::Ignore(parse_targets(targets)?)),
        ["unignore", targets @ ..] => Ok(ForceLimitCommand::Unignore(parse_targets(targets)?)),
        _ => Err(CommandError::InvalidArgs(
            "usage: voicetools forcelimit enable|disable|ignorelist|ignore|unignore".to_string(),
        )),
    }
}

fn parse_vip(args: &[&str]) -> Result<VipCommand, CommandError> {
    match args {
        ["enable"] => Ok(VipCommand::Enable),
        ["disable"] => Ok(VipCommand::Disable),
        ["list"] => Ok(VipCommand::List),
        ["add", targets @ ..] => Ok(VipCommand::Add(parse_targets(targets)?)),
        ["remove", targets @ ..] => Ok(VipCommand::Remove(parse_targets(targets)?)),
        _ => Err(CommandError::InvalidArgs(
            "usage: voicetools vip enable|disable|list|add|remove".to_string(),
        )),
    }
}

fn parse_targets(args: &[&str]) -> Result<Vec<RawTarget>, CommandError> {
    if args.is_empty() {
        return Err(CommandError::InvalidArgs(
            "expected at least one member, role or voice channel".to_string(),
        ));
    }
    Ok(args.iter().map(|arg| parse_target(arg)).collect())
}

fn capture_id(re: &Regex, arg: &str) -> Option<u64> {
    re.captures(arg)?.get(1)?.as_str().parse().ok()
}

/// Classify a single argument
pub fn parse_target(arg: &str) -> RawTarget {
    if let Some(id) = capture_id(&MEMBER_MENTION, arg) {
        return RawTarget::Mention(Target::Member(MemberId(id)));
    }
    if let Some(id) = capture_id(&ROLE_MENTION, arg) {
        return RawTarget::Mention(Target::Role(RoleId(id)));
    }
    if let Some(id) = capture_id(&CHANNEL_MENTION, arg) {
        return RawTarget::Mention(Target::Channel(ChannelId(id)));
    }
    if SNOWFLAKE.is_match(arg) {
        if let Ok(id) = arg.parse() {
            return RawTarget::Id(id);
        }
    }
    RawTarget::Name(arg.to_string())
}
