//! Console adapter for development/testing
//!
//! Simulates a single guild in memory so both the admin commands and the
//! voice rules can be exercised without a Discord connection.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::application::errors::HostError;
use crate::application::messaging::MessageDispatcher;
use crate::application::services::{Reply, VoiceService};
use crate::domain::entities::{
    ChannelId, ChannelSnapshot, Content, GuildId, MemberId, Message, RawTarget, RoleId, Target, VoiceTransitionEvent,
};
use crate::domain::traits::{TargetResolver, VoiceHost};

/// Guild id used by the simulation
pub const CONSOLE_GUILD: GuildId = GuildId(1);

const CONSOLE_CHANNEL: ChannelId = ChannelId(2);

#[derive(Debug, Clone)]
struct SimChannel {
    name: String,
    capacity: u32,
    hidden: bool,
}

#[derive(Debug, Default)]
struct SimGuild {
    channels: BTreeMap<ChannelId, SimChannel>,
    roles: BTreeMap<RoleId, String>,
    member_roles: BTreeMap<MemberId, Vec<RoleId>>,
    voice: BTreeMap<MemberId, ChannelId>,
    next_id: u64,
}

impl SimGuild {
    fn seeded() -> Self {
        let mut guild = Self {
            next_id: 5000,
            ..Default::default()
        };
        for (id, name, capacity) in [(1001, "lobby", 0), (1002, "duo", 2), (1003, "squad", 4)] {
            guild.channels.insert(
                ChannelId(id),
                SimChannel {
                    name: name.to_string(),
                    capacity,
                    hidden: false,
                },
            );
        }
        guild.roles.insert(RoleId(2001), "Moderators".to_string());
        guild.roles.insert(RoleId(2002), "Streamers".to_string());
        guild
    }

    fn snapshot(&self, channel: ChannelId) -> Option<ChannelSnapshot> {
        let sim = self.channels.get(&channel)?;
        let occupants = self.voice.values().filter(|c| **c == channel).count() as u32;
        Some(ChannelSnapshot::new(channel, sim.capacity, occupants))
    }

    fn channel_by_name(&self, name: &str) -> Option<ChannelId> {
        self.channels
            .iter()
            .find(|(_, c)| c.name.eq_ignore_ascii_case(name))
            .map(|(id, _)| *id)
    }

    fn role_by_name(&self, name: &str) -> Option<RoleId> {
        self.roles
            .iter()
            .find(|(_, r)| r.eq_ignore_ascii_case(name))
            .map(|(id, _)| *id)
    }

    fn describe(&self) -> String {
        let mut out = String::new();
        for (id, channel) in &self.channels {
            let members: Vec<String> = self
                .voice
                .iter()
                .filter(|(_, c)| *c == id)
                .map(|(m, _)| m.to_string())
                .collect();
            let limit = if channel.capacity == 0 {
                "unlimited".to_string()
            } else {
                channel.capacity.to_string()
            };
            out.push_str(&format!(
                "  #{} ({}) limit={} members=[{}]{}\n",
                channel.name,
                id,
                limit,
                members.join(", "),
                if channel.hidden { " hidden" } else { "" }
            ));
        }
        for (id, name) in &self.roles {
            out.push_str(&format!("  @{} ({})\n", name, id));
        }
        out
    }
}

/// Console bot adapter for local development
pub struct ConsoleAdapter {
    guild: Mutex<SimGuild>,
}

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self {
            guild: Mutex::new(SimGuild::seeded()),
        }
    }

    fn with_guild<T>(&self, f: impl FnOnce(&mut SimGuild) -> T) -> T {
        let mut guild = self.guild.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guild)
    }

    /// Move a member (or disconnect with `None`) and build the event
    pub fn simulate_move(&self, member: MemberId, to: Option<ChannelId>) -> Result<VoiceTransitionEvent, HostError> {
        self.with_guild(|guild| {
            if let Some(channel) = to {
                if !guild.channels.contains_key(&channel) {
                    return Err(HostError::NotFound(format!("channel {}", channel)));
                }
            }
            let from = guild.voice.get(&member).copied();
            match to {
                Some(channel) => guild.voice.insert(member, channel),
                None => guild.voice.remove(&member),
            };
            let roles = guild.member_roles.get(&member).cloned().unwrap_or_default();
            Ok(VoiceTransitionEvent {
                guild: CONSOLE_GUILD,
                member,
                roles,
                before: from.and_then(|c| guild.snapshot(c)),
                after: to.and_then(|c| guild.snapshot(c)),
            })
        })
    }

    pub fn set_limit(&self, channel: ChannelId, capacity: u32) -> Result<(), HostError> {
        self.with_guild(|guild| match guild.channels.get_mut(&channel) {
            Some(sim) => {
                sim.capacity = capacity;
                Ok(())
            }
            None => Err(HostError::NotFound(format!("channel {}", channel))),
        })
    }

    pub fn grant_role(&self, member: MemberId, role: RoleId) -> Result<(), HostError> {
        self.with_guild(|guild| {
            if !guild.roles.contains_key(&role) {
                return Err(HostError::NotFound(format!("role {}", role)));
            }
            let roles = guild.member_roles.entry(member).or_default();
            if !roles.contains(&role) {
                roles.push(role);
            }
            Ok(())
        })
    }

    pub fn channel_of(&self, member: MemberId) -> Option<ChannelId> {
        self.with_guild(|guild| guild.voice.get(&member).copied())
    }

    pub fn capacity_of(&self, channel: ChannelId) -> Option<u32> {
        self.with_guild(|guild| guild.channels.get(&channel).map(|c| c.capacity))
    }

    pub fn channel_count(&self) -> usize {
        self.with_guild(|guild| guild.channels.len())
    }

    pub fn describe(&self) -> String {
        self.with_guild(|guild| guild.describe())
    }

    fn channel_arg(&self, arg: &str) -> Option<ChannelId> {
        match crate::application::messaging::parser::parse_target(arg) {
            RawTarget::Mention(Target::Channel(id)) => Some(id),
            RawTarget::Id(id) => Some(ChannelId(id)),
            _ => arg.parse().ok().or_else(|| self.with_guild(|g| g.channel_by_name(arg))),
        }
    }

    fn role_arg(&self, arg: &str) -> Option<RoleId> {
        match crate::application::messaging::parser::parse_target(arg) {
            RawTarget::Mention(Target::Role(id)) => Some(id),
            _ => arg.parse().ok().or_else(|| self.with_guild(|g| g.role_by_name(arg))),
        }
    }

    /// Handle a simulation command, `None` if the line is not one
    async fn simulate(&self, line: &str, voice: &VoiceService) -> Option<String> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let result = match parts.as_slice() {
            ["state"] => Ok(self.describe()),
            ["limit", channel, n] => {
                let Some(channel) = self.channel_arg(channel) else {
                    return Some(format!("unknown channel {}", channel));
                };
                let Ok(n) = n.parse() else {
                    return Some(format!("invalid limit {}", n));
                };
                self.set_limit(channel, n).map(|()| format!("limit of {} set to {}", channel, n))
            }
            ["role", member, role] => {
                let (Ok(member), Some(role)) = (member.parse::<MemberId>(), self.role_arg(role)) else {
                    return Some("usage: role <member-id> <role>".to_string());
                };
                self.grant_role(member, role).map(|()| format!("{} now has role {}", member, role))
            }
            ["join", member, channel] => {
                let (Ok(member), Some(channel)) = (member.parse::<MemberId>(), self.channel_arg(channel)) else {
                    return Some("usage: join <member-id> <channel>".to_string());
                };
                self.voice_event(member, Some(channel), voice).await
            }
            ["leave", member] => {
                let Ok(member) = member.parse::<MemberId>() else {
                    return Some("usage: leave <member-id>".to_string());
                };
                self.voice_event(member, None, voice).await
            }
            _ => return None,
        };
        Some(result.unwrap_or_else(|e| e.to_string()))
    }

    async fn voice_event(
        &self,
        member: MemberId,
        to: Option<ChannelId>,
        voice: &VoiceService,
    ) -> Result<String, HostError> {
        let event = self.simulate_move(member, to)?;
        let actions = voice.handle(&event).await;
        let location = self
            .channel_of(member)
            .map(|c| c.to_string())
            .unwrap_or_else(|| "no channel".to_string());
        Ok(format!("{} actions, {} is now in {}", actions.len(), member, location))
    }

    /// Read lines from stdin until EOF
    pub async fn run(&self, dispatcher: &MessageDispatcher, voice: &VoiceService, author: MemberId) -> std::io::Result<()> {
        tracing::info!("Starting console bot (dev mode)");
        println!(
            "Console mode. Commands use prefix `{}`; simulation: state, join <member> <channel>, leave <member>, limit <channel> <n>, role <member> <role>",
            dispatcher.parser().prefix()
        );
        println!("{}", self.describe());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if matches!(line, "quit" | "exit") {
                break;
            }

            if let Some(out) = self.simulate(line, voice).await {
                println!("[SIM] {}", out.trim_end());
                continue;
            }

            let message = Message::new(CONSOLE_CHANNEL, author, Content::Empty)
                .with_guild(CONSOLE_GUILD);
            match dispatcher.process_text(message, line).await {
                Some(reply) => print_reply(&reply),
                None => println!("[BOT] (no response)"),
            }
        }
        Ok(())
    }
}

fn print_reply(reply: &Reply) {
    for notice in &reply.notices {
        println!("[BOT] {}", notice);
    }
    if let Some(listing) = &reply.listing {
        println!("{}", listing.to_text());
    }
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoiceHost for ConsoleAdapter {
    async fn set_channel_capacity(&self, _guild: GuildId, channel: ChannelId, capacity: u32) -> Result<(), HostError> {
        self.set_limit(channel, capacity)?;
        println!("[HOST] user limit of {} set to {}", channel, capacity);
        Ok(())
    }

    async fn create_temporary_channel(&self, _guild: GuildId, name: &str) -> Result<ChannelId, HostError> {
        let id = self.with_guild(|guild| {
            guild.next_id += 1;
            let id = ChannelId(guild.next_id);
            guild.channels.insert(
                id,
                SimChannel {
                    name: name.to_string(),
                    capacity: 0,
                    hidden: true,
                },
            );
            id
        });
        println!("[HOST] created hidden channel {} ({})", name, id);
        Ok(id)
    }

    async fn move_member(&self, _guild: GuildId, member: MemberId, channel: ChannelId) -> Result<(), HostError> {
        self.with_guild(|guild| {
            if !guild.voice.contains_key(&member) {
                return Err(HostError::Rejected(format!("{} is not connected to voice", member)));
            }
            if !guild.channels.contains_key(&channel) {
                return Err(HostError::NotFound(format!("channel {}", channel)));
            }
            guild.voice.insert(member, channel);
            Ok(())
        })?;
        println!("[HOST] moved {} to {}", member, channel);
        Ok(())
    }

    async fn delete_channel(&self, _guild: GuildId, channel: ChannelId) -> Result<(), HostError> {
        self.with_guild(|guild| {
            guild
                .channels
                .remove(&channel)
                .ok_or_else(|| HostError::NotFound(format!("channel {}", channel)))?;
            guild.voice.retain(|_, c| *c != channel);
            Ok(())
        })?;
        println!("[HOST] deleted channel {}", channel);
        Ok(())
    }
}

#[async_trait]
impl TargetResolver for ConsoleAdapter {
    async fn resolve(&self, _guild: GuildId, raw: &RawTarget) -> Result<Option<Target>, HostError> {
        Ok(self.with_guild(|guild| match raw {
            // Any member id is a simulated member
            RawTarget::Mention(Target::Member(id)) => Some(Target::Member(*id)),
            RawTarget::Mention(Target::Role(id)) => guild.roles.contains_key(id).then_some(Target::Role(*id)),
            RawTarget::Mention(Target::Channel(id)) => {
                guild.channels.contains_key(id).then_some(Target::Channel(*id))
            }
            RawTarget::Id(id) => {
                if guild.channels.contains_key(&ChannelId(*id)) {
                    Some(Target::Channel(ChannelId(*id)))
                } else if guild.roles.contains_key(&RoleId(*id)) {
                    Some(Target::Role(RoleId(*id)))
                } else {
                    Some(Target::Member(MemberId(*id)))
                }
            }
            RawTarget::Name(name) => guild
                .role_by_name(name)
                .map(Target::Role)
                .or_else(|| guild.channel_by_name(name).map(Target::Channel)),
        }))
    }
}
