//! Discord adapter

mod host;

pub use host::DiscordHost;

use serenity::all::{
    Cache, ChannelId as DiscordChannelId, Client, Colour, Context, CreateEmbed, CreateEmbedFooter,
    CreateMessage, EventHandler, GatewayIntents, Guild, GuildId as DiscordGuildId, Http, Message as DiscordMessage,
    Ready, UnavailableGuild, VoiceState,
};
use serenity::async_trait;
use std::sync::Arc;

use crate::application::errors::BotError;
use crate::application::messaging::MessageDispatcher;
use crate::application::services::{CommandService, ListService, Reply, VoiceService};
use crate::domain::entities::{
    ChannelId, ChannelSnapshot, Content, GuildId, MemberId, Message, RoleId, VoiceTransitionEvent,
};
use crate::domain::listing::{self, ListingPage};
use crate::domain::traits::ConfigStore;

// Per-message caps enforced by Discord
const MAX_EMBEDS_PER_MESSAGE: usize = 10;
const MAX_EMBED_CHARS_PER_MESSAGE: usize = 6000;
const MAX_CONTENT_CHARS: usize = 2000;

/// Gateway intents needed for voice tracking and prefixed commands
pub fn required_intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS
}

/// Gateway event handler wiring Discord events into the services
pub struct Handler {
    store: Arc<dyn ConfigStore>,
    lists: Arc<ListService>,
    owners: Vec<MemberId>,
    prefix: String,
    temporary_channel_name: String,
}

impl Handler {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        lists: Arc<ListService>,
        owners: Vec<MemberId>,
        prefix: impl Into<String>,
        temporary_channel_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            lists,
            owners,
            prefix: prefix.into(),
            temporary_channel_name: temporary_channel_name.into(),
        }
    }

    fn host(&self, ctx: &Context) -> Arc<DiscordHost> {
        Arc::new(DiscordHost::new(ctx.http.clone(), ctx.cache.clone()))
    }

    fn dispatcher(&self, ctx: &Context) -> MessageDispatcher {
        let commands = CommandService::new(self.lists.clone(), self.host(ctx));
        MessageDispatcher::with_defaults(self.prefix.clone(), commands, self.owners.clone())
    }
}

/// Snapshot a voice channel from the cache after the state change was applied
fn snapshot(guild: &Guild, channel: DiscordChannelId) -> ChannelSnapshot {
    let capacity = guild
        .channels
        .get(&channel)
        .and_then(|c| c.user_limit)
        .unwrap_or(0);
    let occupants = guild
        .voice_states
        .values()
        .filter(|state| state.channel_id == Some(channel))
        .count() as u32;
    ChannelSnapshot::new(channel.get(), capacity, occupants)
}

/// Build the domain event for a voice-state update, if the guild is cached
fn transition(cache: &Cache, old: Option<&VoiceState>, new: &VoiceState) -> Option<VoiceTransitionEvent> {
    let guild_id = new.guild_id?;
    let guild = cache.guild(guild_id)?;

    let roles = new
        .member
        .as_ref()
        .map(|m| m.roles.clone())
        .or_else(|| guild.members.get(&new.user_id).map(|m| m.roles.clone()))
        .unwrap_or_default()
        .into_iter()
        .map(|role| RoleId(role.get()))
        .collect();

    let mut event = VoiceTransitionEvent::new(guild_id.get(), new.user_id.get()).with_roles(roles);
    if let Some(before) = old.and_then(|state| state.channel_id) {
        event = event.from_channel(snapshot(&guild, before));
    }
    if let Some(after) = new.channel_id {
        event = event.to_channel(snapshot(&guild, after));
    }
    Some(event)
}

fn page_embed(page: &ListingPage) -> CreateEmbed {
    page.fields.iter().fold(
        CreateEmbed::new()
            .title(&page.title)
            .colour(Colour::BLURPLE)
            .footer(CreateEmbedFooter::new(&page.footer)),
        |embed, (name, value)| embed.field(name, value, true),
    )
}

/// Pack notices, one per line, into messages within the content cap
fn notice_messages(notices: &[String]) -> Vec<String> {
    listing::pagify_on(&notices.join("\n"), "\n", MAX_CONTENT_CHARS)
}

/// Group consecutive pages so no message exceeds the embed count or the
/// combined embed character cap
fn group_pages(pages: &[ListingPage]) -> Vec<&[ListingPage]> {
    let mut groups = Vec::new();
    let mut start = 0;
    let mut chars = 0;
    for (idx, page) in pages.iter().enumerate() {
        let size = page.char_len();
        let full = idx - start == MAX_EMBEDS_PER_MESSAGE || chars + size > MAX_EMBED_CHARS_PER_MESSAGE;
        if idx > start && full {
            groups.push(&pages[start..idx]);
            start = idx;
            chars = 0;
        }
        chars += size;
    }
    if start < pages.len() {
        groups.push(&pages[start..]);
    }
    groups
}

/// Send notices as plain text and listing pages as embeds
async fn send_reply(http: &Arc<Http>, channel: DiscordChannelId, reply: &Reply) -> Result<(), serenity::Error> {
    for text in notice_messages(&reply.notices) {
        channel.say(http, text).await?;
    }
    if let Some(listing) = &reply.listing {
        for group in group_pages(listing.pages()) {
            let embeds = group.iter().map(page_embed).collect::<Vec<_>>();
            channel.send_message(http, CreateMessage::new().embeds(embeds)).await?;
        }
    }
    Ok(())
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        tracing::info!(
            "Connected to Discord as {} in {} guilds",
            ready.user.name,
            ready.guilds.len()
        );
    }

    async fn voice_state_update(&self, ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        let Some(event) = transition(&ctx.cache, old.as_ref(), &new) else {
            tracing::debug!("Ignoring voice update outside a cached guild");
            return;
        };
        let voice = VoiceService::new(self.store.clone(), self.host(&ctx))
            .with_temporary_channel_name(self.temporary_channel_name.clone());
        voice.handle(&event).await;
    }

    async fn message(&self, ctx: Context, msg: DiscordMessage) {
        if msg.author.bot || !msg.content.starts_with(&self.prefix) {
            return;
        }

        let mut message = Message::new(ChannelId(msg.channel_id.get()), MemberId(msg.author.id.get()), Content::Empty)
            .with_id(msg.id.to_string());
        if let Some(guild_id) = msg.guild_id {
            message = message.with_guild(GuildId(guild_id.get()));
        }

        let Some(reply) = self.dispatcher(&ctx).process_text(message, &msg.content).await else {
            return;
        };
        if let Err(e) = send_reply(&ctx.http, msg.channel_id, &reply).await {
            tracing::warn!("Failed to send reply in channel {}: {}", msg.channel_id, e);
        }
    }

    async fn guild_delete(&self, _ctx: Context, incomplete: UnavailableGuild, _full: Option<Guild>) {
        // Outages also fire this event; only a real removal drops settings
        if incomplete.unavailable {
            return;
        }
        let guild: DiscordGuildId = incomplete.id;
        tracing::info!("Removed from guild {}, dropping its settings", guild);
        if let Err(e) = self.lists.forget(GuildId(guild.get())).await {
            tracing::warn!("Failed to drop settings for guild {}: {}", guild, e);
        }
    }
}

/// Connect to the gateway and run until the client stops
pub async fn run(token: &str, handler: Handler) -> Result<(), BotError> {
    let mut client = Client::builder(token, required_intents())
        .event_handler(handler)
        .await
        .map_err(|e| BotError::Network(format!("Failed to create Discord client: {}", e)))?;

    tracing::info!("Starting Discord bot");
    client
        .start()
        .await
        .map_err(|e| BotError::Network(format!("Discord client stopped: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ChannelId, GuildPolicyConfig, ListGroup};
    use crate::domain::listing::{render, DEFAULT_PAGE_LENGTH};

    const BASE: u64 = 123_456_789_012_345_000;

    #[test]
    fn test_large_listing_respects_embed_caps() {
        let config = GuildPolicyConfig {
            forcelimit_ignore_member_list: (0..120).map(|i| MemberId(BASE + i)).collect(),
            forcelimit_ignore_role_list: (0..120).map(|i| RoleId(BASE + i)).collect(),
            forcelimit_ignore_vc_list: (0..120).map(|i| ChannelId(BASE + i)).collect(),
            ..Default::default()
        };
        let listing = render(&config, ListGroup::Ignore, DEFAULT_PAGE_LENGTH);
        assert!(listing.pages().len() >= 3);

        let groups = group_pages(listing.pages());
        assert_eq!(groups.iter().map(|g| g.len()).sum::<usize>(), listing.pages().len());
        for group in &groups {
            assert!(group.len() <= MAX_EMBEDS_PER_MESSAGE);
            let chars: usize = group.iter().map(ListingPage::char_len).sum();
            assert!(chars <= MAX_EMBED_CHARS_PER_MESSAGE, "{} chars in one message", chars);
        }
    }

    #[test]
    fn test_small_pages_share_a_message_up_to_ten() {
        let page = ListingPage {
            title: "VIP List".to_string(),
            fields: vec![("Members".to_string(), "<@1>".to_string())],
            footer: "Page 1/1".to_string(),
        };
        let pages = vec![page; 12];
        let sizes: Vec<usize> = group_pages(&pages).iter().map(|g| g.len()).collect();
        assert_eq!(sizes, vec![10, 2]);
        assert!(group_pages(&[]).is_empty());
    }

    #[test]
    fn test_many_notices_are_split_across_messages() {
        let mut notices: Vec<String> = (0..50)
            .map(|i| format!("<@{}> is already on ignore list", BASE + i))
            .collect();
        notices.push("Ignore list updated".to_string());

        let messages = notice_messages(&notices);
        assert!(messages.len() > 1);
        assert!(messages.iter().all(|m| m.chars().count() <= MAX_CONTENT_CHARS));
        assert_eq!(messages.join("\n"), notices.join("\n"));
        assert_eq!(messages.last().map(|m| m.ends_with("Ignore list updated")), Some(true));
    }

    #[test]
    fn test_short_reply_is_one_message() {
        assert_eq!(notice_messages(&["VIP list updated".to_string()]), vec!["VIP list updated".to_string()]);
        assert!(notice_messages(&[]).is_empty());
    }
}
