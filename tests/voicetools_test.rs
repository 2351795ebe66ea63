//! End-to-end tests: admin commands through the dispatcher, then voice
//! events against the simulated guild.
//! Run with: cargo test --test voicetools_test

use std::sync::{Arc, Once};

use voicetools_bot::application::messaging::MessageDispatcher;
use voicetools_bot::application::services::{CommandService, ListService, VoiceService};
use voicetools_bot::domain::entities::{ChannelId, Content, MemberId, Message, RoleId};
use voicetools_bot::domain::traits::ConfigStore;
use voicetools_bot::infrastructure::adapters::console::{ConsoleAdapter, CONSOLE_GUILD};
use voicetools_bot::infrastructure::database::Database;
use voicetools_bot::infrastructure::storage::JsonStore;

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

const OWNER: MemberId = MemberId(100);
const DUO: ChannelId = ChannelId(1002);
const SQUAD: ChannelId = ChannelId(1003);
const STREAMERS: RoleId = RoleId(2002);

struct Bot {
    adapter: Arc<ConsoleAdapter>,
    dispatcher: MessageDispatcher,
    voice: VoiceService,
}

impl Bot {
    fn new(store: Arc<dyn ConfigStore>) -> Self {
        ensure_init();
        let adapter = Arc::new(ConsoleAdapter::new());
        let lists = Arc::new(ListService::new(store.clone()));
        let commands = CommandService::new(lists, adapter.clone());
        let dispatcher = MessageDispatcher::with_defaults("!", commands, vec![OWNER]);
        let voice = VoiceService::new(store, adapter.clone());
        Self { adapter, dispatcher, voice }
    }

    async fn say(&self, author: MemberId, text: &str) -> String {
        let message = Message::new(2u64, author, Content::Empty).with_guild(CONSOLE_GUILD);
        self.dispatcher
            .process_text(message, text)
            .await
            .map(|reply| {
                let mut out = reply.notices.join("\n");
                if let Some(listing) = reply.listing {
                    out.push_str(&listing.to_text());
                }
                out
            })
            .unwrap_or_default()
    }

    async fn join(&self, member: u64, channel: ChannelId) {
        let event = self.adapter.simulate_move(MemberId(member), Some(channel)).unwrap();
        self.voice.handle(&event).await;
    }

    async fn leave(&self, member: u64) {
        let event = self.adapter.simulate_move(MemberId(member), None).unwrap();
        self.voice.handle(&event).await;
    }
}

#[tokio::test]
async fn test_forcelimit_enforced_after_enable_command() {
    let bot = Bot::new(Arc::new(JsonStore::in_memory()));

    for member in 1..=3 {
        bot.join(member, DUO).await;
    }
    assert_eq!(bot.adapter.channel_of(MemberId(3)), Some(DUO), "disabled module leaves overflow alone");
    bot.leave(3).await;

    assert_eq!(
        bot.say(OWNER, "!voicetools forcelimit enable").await,
        "ForceLimit module is now enabled on this server"
    );

    let channels = bot.adapter.channel_count();
    bot.join(4, DUO).await;
    assert_eq!(bot.adapter.channel_of(MemberId(4)), None);
    assert_eq!(bot.adapter.channel_count(), channels, "temporary channel is cleaned up");
}

#[tokio::test]
async fn test_ignored_role_may_overflow() {
    let bot = Bot::new(Arc::new(JsonStore::in_memory()));
    bot.say(OWNER, "!voicetools forcelimit enable").await;
    assert_eq!(bot.say(OWNER, "!voicetools forcelimit ignore Streamers").await, "Ignore list updated");
    assert_eq!(
        bot.say(OWNER, "!voicetools forcelimit ignore Streamers").await,
        "<@&2002> is already on ignore list\nIgnore list updated"
    );

    bot.adapter.grant_role(MemberId(9), STREAMERS).unwrap();
    bot.join(1, DUO).await;
    bot.join(2, DUO).await;
    bot.join(9, DUO).await;
    assert_eq!(bot.adapter.channel_of(MemberId(9)), Some(DUO));

    let listing = bot.say(OWNER, "!voicetools forcelimit ignorelist").await;
    assert!(listing.contains("<@&2002>"), "{}", listing);
}

#[tokio::test]
async fn test_vip_member_gets_extra_slot() {
    let bot = Bot::new(Arc::new(JsonStore::in_memory()));
    bot.say(OWNER, "!voicetools vip enable").await;
    bot.say(OWNER, "!voicetools forcelimit enable").await;
    assert_eq!(bot.say(OWNER, "!voicetools vip add <@7>").await, "VIP list updated");

    for member in 1..=4 {
        bot.join(member, SQUAD).await;
    }
    bot.join(7, SQUAD).await;
    assert_eq!(bot.adapter.capacity_of(SQUAD), Some(5));
    assert_eq!(bot.adapter.channel_of(MemberId(7)), Some(SQUAD));

    bot.leave(7).await;
    assert_eq!(bot.adapter.capacity_of(SQUAD), Some(4));
}

#[tokio::test]
async fn test_non_owner_cannot_change_settings() {
    let bot = Bot::new(Arc::new(JsonStore::in_memory()));
    assert_eq!(
        bot.say(MemberId(5), "!voicetools forcelimit enable").await,
        "Only the bot owner can use this command"
    );

    bot.join(1, DUO).await;
    bot.join(2, DUO).await;
    bot.join(3, DUO).await;
    assert_eq!(bot.adapter.channel_of(MemberId(3)), Some(DUO));
}

#[tokio::test]
async fn test_settings_survive_restart_with_sqlite() {
    let path = std::env::temp_dir().join(format!("voicetools-it-{}.db", uuid::Uuid::new_v4()));

    {
        let bot = Bot::new(Arc::new(Database::new(&path).unwrap()));
        bot.say(OWNER, "!voicetools forcelimit enable").await;
        bot.say(OWNER, "!voicetools forcelimit ignore <#1002>").await;
    }

    let bot = Bot::new(Arc::new(Database::new(&path).unwrap()));
    for member in 1..=3 {
        bot.join(member, DUO).await;
    }
    assert_eq!(bot.adapter.channel_of(MemberId(3)), Some(DUO), "ignored channel is exempt");

    bot.join(4, ChannelId(1001)).await;
    bot.adapter.set_limit(ChannelId(1001), 1).unwrap();
    bot.join(5, ChannelId(1001)).await;
    assert_eq!(bot.adapter.channel_of(MemberId(5)), None);

    let _ = std::fs::remove_file(&path);
}
