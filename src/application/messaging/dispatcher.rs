//! Message dispatcher - Routes command messages to the command service

use std::sync::Arc;
use tracing::Instrument;
use crate::application::errors::CommandError;
use crate::application::services::{CommandService, Reply};
use crate::domain::entities::{Content, MemberId, Message};
use super::parser::{self, MessageParser};
use super::middleware::{Context, Middleware, Next, GuildOnlyMiddleware, LoggingMiddleware, OwnerOnlyMiddleware};

/// Message dispatcher - routes messages through middleware to the command service
pub struct MessageDispatcher {
    parser: MessageParser,
    middleware: Vec<Arc<dyn Middleware>>,
    commands: CommandService,
}

impl MessageDispatcher {
    pub fn new(prefix: impl Into<String>, commands: CommandService) -> Self {
        Self {
            parser: MessageParser::new(prefix),
            middleware: Vec::new(),
            commands,
        }
    }

    /// Dispatcher with the standard chain: logging, guild-only, owner-only
    pub fn with_defaults(prefix: impl Into<String>, commands: CommandService, owners: Vec<MemberId>) -> Self {
        Self::new(prefix, commands)
            .with_middleware(LoggingMiddleware)
            .with_middleware(GuildOnlyMiddleware)
            .with_middleware(OwnerOnlyMiddleware::new(owners))
    }

    /// Add middleware to the chain
    pub fn with_middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub fn parser(&self) -> &MessageParser {
        &self.parser
    }

    /// Process a message whose text has not been parsed yet
    pub async fn process_text(&self, mut message: Message, text: &str) -> Option<Reply> {
        message.content = self.parser.parse_content(text);
        self.process(message).await
    }

    /// Process a message through the dispatcher.
    ///
    /// Returns `None` for messages that are not commands. Errors are turned
    /// into a reply for the invoking user.
    pub async fn process(&self, message: Message) -> Option<Reply> {
        if !message.content.is_command() {
            return None;
        }

        match self.run(message).await {
            Ok(reply) => Some(reply),
            Err(CommandError::NotFound(_)) => None,
            Err(e) => {
                tracing::debug!("Command failed: {}", e);
                Some(Reply::text(error_text(&e)))
            }
        }
    }

    async fn run(&self, message: Message) -> Result<Reply, CommandError> {
        let Some(command) = parser::parse_command(&message.content)? else {
            return Err(CommandError::NotFound(String::new()));
        };

        let ctx = Context::new(message, command);
        let ctx = Next::new(self.middleware.clone()).run(ctx)?;

        let span = tracing::debug_span!("command", id = %ctx.message.id, name = ctx.command.name());
        self.commands
            .execute(ctx.guild_id, &ctx.command)
            .instrument(span)
            .await
    }
}

fn error_text(e: &CommandError) -> String {
    match e {
        CommandError::ConfigUnavailable(_) => "Settings are unavailable right now, nothing was changed".to_string(),
        CommandError::PermissionDenied => "Only the bot owner can use this command".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::HostError;
    use crate::application::services::ListService;
    use crate::domain::entities::{GuildId, RawTarget, Target};
    use crate::domain::traits::TargetResolver;
    use crate::infrastructure::storage::JsonStore;
    use async_trait::async_trait;

    struct MentionsOnly;

    #[async_trait]
    impl TargetResolver for MentionsOnly {
        async fn resolve(&self, _guild: GuildId, raw: &RawTarget) -> Result<Option<Target>, HostError> {
            Ok(match raw {
                RawTarget::Mention(target) => Some(*target),
                _ => None,
            })
        }
    }

    fn dispatcher() -> MessageDispatcher {
        let lists = Arc::new(ListService::new(Arc::new(JsonStore::in_memory())));
        let commands = CommandService::new(lists, Arc::new(MentionsOnly));
        MessageDispatcher::with_defaults("!", commands, vec![MemberId(1)])
    }

    fn message(author: u64) -> Message {
        Message::new(50u64, author, Content::Empty).with_guild(9u64)
    }

    #[tokio::test]
    async fn test_owner_command_round_trip() {
        let dispatcher = dispatcher();
        let reply = dispatcher.process_text(message(1), "!voicetools vip add <@4> <@&5>").await;
        assert_eq!(reply, Some(Reply::text("VIP list updated")));

        let reply = dispatcher.process_text(message(1), "!voicetools vip add <@4>").await;
        assert_eq!(
            reply.map(|r| r.notices),
            Some(vec!["<@4> is already on list".to_string(), "VIP list updated".to_string()])
        );
    }

    #[tokio::test]
    async fn test_non_owner_gets_denied() {
        let reply = dispatcher().process_text(message(2), "!voicetools forcelimit enable").await;
        assert_eq!(reply, Some(Reply::text("Only the bot owner can use this command")));
    }

    #[tokio::test]
    async fn test_chatter_and_unknown_commands_are_ignored() {
        let dispatcher = dispatcher();
        assert_eq!(dispatcher.process_text(message(1), "good morning").await, None);
        assert_eq!(dispatcher.process_text(message(1), "!play despacito").await, None);
    }

    #[tokio::test]
    async fn test_bad_arguments_are_reported() {
        let reply = dispatcher().process_text(message(1), "!voicetools vip add someone").await;
        let text = reply.map(|r| r.notices.join("\n")).unwrap_or_default();
        assert!(text.contains("`someone` is not a member, role or voice channel"));
    }
}
