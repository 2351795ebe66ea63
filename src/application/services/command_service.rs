use std::sync::Arc;

use crate::application::errors::CommandError;
use crate::domain::entities::{
    AdminCommand, ForceLimitCommand, GuildId, ListGroup, RawTarget, Target, ToggleOutcome, VipCommand,
    HELP_TEXT,
};
use crate::domain::listing::Listing;
use crate::domain::traits::TargetResolver;
use crate::application::services::ListService;

/// Response to an admin command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    pub notices: Vec<String>,
    pub listing: Option<Listing>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            notices: vec![text.into()],
            listing: None,
        }
    }

    pub fn notices(notices: Vec<String>) -> Self {
        Self {
            notices,
            listing: None,
        }
    }

    /// Empty listings collapse into a single notice
    pub fn listing(listing: Listing) -> Self {
        match listing {
            Listing::Empty(message) => Self::text(message),
            pages => Self {
                notices: Vec::new(),
                listing: Some(pages),
            },
        }
    }
}

/// Service executing parsed admin commands
pub struct CommandService {
    lists: Arc<ListService>,
    resolver: Arc<dyn TargetResolver>,
}

impl CommandService {
    pub fn new(lists: Arc<ListService>, resolver: Arc<dyn TargetResolver>) -> Self {
        Self { lists, resolver }
    }

    pub fn lists(&self) -> &Arc<ListService> {
        &self.lists
    }

    pub async fn execute(&self, guild: Option<GuildId>, command: &AdminCommand) -> Result<Reply, CommandError> {
        match command {
            AdminCommand::Help => return Ok(Reply::text(HELP_TEXT)),
            AdminCommand::Version => {
                return Ok(Reply::text(format!("voicetools-bot v{}", env!("CARGO_PKG_VERSION"))))
            }
            _ => {}
        }

        let guild = guild.ok_or(CommandError::GuildOnly)?;

        if let Some((feature, enabled)) = command.toggle() {
            let outcome = self.lists.set_enabled(guild, feature, enabled).await?;
            let state = if enabled { "enabled" } else { "disabled" };
            let text = match outcome {
                ToggleOutcome::Changed => format!("{} module is now {} on this server", feature, state),
                ToggleOutcome::AlreadyInState => {
                    format!("{} module is already {} on this server", feature, state)
                }
            };
            return Ok(Reply::text(text));
        }

        match command {
            AdminCommand::ForceLimit(ForceLimitCommand::IgnoreList) => {
                Ok(Reply::listing(self.lists.render(guild, ListGroup::Ignore).await?))
            }
            AdminCommand::Vip(VipCommand::List) => Ok(Reply::listing(self.lists.render(guild, ListGroup::Vip).await?)),
            AdminCommand::ForceLimit(ForceLimitCommand::Ignore(raw)) => {
                let targets = self.resolve_all(guild, raw).await?;
                Ok(Reply::notices(self.lists.add_all(guild, ListGroup::Ignore, &targets).await?.notices()))
            }
            AdminCommand::ForceLimit(ForceLimitCommand::Unignore(raw)) => {
                let targets = self.resolve_all(guild, raw).await?;
                Ok(Reply::notices(self.lists.remove_all(guild, ListGroup::Ignore, &targets).await?.notices()))
            }
            AdminCommand::Vip(VipCommand::Add(raw)) => {
                let targets = self.resolve_all(guild, raw).await?;
                Ok(Reply::notices(self.lists.add_all(guild, ListGroup::Vip, &targets).await?.notices()))
            }
            AdminCommand::Vip(VipCommand::Remove(raw)) => {
                let targets = self.resolve_all(guild, raw).await?;
                Ok(Reply::notices(self.lists.remove_all(guild, ListGroup::Vip, &targets).await?.notices()))
            }
            other => Err(CommandError::NotFound(other.name().to_string())),
        }
    }

    /// Resolve every argument up front so a bad one aborts the whole batch.
    /// Mentions are checked too, they may name objects the guild does not have.
    async fn resolve_all(&self, guild: GuildId, raw: &[RawTarget]) -> Result<Vec<Target>, CommandError> {
        let mut targets = Vec::with_capacity(raw.len());
        for arg in raw {
            let target = self.resolver.resolve(guild, arg).await?.ok_or_else(|| {
                CommandError::InvalidArgs(format!("`{}` is not a member, role or voice channel", arg))
            })?;
            targets.push(target);
        }
        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::HostError;
    use crate::domain::entities::{ChannelId, MemberId, RoleId};
    use crate::infrastructure::storage::JsonStore;
    use async_trait::async_trait;

    const GUILD: GuildId = GuildId(1);

    /// Knows roles 8 and 77 (by name "Moderators"), voice channel 5, and
    /// treats any member id as present
    struct FixedResolver;

    #[async_trait]
    impl TargetResolver for FixedResolver {
        async fn resolve(&self, _guild: GuildId, raw: &RawTarget) -> Result<Option<Target>, HostError> {
            Ok(match raw {
                RawTarget::Mention(Target::Role(id)) => [8, 77].contains(&id.get()).then_some(Target::Role(*id)),
                RawTarget::Mention(Target::Channel(id)) => (id.get() == 5).then_some(Target::Channel(*id)),
                RawTarget::Mention(target) => Some(*target),
                RawTarget::Id(id) => Some(Target::Member(MemberId(*id))),
                RawTarget::Name(name) if name == "Moderators" => Some(Target::Role(RoleId(77))),
                RawTarget::Name(_) => None,
            })
        }
    }

    fn service() -> CommandService {
        let lists = Arc::new(ListService::new(Arc::new(JsonStore::in_memory())));
        CommandService::new(lists, Arc::new(FixedResolver))
    }

    #[tokio::test]
    async fn test_toggle_messages() {
        let service = service();
        let enable = AdminCommand::ForceLimit(ForceLimitCommand::Enable);
        assert_eq!(
            service.execute(Some(GUILD), &enable).await.unwrap(),
            Reply::text("ForceLimit module is now enabled on this server")
        );
        assert_eq!(
            service.execute(Some(GUILD), &enable).await.unwrap(),
            Reply::text("ForceLimit module is already enabled on this server")
        );
        assert_eq!(
            service.execute(Some(GUILD), &AdminCommand::Vip(VipCommand::Disable)).await.unwrap(),
            Reply::text("VIP module is already disabled on this server")
        );
    }

    #[tokio::test]
    async fn test_ignore_resolves_names_and_ids() {
        let service = service();
        let command = AdminCommand::ForceLimit(ForceLimitCommand::Ignore(vec![
            RawTarget::Name("Moderators".to_string()),
            RawTarget::Id(123456789012345678),
            RawTarget::Mention(Target::Channel(ChannelId(5))),
        ]));
        let reply = service.execute(Some(GUILD), &command).await.unwrap();
        assert_eq!(reply, Reply::text("Ignore list updated"));

        let config = service.lists().config(GUILD).await.unwrap();
        assert_eq!(config.forcelimit_ignore_role_list, vec![RoleId(77)]);
        assert_eq!(config.forcelimit_ignore_member_list, vec![MemberId(123456789012345678)]);
        assert_eq!(config.forcelimit_ignore_vc_list, vec![ChannelId(5)]);
    }

    #[tokio::test]
    async fn test_unresolved_target_aborts_batch() {
        let service = service();
        let command = AdminCommand::Vip(VipCommand::Add(vec![
            RawTarget::Mention(Target::Member(MemberId(3))),
            RawTarget::Name("nobody".to_string()),
        ]));
        let err = service.execute(Some(GUILD), &command).await.unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgs(_)));
        assert!(service.lists().config(GUILD).await.unwrap().vip_member_list.is_empty());
    }

    #[tokio::test]
    async fn test_mention_of_unknown_role_is_rejected() {
        let service = service();
        let command = AdminCommand::ForceLimit(ForceLimitCommand::Ignore(vec![
            RawTarget::Mention(Target::Role(RoleId(8))),
            RawTarget::Mention(Target::Role(RoleId(999))),
        ]));
        let err = service.execute(Some(GUILD), &command).await.unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgs(ref msg) if msg.contains("<@&999>")), "{:?}", err);
        assert!(service.lists().config(GUILD).await.unwrap().forcelimit_ignore_role_list.is_empty());
    }

    #[tokio::test]
    async fn test_empty_listing_is_single_notice() {
        let service = service();
        let reply = service
            .execute(Some(GUILD), &AdminCommand::ForceLimit(ForceLimitCommand::IgnoreList))
            .await
            .unwrap();
        assert_eq!(reply, Reply::text("Ignore list is empty"));
        assert!(reply.listing.is_none());
    }

    #[tokio::test]
    async fn test_vip_list_after_add() {
        let service = service();
        let add = AdminCommand::Vip(VipCommand::Add(vec![RawTarget::Mention(Target::Role(RoleId(8)))]));
        service.execute(Some(GUILD), &add).await.unwrap();

        let reply = service.execute(Some(GUILD), &AdminCommand::Vip(VipCommand::List)).await.unwrap();
        let listing = reply.listing.expect("listing");
        assert_eq!(listing.pages()[0].fields[1], ("Roles".to_string(), "<@&8>".to_string()));
    }

    #[tokio::test]
    async fn test_guild_commands_need_a_guild() {
        let service = service();
        let err = service.execute(None, &AdminCommand::Vip(VipCommand::List)).await.unwrap_err();
        assert!(matches!(err, CommandError::GuildOnly));
        assert!(service.execute(None, &AdminCommand::Help).await.is_ok());
    }
}
