use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::application::errors::{CommandError, StorageError};
use crate::domain::entities::{
    Feature, GuildId, GuildPolicyConfig, ListCategory, ListGroup, ListOutcome, Target, ToggleOutcome,
};
use crate::domain::listing::{self, Listing, DEFAULT_PAGE_LENGTH};
use crate::domain::traits::ConfigStore;

/// Per-target results of a batch add or remove
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub group: ListGroup,
    pub outcomes: Vec<(Target, ListOutcome)>,
}

impl BatchReport {
    pub fn changed(&self) -> bool {
        self.outcomes
            .iter()
            .any(|(_, o)| matches!(o, ListOutcome::Added | ListOutcome::Removed))
    }

    /// User-facing notices: one per skipped target, then a summary line
    pub fn notices(&self) -> Vec<String> {
        let noun = self.group.noun();
        let mut notices: Vec<String> = self
            .outcomes
            .iter()
            .filter_map(|(target, outcome)| match outcome {
                ListOutcome::AlreadyPresent => Some(format!("{} is already on {}", target, noun)),
                ListOutcome::NotPresent => Some(format!("{} is not on {}", target, noun)),
                _ => None,
            })
            .collect();
        notices.push(self.group.updated_message().to_string());
        notices
    }
}

/// Service administering the ignore and VIP lists.
///
/// Mutations of one guild are serialized through a per-guild lock so that
/// concurrent commands cannot lose each other's read-modify-write.
pub struct ListService {
    store: Arc<dyn ConfigStore>,
    locks: Mutex<HashMap<GuildId, Arc<tokio::sync::Mutex<()>>>>,
    page_length: usize,
}

impl ListService {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
            page_length: DEFAULT_PAGE_LENGTH,
        }
    }

    pub fn with_page_length(mut self, page_length: usize) -> Self {
        self.page_length = page_length;
        self
    }

    fn guild_lock(&self, guild: GuildId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(guild).or_default().clone()
    }

    /// Read-modify-write a guild's config under its lock.
    /// The config is saved only when `apply` reports a change.
    async fn update<T, F>(&self, guild: GuildId, apply: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut GuildPolicyConfig) -> (T, bool),
    {
        let lock = self.guild_lock(guild);
        let _guard = lock.lock().await;

        let mut config = self.store.load(guild).await?;
        let (result, changed) = apply(&mut config);
        if changed {
            self.store.save(guild, &config).await?;
        }
        Ok(result)
    }

    pub async fn config(&self, guild: GuildId) -> Result<GuildPolicyConfig, StorageError> {
        self.store.load(guild).await
    }

    pub async fn add(&self, guild: GuildId, category: ListCategory, target: Target) -> Result<ListOutcome, StorageError> {
        self.update(guild, |config| {
            let outcome = config.add(category, target);
            (outcome, outcome == ListOutcome::Added)
        })
        .await
    }

    pub async fn remove(&self, guild: GuildId, category: ListCategory, target: Target) -> Result<ListOutcome, StorageError> {
        self.update(guild, |config| {
            let outcome = config.remove(category, target);
            (outcome, outcome == ListOutcome::Removed)
        })
        .await
    }

    pub async fn set_enabled(&self, guild: GuildId, feature: Feature, enabled: bool) -> Result<ToggleOutcome, StorageError> {
        let outcome = self
            .update(guild, |config| {
                let outcome = config.set_enabled(feature, enabled);
                (outcome, outcome == ToggleOutcome::Changed)
            })
            .await?;
        if outcome == ToggleOutcome::Changed {
            tracing::info!(
                "{} module {} on guild {}",
                feature,
                if enabled { "enabled" } else { "disabled" },
                guild
            );
        }
        Ok(outcome)
    }

    pub async fn enable(&self, guild: GuildId, feature: Feature) -> Result<ToggleOutcome, StorageError> {
        self.set_enabled(guild, feature, true).await
    }

    pub async fn disable(&self, guild: GuildId, feature: Feature) -> Result<ToggleOutcome, StorageError> {
        self.set_enabled(guild, feature, false).await
    }

    /// Add several targets to a group's lists in one locked update
    pub async fn add_all(&self, guild: GuildId, group: ListGroup, targets: &[Target]) -> Result<BatchReport, CommandError> {
        self.batch(guild, group, targets, GuildPolicyConfig::add).await
    }

    /// Remove several targets from a group's lists in one locked update
    pub async fn remove_all(&self, guild: GuildId, group: ListGroup, targets: &[Target]) -> Result<BatchReport, CommandError> {
        self.batch(guild, group, targets, GuildPolicyConfig::remove).await
    }

    async fn batch(
        &self,
        guild: GuildId,
        group: ListGroup,
        targets: &[Target],
        op: fn(&mut GuildPolicyConfig, ListCategory, Target) -> ListOutcome,
    ) -> Result<BatchReport, CommandError> {
        // Route every target before touching the store
        let routed = targets
            .iter()
            .map(|target| {
                ListCategory::for_target(group, target)
                    .map(|category| (category, *target))
                    .ok_or_else(|| {
                        CommandError::InvalidArgs(format!("{} is not a valid target for the {}", target, group.title()))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let report = self
            .update(guild, |config| {
                let outcomes: Vec<(Target, ListOutcome)> = routed
                    .iter()
                    .map(|(category, target)| (*target, op(config, *category, *target)))
                    .collect();
                let report = BatchReport { group, outcomes };
                let changed = report.changed();
                (report, changed)
            })
            .await?;

        tracing::debug!("Guild {}: {} batch {:?}", guild, group.title(), report.outcomes);
        Ok(report)
    }

    /// Render a group's lists as embed pages
    pub async fn render(&self, guild: GuildId, group: ListGroup) -> Result<Listing, StorageError> {
        let config = self.store.load(guild).await?;
        Ok(listing::render(&config, group, self.page_length))
    }

    /// Drop all stored settings of a guild.
    ///
    /// The guild's lock entry stays in place: tasks already queued on it must
    /// keep serializing with later callers.
    pub async fn forget(&self, guild: GuildId) -> Result<(), StorageError> {
        let lock = self.guild_lock(guild);
        let _guard = lock.lock().await;
        self.store.remove(guild).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ChannelId, MemberId, RoleId};
    use crate::infrastructure::storage::JsonStore;
    use async_trait::async_trait;

    const GUILD: GuildId = GuildId(1);

    fn service() -> ListService {
        ListService::new(Arc::new(JsonStore::in_memory()))
    }

    struct UnreachableStore;

    #[async_trait]
    impl ConfigStore for UnreachableStore {
        async fn load(&self, _guild: GuildId) -> Result<GuildPolicyConfig, StorageError> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn save(&self, _guild: GuildId, _config: &GuildPolicyConfig) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn remove(&self, _guild: GuildId) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_add_reports_already_present() {
        let service = service();
        let target = Target::Member(MemberId(5));
        assert_eq!(service.add(GUILD, ListCategory::VipMember, target).await.unwrap(), ListOutcome::Added);
        let before = service.config(GUILD).await.unwrap();
        assert_eq!(
            service.add(GUILD, ListCategory::VipMember, target).await.unwrap(),
            ListOutcome::AlreadyPresent
        );
        assert_eq!(service.config(GUILD).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_add_remove_round_trip_keeps_order() {
        let service = service();
        let roles = [RoleId(30), RoleId(10), RoleId(20)];
        for role in roles {
            service.add(GUILD, ListCategory::IgnoreRole, Target::Role(role)).await.unwrap();
        }
        let before = service.config(GUILD).await.unwrap();

        service.add(GUILD, ListCategory::IgnoreRole, Target::Role(RoleId(15))).await.unwrap();
        let outcome = service.remove(GUILD, ListCategory::IgnoreRole, Target::Role(RoleId(15))).await.unwrap();
        assert_eq!(outcome, ListOutcome::Removed);
        assert_eq!(service.config(GUILD).await.unwrap(), before);
        assert_eq!(before.forcelimit_ignore_role_list, roles.to_vec());
    }

    #[tokio::test]
    async fn test_toggle_reports_already_in_state() {
        let service = service();
        assert_eq!(service.disable(GUILD, Feature::ForceLimit).await.unwrap(), ToggleOutcome::AlreadyInState);
        assert_eq!(service.enable(GUILD, Feature::ForceLimit).await.unwrap(), ToggleOutcome::Changed);
        assert_eq!(service.enable(GUILD, Feature::ForceLimit).await.unwrap(), ToggleOutcome::AlreadyInState);
        assert!(service.config(GUILD).await.unwrap().forcelimit_enabled);
        assert!(!service.config(GuildId(2)).await.unwrap().forcelimit_enabled);
    }

    #[tokio::test]
    async fn test_batch_routes_targets_and_collects_notices() {
        let service = service();
        service.add(GUILD, ListCategory::IgnoreRole, Target::Role(RoleId(2))).await.unwrap();

        let targets = [Target::Member(MemberId(1)), Target::Role(RoleId(2)), Target::Channel(ChannelId(3))];
        let report = service.add_all(GUILD, ListGroup::Ignore, &targets).await.unwrap();
        assert_eq!(report.notices(), vec!["<@&2> is already on ignore list", "Ignore list updated"]);

        let config = service.config(GUILD).await.unwrap();
        assert_eq!(config.forcelimit_ignore_member_list, vec![MemberId(1)]);
        assert_eq!(config.forcelimit_ignore_vc_list, vec![ChannelId(3)]);

        let report = service.remove_all(GUILD, ListGroup::Ignore, &[Target::Member(MemberId(9))]).await.unwrap();
        assert_eq!(report.notices(), vec!["<@9> is not on ignore list", "Ignore list updated"]);
    }

    #[tokio::test]
    async fn test_vip_batch_rejects_channels_without_partial_update() {
        let service = service();
        let targets = [Target::Member(MemberId(1)), Target::Channel(ChannelId(3))];
        let err = service.add_all(GUILD, ListGroup::Vip, &targets).await.unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgs(_)));
        assert!(service.config(GUILD).await.unwrap().vip_member_list.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_store_is_config_unavailable() {
        let service = ListService::new(Arc::new(UnreachableStore));
        let err = service
            .add_all(GUILD, ListGroup::Vip, &[Target::Role(RoleId(1))])
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::ConfigUnavailable(_)));
        assert!(service.enable(GUILD, Feature::Vip).await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_adds_are_not_lost() {
        let service = Arc::new(service());
        let handles: Vec<_> = (0..32u64)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service.add(GUILD, ListCategory::VipMember, Target::Member(MemberId(i))).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(service.config(GUILD).await.unwrap().vip_member_list.len(), 32);
    }

    #[tokio::test]
    async fn test_render_and_forget() {
        let service = service();
        assert_eq!(
            service.render(GUILD, ListGroup::Ignore).await.unwrap(),
            Listing::Empty("Ignore list is empty".to_string())
        );
        service.add(GUILD, ListCategory::VipRole, Target::Role(RoleId(4))).await.unwrap();
        assert_eq!(service.render(GUILD, ListGroup::Vip).await.unwrap().pages().len(), 1);

        service.forget(GUILD).await.unwrap();
        assert_eq!(service.config(GUILD).await.unwrap(), GuildPolicyConfig::default());
    }

    #[tokio::test]
    async fn test_forget_keeps_guild_lock_shared() {
        let service = Arc::new(service());
        let lock = service.guild_lock(GUILD);
        let guard = lock.lock().await;

        let queued = {
            let service = service.clone();
            tokio::spawn(async move { service.forget(GUILD).await })
        };
        tokio::task::yield_now().await;
        drop(guard);
        queued.await.unwrap().unwrap();

        // Later callers must contend on the same lock the queued task used
        assert!(Arc::ptr_eq(&lock, &service.guild_lock(GUILD)));
    }
}
