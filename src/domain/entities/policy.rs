use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ChannelId, MemberId, RoleId};
use super::target::Target;

/// Per-guild VIP and ForceLimit settings
///
/// Every list keeps first-insertion order and never holds duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuildPolicyConfig {
    pub forcelimit_enabled: bool,
    pub forcelimit_ignore_member_list: Vec<MemberId>,
    pub forcelimit_ignore_role_list: Vec<RoleId>,
    pub forcelimit_ignore_vc_list: Vec<ChannelId>,
    pub vip_enabled: bool,
    pub vip_member_list: Vec<MemberId>,
    pub vip_role_list: Vec<RoleId>,
}

/// Toggleable module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    ForceLimit,
    Vip,
}

impl Feature {
    pub fn as_str(&self) -> &str {
        match self {
            Feature::ForceLimit => "ForceLimit",
            Feature::Vip => "VIP",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One of the five stored identifier lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListCategory {
    IgnoreMember,
    IgnoreRole,
    IgnoreChannel,
    VipMember,
    VipRole,
}

/// Lists that are administered and rendered together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListGroup {
    Ignore,
    Vip,
}

impl ListGroup {
    /// Categories in display order
    pub fn categories(&self) -> &'static [ListCategory] {
        match self {
            ListGroup::Ignore => &[
                ListCategory::IgnoreMember,
                ListCategory::IgnoreRole,
                ListCategory::IgnoreChannel,
            ],
            ListGroup::Vip => &[ListCategory::VipMember, ListCategory::VipRole],
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ListGroup::Ignore => "Ignore List",
            ListGroup::Vip => "VIP List",
        }
    }

    /// Short name used in user-facing notices ("is already on ignore list")
    pub fn noun(&self) -> &'static str {
        match self {
            ListGroup::Ignore => "ignore list",
            ListGroup::Vip => "list",
        }
    }

    pub fn empty_message(&self) -> &'static str {
        match self {
            ListGroup::Ignore => "Ignore list is empty",
            ListGroup::Vip => "VIP list is empty",
        }
    }

    pub fn updated_message(&self) -> &'static str {
        match self {
            ListGroup::Ignore => "Ignore list updated",
            ListGroup::Vip => "VIP list updated",
        }
    }
}

impl ListCategory {
    /// Route a resolved target to its list within a group.
    ///
    /// Returns `None` for channels in the VIP group, which has no channel list.
    pub fn for_target(group: ListGroup, target: &Target) -> Option<Self> {
        match (group, target) {
            (ListGroup::Ignore, Target::Member(_)) => Some(ListCategory::IgnoreMember),
            (ListGroup::Ignore, Target::Role(_)) => Some(ListCategory::IgnoreRole),
            (ListGroup::Ignore, Target::Channel(_)) => Some(ListCategory::IgnoreChannel),
            (ListGroup::Vip, Target::Member(_)) => Some(ListCategory::VipMember),
            (ListGroup::Vip, Target::Role(_)) => Some(ListCategory::VipRole),
            (ListGroup::Vip, Target::Channel(_)) => None,
        }
    }

    /// Embed field heading
    pub fn heading(&self) -> &'static str {
        match self {
            ListCategory::IgnoreMember | ListCategory::VipMember => "Members",
            ListCategory::IgnoreRole | ListCategory::VipRole => "Roles",
            ListCategory::IgnoreChannel => "Voice channels",
        }
    }
}

/// Result of an add or remove on a single list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOutcome {
    Added,
    AlreadyPresent,
    Removed,
    NotPresent,
}

/// Result of enabling or disabling a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Changed,
    AlreadyInState,
}

fn insert<T: PartialEq>(list: &mut Vec<T>, id: T) -> ListOutcome {
    if list.contains(&id) {
        ListOutcome::AlreadyPresent
    } else {
        list.push(id);
        ListOutcome::Added
    }
}

fn delete<T: PartialEq>(list: &mut Vec<T>, id: &T) -> ListOutcome {
    match list.iter().position(|x| x == id) {
        Some(idx) => {
            list.remove(idx);
            ListOutcome::Removed
        }
        None => ListOutcome::NotPresent,
    }
}

impl GuildPolicyConfig {
    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::ForceLimit => self.forcelimit_enabled,
            Feature::Vip => self.vip_enabled,
        }
    }

    pub fn set_enabled(&mut self, feature: Feature, enabled: bool) -> ToggleOutcome {
        let flag = match feature {
            Feature::ForceLimit => &mut self.forcelimit_enabled,
            Feature::Vip => &mut self.vip_enabled,
        };
        if *flag == enabled {
            return ToggleOutcome::AlreadyInState;
        }
        *flag = enabled;
        ToggleOutcome::Changed
    }

    /// Insert the target's id into the category's list.
    ///
    /// The category must match the target kind; mismatches are reported as
    /// `NotPresent` without touching any list.
    pub fn add(&mut self, category: ListCategory, target: Target) -> ListOutcome {
        match (category, target) {
            (ListCategory::IgnoreMember, Target::Member(id)) => {
                insert(&mut self.forcelimit_ignore_member_list, id)
            }
            (ListCategory::IgnoreRole, Target::Role(id)) => {
                insert(&mut self.forcelimit_ignore_role_list, id)
            }
            (ListCategory::IgnoreChannel, Target::Channel(id)) => {
                insert(&mut self.forcelimit_ignore_vc_list, id)
            }
            (ListCategory::VipMember, Target::Member(id)) => insert(&mut self.vip_member_list, id),
            (ListCategory::VipRole, Target::Role(id)) => insert(&mut self.vip_role_list, id),
            _ => ListOutcome::NotPresent,
        }
    }

    pub fn remove(&mut self, category: ListCategory, target: Target) -> ListOutcome {
        match (category, target) {
            (ListCategory::IgnoreMember, Target::Member(id)) => {
                delete(&mut self.forcelimit_ignore_member_list, &id)
            }
            (ListCategory::IgnoreRole, Target::Role(id)) => {
                delete(&mut self.forcelimit_ignore_role_list, &id)
            }
            (ListCategory::IgnoreChannel, Target::Channel(id)) => {
                delete(&mut self.forcelimit_ignore_vc_list, &id)
            }
            (ListCategory::VipMember, Target::Member(id)) => delete(&mut self.vip_member_list, &id),
            (ListCategory::VipRole, Target::Role(id)) => delete(&mut self.vip_role_list, &id),
            _ => ListOutcome::NotPresent,
        }
    }

    /// Entries of a list, in insertion order
    pub fn entries(&self, category: ListCategory) -> Vec<Target> {
        match category {
            ListCategory::IgnoreMember => self
                .forcelimit_ignore_member_list
                .iter()
                .copied()
                .map(Target::Member)
                .collect(),
            ListCategory::IgnoreRole => self
                .forcelimit_ignore_role_list
                .iter()
                .copied()
                .map(Target::Role)
                .collect(),
            ListCategory::IgnoreChannel => self
                .forcelimit_ignore_vc_list
                .iter()
                .copied()
                .map(Target::Channel)
                .collect(),
            ListCategory::VipMember => self.vip_member_list.iter().copied().map(Target::Member).collect(),
            ListCategory::VipRole => self.vip_role_list.iter().copied().map(Target::Role).collect(),
        }
    }
}
