//! VIP and ForceLimit decision rules
//!
//! `evaluate` is pure: it reads a config snapshot and an event and returns
//! the host actions to perform, in order. The VIP step always runs first and
//! the ForceLimit step sees the destination capacity after any VIP raise.

use crate::domain::entities::{
    Action, GuildPolicyConfig, VipMatch, VoiceTransitionEvent,
};

/// Decide which actions a voice-state transition requires
pub fn evaluate(event: &VoiceTransitionEvent, config: &GuildPolicyConfig) -> Vec<Action> {
    let mut actions = Vec::new();
    let mut destination_capacity = event.after.map(|c| c.capacity);

    if config.vip_enabled && event.changed_channel() {
        if let Some(vip) = vip_match(event, config) {
            if let Some(before) = event.before.filter(|c| c.is_limited()) {
                actions.push(Action::SetChannelCapacity {
                    channel: before.id,
                    capacity: before.capacity - 1,
                    vip,
                });
            }
            if let Some(after) = event.after.filter(|c| c.is_limited()) {
                let raised = after.capacity.saturating_add(1);
                destination_capacity = Some(raised);
                actions.push(Action::SetChannelCapacity {
                    channel: after.id,
                    capacity: raised,
                    vip,
                });
            }
        }
    }

    if config.forcelimit_enabled {
        if let (Some(after), Some(capacity)) = (event.after, destination_capacity) {
            if capacity != 0 && after.occupants > capacity && !is_ignored(event, config) {
                actions.push(Action::ForceDisconnect {
                    member: event.member,
                    channel: after.id,
                });
            }
        }
    }

    actions
}

/// VIP rule matching the member, membership first, then the first held role
/// that is on the list.
pub fn vip_match(event: &VoiceTransitionEvent, config: &GuildPolicyConfig) -> Option<VipMatch> {
    if config.vip_member_list.contains(&event.member) {
        return Some(VipMatch::Member(event.member));
    }
    event
        .roles
        .iter()
        .find(|role| config.vip_role_list.contains(role))
        .map(|role| VipMatch::Role(*role))
}

/// Ignore-list exemption from ForceLimit, by member, any held role, or the
/// destination channel.
pub fn is_ignored(event: &VoiceTransitionEvent, config: &GuildPolicyConfig) -> bool {
    if config.forcelimit_ignore_member_list.contains(&event.member) {
        return true;
    }
    if event
        .roles
        .iter()
        .any(|role| config.forcelimit_ignore_role_list.contains(role))
    {
        return true;
    }
    event
        .after
        .map(|c| config.forcelimit_ignore_vc_list.contains(&c.id))
        .unwrap_or(false)
}
