//! Voice channel moderation bot: ForceLimit and VIP modules

pub mod domain;
pub mod application;
pub mod infrastructure;
