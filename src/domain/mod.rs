//! Domain layer - Core business logic with no external dependencies
//! 
//! This layer contains:
//! - Entities: Identifiers, guild policy records, voice transitions, targets
//! - Policy: The VIP / ForceLimit evaluator
//! - Listing: Paginated rendering of ignore and VIP lists
//! - Traits: Abstractions for infrastructure (ConfigStore, VoiceHost, TargetResolver)

pub mod entities;
pub mod listing;
pub mod policy;
pub mod traits;
