//! Domain traits - Abstractions for infrastructure implementations

pub mod host;
pub mod store;

pub use host::{VoiceHost, TargetResolver};
pub use store::ConfigStore;
