//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Storage and database: Guild settings persistence
//! - Adapters: Platform integrations (Discord, console)

pub mod config;
pub mod storage;
pub mod database;
pub mod adapters;
