//! Application services - Business logic orchestration

pub mod command_service;
pub mod list_service;
pub mod voice_service;

pub use command_service::{CommandService, Reply};
pub use list_service::{ListService, BatchReport};
pub use voice_service::VoiceService;
