//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Services: List administration, voice-event handling, command execution
//! - Errors: Domain-specific errors
//! - Messaging: Command parsing, middleware, dispatching

pub mod errors;
pub mod services;
pub mod messaging;
