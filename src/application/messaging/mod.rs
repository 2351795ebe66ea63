//! Message handling - Event-driven command processing

pub mod dispatcher;
pub mod middleware;
pub mod parser;

pub use dispatcher::MessageDispatcher;
pub use middleware::{Middleware, MiddlewareChain, GuildOnlyMiddleware, OwnerOnlyMiddleware, LoggingMiddleware};
pub use parser::MessageParser;
