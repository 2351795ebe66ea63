//! Middleware system for command processing pipeline

use std::sync::Arc;
use crate::application::errors::CommandError;
use crate::domain::entities::{AdminCommand, GuildId, MemberId, Message};

/// Context passed through middleware chain
#[derive(Debug, Clone)]
pub struct Context {
    pub message: Message,
    pub command: AdminCommand,
    pub guild_id: Option<GuildId>,
    pub author: MemberId,
}

impl Context {
    pub fn new(message: Message, command: AdminCommand) -> Self {
        let guild_id = message.guild_id;
        let author = message.author;

        Self {
            message,
            command,
            guild_id,
            author,
        }
    }
}

/// Middleware trait - processors that can intercept and reject commands
pub trait Middleware: Send + Sync {
    /// Process a command and optionally modify the context
    fn process(&self, ctx: Context, next: Next) -> MiddlewareResult;
}

/// Result of middleware processing
pub type MiddlewareResult = Result<Context, MiddlewareError>;

/// Middleware errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiddlewareError {
    /// Command needs a guild
    GuildOnly,
    /// Permission denied
    PermissionDenied(String),
}

impl std::fmt::Display for MiddlewareError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MiddlewareError::GuildOnly => write!(f, "Guild only"),
            MiddlewareError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
        }
    }
}

impl std::error::Error for MiddlewareError {}

impl From<MiddlewareError> for CommandError {
    fn from(e: MiddlewareError) -> Self {
        match e {
            MiddlewareError::GuildOnly => CommandError::GuildOnly,
            MiddlewareError::PermissionDenied(_) => CommandError::PermissionDenied,
        }
    }
}

/// Next middleware in chain
#[derive(Clone)]
pub struct Next {
    remaining: Arc<Vec<Arc<dyn Middleware>>>,
}

impl Next {
    pub fn new(middlewares: Vec<Arc<dyn Middleware>>) -> Self {
        Self {
            remaining: Arc::new(middlewares),
        }
    }

    /// Process remaining middleware
    pub fn run(self, ctx: Context) -> MiddlewareResult {
        if let Some(first) = self.remaining.first() {
            let remaining = self.remaining[1..].to_vec();
            let next = Next::new(remaining);
            first.process(ctx, next)
        } else {
            // No more middleware, processing complete
            Ok(ctx)
        }
    }
}

/// Middleware chain builder
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    pub fn add<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub fn build(self) -> Vec<Arc<dyn Middleware>> {
        self.middlewares
    }
}

impl Default for MiddlewareChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Rejects `voicetools` commands sent outside a guild
pub struct GuildOnlyMiddleware;

impl Middleware for GuildOnlyMiddleware {
    fn process(&self, ctx: Context, next: Next) -> MiddlewareResult {
        if ctx.command.is_privileged() && ctx.guild_id.is_none() {
            return Err(MiddlewareError::GuildOnly);
        }
        next.run(ctx)
    }
}

/// Restricts `voicetools` commands to the bot owners
pub struct OwnerOnlyMiddleware {
    owners: Vec<MemberId>,
}

impl OwnerOnlyMiddleware {
    pub fn new(owners: Vec<MemberId>) -> Self {
        Self { owners }
    }
}

impl Middleware for OwnerOnlyMiddleware {
    fn process(&self, ctx: Context, next: Next) -> MiddlewareResult {
        if ctx.command.is_privileged() && !self.owners.contains(&ctx.author) {
            return Err(MiddlewareError::PermissionDenied(format!(
                "{} is not a bot owner",
                ctx.author
            )));
        }
        next.run(ctx)
    }
}

/// Logging middleware for debugging
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn process(&self, ctx: Context, next: Next) -> MiddlewareResult {
        let guild = ctx
            .guild_id
            .map(|g| g.to_string())
            .unwrap_or_else(|| "dm".to_string());

        tracing::debug!("[{}] {} invoked `{}`", guild, ctx.author, ctx.command.name());

        let result = next.run(ctx.clone());

        match &result {
            Ok(_) => {
                tracing::debug!("[{}] `{}` passed middleware", guild, ctx.command.name());
            }
            Err(e) => {
                tracing::warn!("[{}] `{}` rejected: {}", guild, ctx.command.name(), e);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Content, VipCommand};

    fn ctx(guild: Option<u64>, author: u64, command: AdminCommand) -> Context {
        let mut message = Message::new(5u64, author, Content::Empty);
        message.guild_id = guild.map(GuildId);
        Context::new(message, command)
    }

    fn chain() -> Next {
        Next::new(
            MiddlewareChain::new()
                .add(LoggingMiddleware)
                .add(GuildOnlyMiddleware)
                .add(OwnerOnlyMiddleware::new(vec![MemberId(1)]))
                .build(),
        )
    }

    #[test]
    fn test_owner_in_guild_passes() {
        assert!(chain().run(ctx(Some(9), 1, AdminCommand::Vip(VipCommand::List))).is_ok());
    }

    #[test]
    fn test_non_owner_is_rejected() {
        let err = chain().run(ctx(Some(9), 2, AdminCommand::Vip(VipCommand::List))).unwrap_err();
        assert!(matches!(err, MiddlewareError::PermissionDenied(_)));
    }

    #[test]
    fn test_direct_message_is_rejected() {
        let err = chain().run(ctx(None, 1, AdminCommand::Vip(VipCommand::Enable))).unwrap_err();
        assert_eq!(err, MiddlewareError::GuildOnly);
    }

    #[test]
    fn test_help_is_open_to_everyone() {
        assert!(chain().run(ctx(None, 2, AdminCommand::Help)).is_ok());
    }
}
