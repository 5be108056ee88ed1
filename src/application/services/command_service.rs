use crate::application::bot::Bot;
use crate::application::errors::CommandError;
use crate::application::messaging::MessageParser;
use crate::domain::entities::{CommandContext, CommandRegistry, Content, Message};

/// Installs a set of commands into the registry.
///
/// A name conflict is a configuration bug and fails the whole setup.
pub trait CommandSetup: Send + Sync {
    /// Register every command; returns how many were registered
    fn setup(&self, registry: &CommandRegistry) -> Result<usize, CommandError>;
}

/// Service for resolving and executing commands
pub struct CommandService {
    parser: MessageParser,
}

impl CommandService {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            parser: MessageParser::new(prefix),
        }
    }

    pub fn prefix(&self) -> &str {
        self.parser.prefix()
    }

    /// Run the command a message invokes.
    ///
    /// `Ok(None)` when the message is not a command, names no known command,
    /// or no locale is loaded yet.
    pub fn handle(&self, bot: &Bot, message: &Message) -> Result<Option<String>, CommandError> {
        let parsed = self.parser.parse(message);
        let Content::Command { name, args } = &parsed.content else {
            return Ok(None);
        };

        let Some(command) = bot.commands().resolve(name) else {
            tracing::debug!("Ignoring unknown command: {}", name);
            return Ok(None);
        };
        let Some(locale) = bot.locale() else {
            return Ok(None);
        };

        tracing::debug!(command = %command.label, args = args.len(), "Executing command");
        let ctx = CommandContext {
            message: &parsed,
            args,
            locale: &locale,
            commands: bot.commands(),
            scheduler: bot.scheduler(),
            prefix: self.prefix(),
        };
        match command.execute(&ctx) {
            Ok(reply) => Ok(Some(reply)),
            Err(CommandError::PermissionDenied) => {
                tracing::info!(
                    command = %command.label,
                    channel = %message.channel_id,
                    "Permission denied"
                );
                Ok(None)
            }
            // a usage mistake, not a fault
            Err(CommandError::InvalidArgs(reason)) => {
                tracing::debug!(command = %command.label, "Invalid arguments: {}", reason);
                let usage = format!(
                    "{}{}",
                    self.prefix(),
                    command.usage.as_deref().unwrap_or(&command.label)
                );
                Ok(Some(locale.format("general.errors.usage", &[("usage", usage.as_str())])))
            }
            Err(e) => Err(e),
        }
    }
}
