use crate::application::bot::{Bot, InstalledFilter};
use crate::application::errors::BotError;
use crate::domain::entities::Message;

use super::CommandService;

/// Service for processing incoming chat messages: filters first, then commands
pub struct MessageService {
    commands: CommandService,
}

impl MessageService {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            commands: CommandService::new(prefix),
        }
    }

    /// Process an incoming message and return the reply, if any
    pub fn process(&self, bot: &Bot, message: &Message) -> Result<Option<String>, BotError> {
        if !bot.is_ready() {
            tracing::debug!("Dropping message {} received before launch finished", message.id);
            return Ok(None);
        }
        if message.is_from_bot() {
            return Ok(None);
        }

        if let Some(hit) = self.first_triggered(bot, message) {
            tracing::info!(
                filter = %hit.name,
                channel = %message.channel_id,
                "Chat filter triggered"
            );
            let author = message
                .author
                .as_ref()
                .map(|u| u.tag())
                .unwrap_or_default();
            let warning = bot
                .locale()
                .map(|l| l.format(&hit.info.warning_key, &[("user", author.as_str())]))
                .unwrap_or_else(|| hit.info.description.clone());
            return Ok(Some(warning));
        }

        Ok(self.commands.handle(bot, message)?)
    }

    /// Process a message and send the reply back to its channel
    ///
    /// A failing command still gets a generic apology before the error is
    /// handed back for reporting.
    pub async fn respond(&self, bot: &Bot, message: &Message) -> Result<Option<String>, BotError> {
        let reply = match self.process(bot, message) {
            Ok(Some(reply)) => reply,
            Ok(None) => return Ok(None),
            Err(e @ BotError::Command(_)) => {
                if let Some(locale) = bot.locale() {
                    let apology = locale.text("general.errors.generic");
                    bot.client().send_message(&message.channel_id, apology).await?;
                }
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        let id = bot.client().send_message(&message.channel_id, &reply).await?;
        Ok(Some(id))
    }

    fn first_triggered(&self, bot: &Bot, message: &Message) -> Option<InstalledFilter> {
        bot.filters().into_iter().find(|f| f.filter.apply(message))
    }
}
