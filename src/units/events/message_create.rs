use std::sync::{Arc, Weak};

use async_trait::async_trait;

use crate::application::bot::Bot;
use crate::application::errors::{BotError, LoaderError};
use crate::application::services::MessageService;
use crate::domain::entities::EventPayload;
use crate::domain::traits::EventHandler;

/// Runs filters and commands for every new message
pub struct MessageCreateHandler {
    bot: Weak<Bot>,
    service: MessageService,
}

pub fn build(bot: &Arc<Bot>) -> Result<Arc<dyn EventHandler>, LoaderError> {
    Ok(Arc::new(MessageCreateHandler {
        bot: Arc::downgrade(bot),
        service: MessageService::new(bot.config().bot.prefix.clone()),
    }))
}

#[async_trait]
impl EventHandler for MessageCreateHandler {
    async fn execute(&self, payload: EventPayload) -> Result<(), BotError> {
        let EventPayload::Message(message) = payload else {
            return Err(BotError::Platform("messageCreate without a message".to_string()));
        };
        let Some(bot) = self.bot.upgrade() else {
            return Ok(());
        };
        self.service.respond(&bot, &message).await?;
        Ok(())
    }
}
