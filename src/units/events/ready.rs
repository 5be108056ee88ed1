use std::sync::{Arc, Weak};

use async_trait::async_trait;

use crate::application::bot::Bot;
use crate::application::errors::{BotError, LoaderError};
use crate::domain::entities::EventPayload;
use crate::domain::traits::EventHandler;

/// Logs the account the bot connected as
pub struct ReadyHandler {
    bot: Weak<Bot>,
}

pub fn build(bot: &Arc<Bot>) -> Result<Arc<dyn EventHandler>, LoaderError> {
    Ok(Arc::new(ReadyHandler {
        bot: Arc::downgrade(bot),
    }))
}

#[async_trait]
impl EventHandler for ReadyHandler {
    async fn execute(&self, _payload: EventPayload) -> Result<(), BotError> {
        let Some(bot) = self.bot.upgrade() else {
            return Ok(());
        };
        let user = bot
            .client()
            .current_user()
            .ok_or_else(|| BotError::Platform("ready fired without an identity".to_string()))?;

        tracing::info!(
            avatar = bot.avatar().as_deref().unwrap_or("none"),
            "Logged in as {} ({}), {} v{}",
            user.tag(),
            user.id,
            bot.user_agent(),
            bot.version()
        );
        bot.reporter().add_breadcrumb(format!("ready as {}", user.id));
        Ok(())
    }
}
