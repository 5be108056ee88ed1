use std::sync::{Arc, Weak};

use async_trait::async_trait;

use crate::application::bot::Bot;
use crate::application::errors::{BotError, LoaderError};
use crate::domain::entities::EventPayload;
use crate::domain::traits::EventHandler;

/// Hands reactions to the emoji collectors waiting on that message
pub struct ReactionAddHandler {
    bot: Weak<Bot>,
}

pub fn build(bot: &Arc<Bot>) -> Result<Arc<dyn EventHandler>, LoaderError> {
    Ok(Arc::new(ReactionAddHandler {
        bot: Arc::downgrade(bot),
    }))
}

#[async_trait]
impl EventHandler for ReactionAddHandler {
    async fn execute(&self, payload: EventPayload) -> Result<(), BotError> {
        let EventPayload::Reaction(reaction) = payload else {
            return Err(BotError::Platform("messageReactionAdd without a reaction".to_string()));
        };
        let Some(bot) = self.bot.upgrade() else {
            return Ok(());
        };

        let collectors = bot.collectors().emojis.get(&reaction.message_id);
        for collector in collectors.iter().filter(|c| c.accepts(&reaction)) {
            if !collector.deliver(reaction.clone()) {
                tracing::debug!(
                    message_id = %reaction.message_id,
                    "Collector receiver already dropped"
                );
            }
        }
        Ok(())
    }
}
