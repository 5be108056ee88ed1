use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::{EventPayload, User};

/// Handle returned by `PlatformClient::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Handles one platform event
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn execute(&self, payload: EventPayload) -> Result<(), BotError>;
}

/// The chat platform connection the bot runs on.
///
/// Wire protocol, rate limits and gateway framing live behind this trait.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Invoke `handler` whenever `event` is emitted
    fn subscribe(&self, event: &str, handler: Arc<dyn EventHandler>) -> SubscriptionId;

    /// Stop delivering `event` to a subscription; false if it was not subscribed
    fn unsubscribe(&self, event: &str, id: SubscriptionId) -> bool;

    /// The account the bot is logged in as, once known
    fn current_user(&self) -> Option<User>;

    /// Send a text message, returning the new message id
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<String, BotError>;
}
