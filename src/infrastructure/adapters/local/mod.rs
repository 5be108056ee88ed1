//! In-process platform client
//!
//! Implements event subscription and emission without a network connection.
//! Used by the console adapter and by tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::{EventPayload, User};
use crate::domain::traits::{EventHandler, PlatformClient, SubscriptionId};

/// A message the bot sent through this client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub id: String,
    pub channel_id: String,
    pub text: String,
}

type Listeners = HashMap<String, Vec<(SubscriptionId, Arc<dyn EventHandler>)>>;

pub struct LocalClient {
    identity: RwLock<Option<User>>,
    listeners: RwLock<Listeners>,
    next_id: AtomicU64,
    sent: Mutex<Vec<SentMessage>>,
    echo: bool,
}

impl LocalClient {
    pub fn new() -> Self {
        Self {
            identity: RwLock::new(None),
            listeners: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            sent: Mutex::new(Vec::new()),
            echo: false,
        }
    }

    /// Print every sent message to stdout
    pub fn with_echo(mut self) -> Self {
        self.echo = true;
        self
    }

    pub fn with_identity(self, user: User) -> Self {
        self.set_identity(user);
        self
    }

    pub fn set_identity(&self, user: User) {
        if let Ok(mut identity) = self.identity.write() {
            *identity = Some(user);
        }
    }

    pub fn subscription_count(&self, event: &str) -> usize {
        self.listeners
            .read()
            .map(|l| l.get(event).map(Vec::len).unwrap_or(0))
            .unwrap_or(0)
    }

    /// Messages sent so far, oldest first
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Deliver `payload` to every subscriber of `event`, one after another.
    ///
    /// Each handler runs in its own task so a panic stays inside that task.
    /// Returns the number of handlers that completed without error.
    pub async fn emit(&self, event: &str, payload: EventPayload) -> usize {
        let handlers: Vec<Arc<dyn EventHandler>> = self
            .listeners
            .read()
            .map(|l| {
                l.get(event)
                    .map(|subs| subs.iter().map(|(_, h)| Arc::clone(h)).collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default();

        let mut completed = 0;
        for handler in handlers {
            let payload = payload.clone();
            match tokio::spawn(async move { handler.execute(payload).await }).await {
                Ok(Ok(())) => completed += 1,
                Ok(Err(e)) => tracing::warn!(event = %event, "Event handler failed: {}", e),
                Err(e) => tracing::warn!(event = %event, "Event handler aborted: {}", e),
            }
        }
        completed
    }
}

impl Default for LocalClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlatformClient for LocalClient {
    fn subscribe(&self, event: &str, handler: Arc<dyn EventHandler>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut listeners) = self.listeners.write() {
            listeners
                .entry(event.to_string())
                .or_default()
                .push((id, handler));
        }
        id
    }

    fn unsubscribe(&self, event: &str, id: SubscriptionId) -> bool {
        let Ok(mut listeners) = self.listeners.write() else {
            return false;
        };
        let Some(subs) = listeners.get_mut(event) else {
            return false;
        };
        let before = subs.len();
        subs.retain(|(sub, _)| *sub != id);
        let removed = subs.len() != before;
        if subs.is_empty() {
            listeners.remove(event);
        }
        removed
    }

    fn current_user(&self) -> Option<User> {
        self.identity.read().ok()?.clone()
    }

    async fn send_message(&self, channel_id: &str, text: &str) -> Result<String, BotError> {
        let message = SentMessage {
            id: uuid::Uuid::new_v4().to_string(),
            channel_id: channel_id.to_string(),
            text: text.to_string(),
        };
        if self.echo {
            println!("[BOT] {}", text);
        }
        let id = message.id.clone();
        self.sent
            .lock()
            .map_err(|_| BotError::Internal("Lock poisoned".to_string()))?
            .push(message);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct Counter(AtomicUsize);

    #[async_trait]
    impl EventHandler for Counter {
        async fn execute(&self, _payload: EventPayload) -> Result<(), BotError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Panics;

    #[async_trait]
    impl EventHandler for Panics {
        async fn execute(&self, _payload: EventPayload) -> Result<(), BotError> {
            panic!("handler bug");
        }
    }

    #[tokio::test]
    async fn test_emit_reaches_subscribers() {
        let client = LocalClient::new();
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        client.subscribe("ready", counter.clone());

        assert_eq!(client.emit("ready", EventPayload::Ready).await, 1);
        assert_eq!(client.emit("other", EventPayload::Ready).await, 0);
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let client = LocalClient::new();
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        let id = client.subscribe("ready", counter.clone());

        assert!(client.unsubscribe("ready", id));
        assert!(!client.unsubscribe("ready", id));
        assert_eq!(client.subscription_count("ready"), 0);
        client.emit("ready", EventPayload::Ready).await;
        assert_eq!(counter.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_panicking_handler_is_contained() {
        let client = LocalClient::new();
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        client.subscribe("ready", Arc::new(Panics));
        client.subscribe("ready", counter.clone());

        assert_eq!(client.emit("ready", EventPayload::Ready).await, 1);
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_send_message_is_recorded() {
        let client = LocalClient::new().with_identity(User::new("1").as_bot());
        client.send_message("general", "hi").await.unwrap();

        let sent = client.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].channel_id, "general");
        assert_eq!(client.current_user().unwrap().id, "1");
    }
}
