//! Pending reaction interactions, indexed by the message they wait on

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::mpsc;

use super::Reaction;

/// Collectors of one kind, grouped by subject id (usually a message id).
///
/// Collectors are opaque to the registry: they are stored and removed by
/// pointer identity. Nothing here expires; whoever adds a collector must
/// delete it.
pub struct CollectorRegistry<C> {
    map: RwLock<HashMap<String, Vec<Arc<C>>>>,
}

impl<C> CollectorRegistry<C> {
    pub fn new() -> Self {
        Self {
            map: RwLock::new(HashMap::new()),
        }
    }

    /// Collectors waiting on `id`, in insertion order
    pub fn get(&self, id: &str) -> Vec<Arc<C>> {
        self.map
            .read()
            .ok()
            .and_then(|map| map.get(id).cloned())
            .unwrap_or_default()
    }

    pub fn add(&self, id: impl Into<String>, collector: Arc<C>) {
        if let Ok(mut map) = self.map.write() {
            map.entry(id.into()).or_default().push(collector);
        }
    }

    /// Remove the first collector identical to `collector`
    pub fn delete(&self, id: &str, collector: &Arc<C>) -> bool {
        let Ok(mut map) = self.map.write() else {
            return false;
        };
        let Some(list) = map.get_mut(id) else {
            return false;
        };
        let Some(index) = list.iter().position(|c| Arc::ptr_eq(c, collector)) else {
            return false;
        };
        list.remove(index);
        if list.is_empty() {
            map.remove(id);
        }
        true
    }

    /// Number of subject ids with at least one collector
    pub fn len(&self) -> usize {
        self.map.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<C> Default for CollectorRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Every collector kind the bot tracks
#[derive(Default)]
pub struct Collectors {
    pub emojis: CollectorRegistry<ReactionCollector>,
}

impl Collectors {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Waits for reactions on a message, optionally from one user only
pub struct ReactionCollector {
    user_id: Option<String>,
    sender: mpsc::UnboundedSender<Reaction>,
}

impl ReactionCollector {
    pub fn new(user_id: Option<String>) -> (Arc<Self>, mpsc::UnboundedReceiver<Reaction>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Arc::new(Self { user_id, sender }), receiver)
    }

    pub fn accepts(&self, reaction: &Reaction) -> bool {
        self.user_id
            .as_deref()
            .map(|id| id == reaction.user_id)
            .unwrap_or(true)
    }

    /// Forward a reaction; false once the receiving side is gone
    pub fn deliver(&self, reaction: Reaction) -> bool {
        self.sender.send(reaction).is_ok()
    }
}

/// Wait up to `timeout` for a reaction on `message_id`.
///
/// The collector is always removed before returning, whether a reaction
/// arrived or not.
pub async fn await_reaction(
    registry: &CollectorRegistry<ReactionCollector>,
    message_id: &str,
    user_id: Option<String>,
    timeout: Duration,
) -> Option<Reaction> {
    let (collector, mut receiver) = ReactionCollector::new(user_id);
    registry.add(message_id, Arc::clone(&collector));

    let outcome = tokio::time::timeout(timeout, receiver.recv()).await;
    registry.delete(message_id, &collector);

    match outcome {
        Ok(reaction) => reaction,
        Err(_) => {
            tracing::debug!(message_id = %message_id, "Reaction collector timed out");
            None
        }
    }
}
