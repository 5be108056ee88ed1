use serde::{Deserialize, Serialize};

use crate::domain::entities::Message;

/// Static description of a chat filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterInfo {
    pub name: String,
    pub description: String,
    /// Locale key of the warning shown when the filter triggers
    pub warning_key: String,
}

/// A chat-content filter
pub trait Filter: Send + Sync {
    fn describe(&self) -> FilterInfo;

    /// True when the message breaks this filter's rule
    fn apply(&self, message: &Message) -> bool;
}
