use super::User;
use chrono::{DateTime, Utc};

/// Message content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Command { name: String, args: Vec<String> },
    Empty,
}

impl Content {
    pub fn is_command(&self) -> bool {
        matches!(self, Content::Command { .. })
    }
}

/// Represents an incoming or outgoing chat message
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub channel_id: String,
    pub author: Option<User>,
    /// Raw text as typed, before command parsing
    pub raw: String,
    pub content: Content,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(channel_id: impl Into<String>, content: Content) -> Self {
        let raw = match &content {
            Content::Text(s) => s.clone(),
            Content::Command { name, args } if args.is_empty() => name.clone(),
            Content::Command { name, args } => format!("{} {}", name, args.join(" ")),
            Content::Empty => String::new(),
        };
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            channel_id: channel_id.into(),
            author: None,
            raw,
            content,
            timestamp: Utc::now(),
        }
    }

    pub fn from_text(channel_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(channel_id, Content::Text(text.into()))
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_author(mut self, user: User) -> Self {
        self.author = Some(user);
        self
    }

    /// Messages written by other bots are never acted on
    pub fn is_from_bot(&self) -> bool {
        self.author.as_ref().map(|u| u.is_bot).unwrap_or(false)
    }
}

/// A reaction added to a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub message_id: String,
    pub channel_id: String,
    pub user_id: String,
    pub emoji: String,
}

impl Reaction {
    pub fn new(
        message_id: impl Into<String>,
        channel_id: impl Into<String>,
        user_id: impl Into<String>,
        emoji: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            channel_id: channel_id.into(),
            user_id: user_id.into(),
            emoji: emoji.into(),
        }
    }
}

/// Payload carried by a platform event
#[derive(Debug, Clone)]
pub enum EventPayload {
    Ready,
    Message(Message),
    Reaction(Reaction),
    Raw(serde_json::Value),
}

/// Event names understood by the builtin handlers
pub mod events {
    pub const READY: &str = "ready";
    pub const MESSAGE_CREATE: &str = "messageCreate";
    pub const MESSAGE_REACTION_ADD: &str = "messageReactionAdd";
}
