//! Message parser - Splits prefixed text into a command and its arguments

use crate::domain::entities::{Content, Message};

/// Turns incoming text into structured content
pub struct MessageParser {
    command_prefix: String,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.command_prefix
    }

    /// Parse raw text. Prefixed text becomes `Content::Command` with a
    /// lowercased name; anything else stays `Content::Text`.
    pub fn parse_content(&self, text: &str) -> Content {
        let text = text.trim();
        if text.is_empty() {
            return Content::Empty;
        }
        let Some(rest) = text.strip_prefix(self.command_prefix.as_str()) else {
            return Content::Text(text.to_string());
        };

        let mut parts = rest.split_whitespace();
        match parts.next() {
            Some(name) => Content::Command {
                name: name.to_lowercase(),
                args: parts.map(str::to_string).collect(),
            },
            // a bare prefix is just text
            None => Content::Text(text.to_string()),
        }
    }

    /// Re-parse a message's raw text, keeping its id, channel and author
    pub fn parse(&self, message: &Message) -> Message {
        let mut parsed = message.clone();
        parsed.content = self.parse_content(&message.raw);
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_with_args() {
        let parser = MessageParser::new("!");
        assert_eq!(
            parser.parse_content("!Ban @user spamming"),
            Content::Command {
                name: "ban".to_string(),
                args: vec!["@user".to_string(), "spamming".to_string()],
            }
        );
    }

    #[test]
    fn test_parse_plain_text() {
        let parser = MessageParser::new("!");
        assert_eq!(parser.parse_content("hello"), Content::Text("hello".to_string()));
        assert_eq!(parser.parse_content("!"), Content::Text("!".to_string()));
        assert_eq!(parser.parse_content("   "), Content::Empty);
    }

    #[test]
    fn test_multi_char_prefix() {
        let parser = MessageParser::new("a!");
        let message = Message::from_text("chan", "a!ping");
        let parsed = parser.parse(&message);
        assert_eq!(parsed.id, message.id);
        assert!(parsed.content.is_command());
    }
}
