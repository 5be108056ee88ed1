//! Console adapter for development/testing
//!
//! Every line read from stdin is emitted as a `messageCreate` event on a
//! `LocalClient`; replies are printed by the client.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::domain::entities::{events, EventPayload, Message, User};
use crate::infrastructure::adapters::local::LocalClient;

pub const CONSOLE_CHANNEL: &str = "console";

pub struct ConsoleAdapter {
    client: Arc<LocalClient>,
    author: User,
}

impl ConsoleAdapter {
    pub fn new(client: Arc<LocalClient>) -> Self {
        Self {
            client,
            author: User::new("console-user").with_username("you"),
        }
    }

    /// Feed stdin into the client until EOF
    pub async fn run(&self) -> std::io::Result<()> {
        tracing::info!("Console mode: type messages, Ctrl-D to quit");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let message =
                Message::from_text(CONSOLE_CHANNEL, line).with_author(self.author.clone());
            self.client
                .emit(events::MESSAGE_CREATE, EventPayload::Message(message))
                .await;
        }

        tracing::info!("Console closed");
        Ok(())
    }
}
