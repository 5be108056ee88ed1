//! Platform adapters

pub mod console;
pub mod local;

pub use console::ConsoleAdapter;
pub use local::{LocalClient, SentMessage};
