//! Domain entities - Core business objects with no external dependencies

pub mod user;
pub mod message;
pub mod command;
pub mod collector;
pub mod locale;

pub use user::User;
pub use message::{events, Content, EventPayload, Message, Reaction};
pub use command::{Command, CommandContext, CommandHandler, CommandRegistry};
pub use collector::{await_reaction, CollectorRegistry, Collectors, ReactionCollector};
pub use locale::{flatten, Flattened, Locale};
