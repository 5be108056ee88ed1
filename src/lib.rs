//! herald-bot - runtime core of a chat bot
//!
//! Loads event handlers and chat filters from a unit catalog, resolves
//! commands by label or alias, tracks pending reaction collectors and renders
//! replies from flattened, fallback-complete locales.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod units;

pub use application::bot::Bot;
pub use application::errors::BotError;
pub use application::loader::ModuleLoader;
