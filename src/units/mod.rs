//! Builtin units: event handlers, chat filters and commands

pub mod commands;
pub mod events;
pub mod filters;

use crate::application::loader::ModuleLoader;
use crate::domain::entities::events::{MESSAGE_CREATE, MESSAGE_REACTION_ADD, READY};

pub use commands::{BuiltinCommands, ReminderRunner};

/// A loader whose catalog holds every builtin event handler and filter
pub fn builtin_loader() -> ModuleLoader {
    let loader = ModuleLoader::new();

    loader.event_unit(READY, events::ready::build);
    loader.event_unit(MESSAGE_CREATE, events::message_create::build);
    loader.event_unit(MESSAGE_REACTION_ADD, events::message_reaction_add::build);

    loader.filter_unit("invites", filters::invites::build);
    loader.filter_unit("capslock", filters::capslock::build);

    loader
}
