//! Builtin event handlers, one module per event

pub mod message_create;
pub mod message_reaction_add;
pub mod ready;
