//! Builtin chat filters

pub mod capslock;
pub mod invites;
