//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Bot: The shared runtime context and launch sequence
//! - Loader: Unit discovery and installation
//! - Services: Message and command processing
//! - Messaging: Command parsing
//! - Errors: Domain-specific errors

pub mod bot;
pub mod errors;
pub mod loader;
pub mod messaging;
pub mod services;
