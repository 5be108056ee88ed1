//! Domain layer - Core business logic
//!
//! This layer contains:
//! - Entities: Commands, collectors, locales, messages
//! - Traits: Abstractions for the platform client, filters and scheduling

pub mod entities;
pub mod traits;
