//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Locales: Translation files on disk
//! - Reporting: Error reporting and fault handlers
//! - Scheduler: Delayed jobs
//! - Adapters: Platform integrations (in-process client, console)

pub mod adapters;
pub mod config;
pub mod locales;
pub mod reporting;
pub mod scheduler;
