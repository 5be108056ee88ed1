//! Domain traits - Abstractions for infrastructure implementations

pub mod filter;
pub mod platform;
pub mod scheduler;

pub use filter::{Filter, FilterInfo};
pub use platform::{EventHandler, PlatformClient, SubscriptionId};
pub use scheduler::{Job, JobId, TaskScheduler};
