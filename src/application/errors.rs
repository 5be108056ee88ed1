//! Application layer errors

use std::path::PathBuf;
use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Loader error: {0}")]
    Loader(#[from] LoaderError),

    #[error("Locale error: {0}")]
    Locale(#[from] LocaleError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Command registration and execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("'{name}' is already registered as {existing}")]
    Conflict { name: String, existing: String },

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Permission denied")]
    PermissionDenied,
}

/// Unit discovery and installation errors
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to list units in {path}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No factory registered for unit '{0}'")]
    UnknownUnit(String),

    #[error("Failed to instantiate unit '{unit}': {reason}")]
    Instantiate { unit: String, reason: String },
}

/// Translation loading errors
#[derive(Error, Debug)]
pub enum LocaleError {
    #[error("Source locale directory not found: {0}")]
    MissingSource(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Task scheduling errors
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Invalid job: {0}")]
    InvalidJob(String),

    #[error("Scheduler is shut down")]
    Closed,
}
