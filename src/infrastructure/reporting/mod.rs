//! Error reporting
//!
//! Errors are turned into `ErrorReport`s tagged with the release and
//! environment and handed to a `ReportSink`. Delivery to a hosted service
//! is the sink's business; the default sink writes reports to the log.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::infrastructure::config::ReportingConfig;

/// Upstream hiccups we can do nothing about:
/// "Gateway Time-out on ...", "Request timed out (>Nms) on ...",
/// "500 INTERNAL SERVER ERROR on POST ..."
pub const TRANSIENT_ERROR_PATTERNS: &[&str] = &[
    "Time-out on",
    "Request timed out (",
    "500 INTERNAL SERVER ERROR on",
];

#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub release: String,
    pub environment: String,
    pub message: String,
    pub breadcrumbs: Vec<String>,
}

/// Where finished reports go
pub trait ReportSink: Send + Sync {
    fn send(&self, report: &ErrorReport);
}

/// Writes reports to the log as JSON
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn send(&self, report: &ErrorReport) {
        match serde_json::to_string(report) {
            Ok(json) => tracing::error!(report = %json, "Captured error"),
            Err(e) => tracing::error!("Failed to serialize error report {}: {}", report.id, e),
        }
    }
}

pub struct ErrorReporter {
    release: String,
    config: ReportingConfig,
    breadcrumbs: Mutex<VecDeque<String>>,
    sink: Arc<dyn ReportSink>,
}

impl ErrorReporter {
    /// Set up reporting once at launch
    pub fn init(release: impl Into<String>, config: ReportingConfig) -> Self {
        if config.dsn.is_none() {
            tracing::warn!("Error reporting disabled, set ERROR_REPORTING_DSN to enable it.");
        }
        Self {
            release: release.into(),
            config,
            breadcrumbs: Mutex::new(VecDeque::new()),
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.config.dsn.is_some()
    }

    pub fn release(&self) -> &str {
        &self.release
    }

    pub fn environment(&self) -> &str {
        &self.config.environment
    }

    /// Whether the text matches one of the ignored patterns
    pub fn is_ignored(&self, text: &str) -> bool {
        self.config
            .ignore_errors
            .iter()
            .any(|pattern| text.contains(pattern.as_str()))
    }

    pub fn add_breadcrumb(&self, crumb: impl Into<String>) {
        if let Ok(mut crumbs) = self.breadcrumbs.lock() {
            crumbs.push_back(crumb.into());
            while crumbs.len() > self.config.max_breadcrumbs {
                crumbs.pop_front();
            }
        }
    }

    pub fn capture_error(&self, error: &dyn std::error::Error) -> Option<Uuid> {
        let mut message = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            message.push_str(&format!(": {}", cause));
            source = cause.source();
        }
        self.capture_message(&message)
    }

    /// Build and send a report; `None` when the message is ignored
    pub fn capture_message(&self, message: &str) -> Option<Uuid> {
        if self.is_ignored(message) {
            tracing::debug!("Not reporting transient error: {}", message);
            return None;
        }

        let breadcrumbs = self
            .breadcrumbs
            .lock()
            .map(|c| c.iter().cloned().collect())
            .unwrap_or_default();

        let report = ErrorReport {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            release: self.release.clone(),
            environment: self.config.environment.clone(),
            message: message.to_string(),
            breadcrumbs,
        };

        if self.config.debug {
            tracing::debug!(id = %report.id, "Sending error report");
        }
        self.sink.send(&report);
        Some(report.id)
    }
}

static FAULT_HANDLERS: Once = Once::new();

/// Log and report panics instead of letting them pass silently.
///
/// Panics inside spawned tasks are contained by the runtime, so with this
/// hook in place a faulty handler is reported and the process keeps going.
/// Only the first call installs the hook.
pub fn install_fault_handlers(reporter: Arc<ErrorReporter>) {
    FAULT_HANDLERS.call_once(move || set_panic_hook(reporter));
}

fn set_panic_hook(reporter: Arc<ErrorReporter>) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());

        tracing::warn!(location = %location, "Uncaught fault: {}", payload);
        reporter.capture_message(&format!("panic at {}: {}", location, payload));

        if reporter.config.debug {
            default_hook(info);
        }
    }));
}
