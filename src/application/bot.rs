//! The running bot instance
//!
//! One `Bot` is created at process start and shared as `Arc<Bot>`. Units
//! receive it when they are built; nothing reaches it through a global.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::application::loader::ModuleLoader;
use crate::application::services::CommandSetup;
use crate::domain::entities::{Collectors, CommandRegistry, EventPayload, Locale};
use crate::domain::traits::{
    EventHandler, Filter, FilterInfo, PlatformClient, SubscriptionId, TaskScheduler,
};
use crate::infrastructure::config::Config;
use crate::infrastructure::locales::LocaleStore;
use crate::infrastructure::reporting::{install_fault_handlers, ErrorReporter};

/// A filter together with the descriptor it was installed with
#[derive(Clone)]
pub struct InstalledFilter {
    pub name: String,
    pub info: FilterInfo,
    pub filter: Arc<dyn Filter>,
}

struct InstalledHandler {
    handler: Arc<dyn EventHandler>,
    subscription: SubscriptionId,
}

/// Logs and reports handler errors so they never reach the emitter
struct GuardedHandler {
    event: String,
    inner: Arc<dyn EventHandler>,
    reporter: Arc<ErrorReporter>,
}

#[async_trait]
impl EventHandler for GuardedHandler {
    async fn execute(&self, payload: EventPayload) -> Result<(), BotError> {
        if let Err(e) = self.inner.execute(payload).await {
            tracing::warn!(event = %self.event, "Event handler failed: {}", e);
            self.reporter.add_breadcrumb(format!("event {}", self.event));
            self.reporter.capture_error(&e);
        }
        Ok(())
    }
}

pub struct Bot {
    version: String,
    user_agent: String,
    config: Config,
    client: Arc<dyn PlatformClient>,
    commands: CommandRegistry,
    collectors: Collectors,
    locales: LocaleStore,
    filters: RwLock<Vec<InstalledFilter>>,
    event_handlers: RwLock<HashMap<String, InstalledHandler>>,
    reporter: Arc<ErrorReporter>,
    scheduler: Option<Arc<dyn TaskScheduler>>,
    ready: AtomicBool,
}

impl Bot {
    pub fn new(config: Config, client: Arc<dyn PlatformClient>) -> Self {
        let version = env!("CARGO_PKG_VERSION").to_string();
        let reporter = ErrorReporter::init(version.clone(), config.reporting.clone());
        Self {
            user_agent: format!("{} ({})", config.bot.name, version),
            version,
            locales: LocaleStore::new(config.locales.source.clone()),
            config,
            client,
            commands: CommandRegistry::new(),
            collectors: Collectors::new(),
            filters: RwLock::new(Vec::new()),
            event_handlers: RwLock::new(HashMap::new()),
            reporter: Arc::new(reporter),
            scheduler: None,
            ready: AtomicBool::new(false),
        }
    }

    pub fn with_reporter(mut self, reporter: ErrorReporter) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn TaskScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn environment(&self) -> &str {
        self.reporter.environment()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &Arc<dyn PlatformClient> {
        &self.client
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn collectors(&self) -> &Collectors {
        &self.collectors
    }

    pub fn locales(&self) -> &LocaleStore {
        &self.locales
    }

    pub fn reporter(&self) -> &Arc<ErrorReporter> {
        &self.reporter
    }

    pub fn scheduler(&self) -> Option<&dyn TaskScheduler> {
        self.scheduler.as_deref()
    }

    /// Avatar of the logged-in account, read from the client every time
    pub fn avatar(&self) -> Option<String> {
        self.client.current_user().and_then(|u| u.avatar_url)
    }

    /// The locale replies are rendered in
    pub fn locale(&self) -> Option<Arc<Locale>> {
        self.locales.get_or_source(&self.config.bot.locale)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Run the launch sequence. The bot is ready only if every step succeeds.
    pub async fn launch(
        self: &Arc<Self>,
        loader: &ModuleLoader,
        commands: &dyn CommandSetup,
    ) -> Result<(), BotError> {
        install_fault_handlers(Arc::clone(&self.reporter));
        tracing::info!(
            release = %self.version,
            environment = %self.environment(),
            enabled = self.reporter.is_enabled(),
            "Error reporting initialized"
        );

        loader.load_event_handlers(self).await?;
        loader.load_filters(self).await?;

        let languages = self.locales.load_dir(&self.config.locales.directory).await?;
        tracing::info!("Loaded {} languages", languages);
        if self.locales.get(&self.config.bot.locale).is_none() {
            tracing::warn!(
                "Locale '{}' is not available, replies fall back to '{}'",
                self.config.bot.locale,
                self.locales.source_code()
            );
        }

        let installed = commands.setup(&self.commands)?;
        tracing::info!("Loaded {} commands", installed);

        self.ready.store(true, Ordering::Release);
        self.reporter.add_breadcrumb("launched");
        Ok(())
    }

    /// Install `handler` for `event`, unsubscribing any previous handler
    /// first. Returns true if a handler was replaced.
    pub fn install_event_handler(&self, event: &str, handler: Arc<dyn EventHandler>) -> bool {
        let guarded: Arc<dyn EventHandler> = Arc::new(GuardedHandler {
            event: event.to_string(),
            inner: Arc::clone(&handler),
            reporter: Arc::clone(&self.reporter),
        });

        let Ok(mut handlers) = self.event_handlers.write() else {
            return false;
        };
        let replaced = match handlers.remove(event) {
            Some(previous) => {
                self.client.unsubscribe(event, previous.subscription);
                true
            }
            None => false,
        };
        let subscription = self.client.subscribe(event, guarded);
        handlers.insert(
            event.to_string(),
            InstalledHandler {
                handler,
                subscription,
            },
        );
        replaced
    }

    pub fn event_handler(&self, event: &str) -> Option<Arc<dyn EventHandler>> {
        self.event_handlers
            .read()
            .ok()?
            .get(event)
            .map(|h| Arc::clone(&h.handler))
    }

    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .event_handlers
            .read()
            .map(|h| h.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Install a filter under `name`. A filter with the same name is
    /// replaced in place and keeps its position. Returns true if replaced.
    pub fn install_filter(&self, name: &str, filter: Arc<dyn Filter>) -> bool {
        let installed = InstalledFilter {
            name: name.to_string(),
            info: filter.describe(),
            filter,
        };
        let Ok(mut filters) = self.filters.write() else {
            return false;
        };
        match filters.iter_mut().find(|f| f.name == name) {
            Some(slot) => {
                *slot = installed;
                true
            }
            None => {
                filters.push(installed);
                false
            }
        }
    }

    /// Installed filters in the order they were discovered
    pub fn filters(&self) -> Vec<InstalledFilter> {
        self.filters.read().map(|f| f.clone()).unwrap_or_default()
    }

    /// Unsubscribe every handler and drop all units
    pub fn shutdown(&self) {
        self.ready.store(false, Ordering::Release);
        if let Ok(mut handlers) = self.event_handlers.write() {
            for (event, installed) in handlers.drain() {
                self.client.unsubscribe(&event, installed.subscription);
            }
        }
        if let Ok(mut filters) = self.filters.write() {
            filters.clear();
        }
        tracing::info!("Bot shut down");
    }
}
