//! Module loader - discovers units and installs them into a running bot
//!
//! Event handlers and filters are registered as factories in a catalog.
//! A `UnitSource` decides which of them are loaded: each identifier it lists
//! is reduced to a unit name (`ready.yaml` -> `ready`), looked up in the
//! catalog, instantiated with the bot and installed. Without a source every
//! catalog entry is loaded in registration order.

pub mod catalog;
pub mod source;

use std::sync::Arc;

use crate::application::bot::Bot;
use crate::application::errors::LoaderError;
use crate::domain::traits::{EventHandler, Filter};

pub use catalog::{EventHandlerFactory, FilterFactory, UnitCatalog};
pub use source::{unit_name, DirectorySource, StaticSource, UnitSource};

pub struct ModuleLoader {
    event_units: UnitCatalog<EventHandlerFactory>,
    filter_units: UnitCatalog<FilterFactory>,
    event_source: Option<Box<dyn UnitSource>>,
    filter_source: Option<Box<dyn UnitSource>>,
}

impl ModuleLoader {
    pub fn new() -> Self {
        Self {
            event_units: UnitCatalog::new(),
            filter_units: UnitCatalog::new(),
            event_source: None,
            filter_source: None,
        }
    }

    pub fn with_event_source(mut self, source: impl UnitSource + 'static) -> Self {
        self.event_source = Some(Box::new(source));
        self
    }

    pub fn with_filter_source(mut self, source: impl UnitSource + 'static) -> Self {
        self.filter_source = Some(Box::new(source));
        self
    }

    /// Register the factory for the handler of event `name`
    pub fn event_unit<C>(&self, name: &str, factory: C) -> bool
    where
        C: Fn(&Arc<Bot>) -> Result<Arc<dyn EventHandler>, LoaderError> + Send + Sync + 'static,
    {
        self.event_units.register(name, Arc::new(factory))
    }

    /// Register the factory for filter `name`
    pub fn filter_unit<C>(&self, name: &str, factory: C) -> bool
    where
        C: Fn(&Arc<Bot>) -> Result<Arc<dyn Filter>, LoaderError> + Send + Sync + 'static,
    {
        self.filter_units.register(name, Arc::new(factory))
    }

    pub fn event_units(&self) -> &UnitCatalog<EventHandlerFactory> {
        &self.event_units
    }

    pub fn filter_units(&self) -> &UnitCatalog<FilterFactory> {
        &self.filter_units
    }

    /// Install every discovered event handler; returns how many were installed
    pub async fn load_event_handlers(&self, bot: &Arc<Bot>) -> Result<usize, LoaderError> {
        let identifiers = discover(self.event_source.as_deref(), &self.event_units).await?;
        let mut installed = 0;

        for identifier in &identifiers {
            match self.install_event_handler(bot, identifier) {
                Ok(()) => {
                    installed += 1;
                    tracing::info!("Loaded event handler: \"{}\"", identifier);
                }
                Err(e) => tracing::warn!("Skipping event handler \"{}\": {}", identifier, e),
            }
        }

        tracing::info!("Loaded {} events", installed);
        Ok(installed)
    }

    /// Install every discovered filter; returns how many were installed
    pub async fn load_filters(&self, bot: &Arc<Bot>) -> Result<usize, LoaderError> {
        let identifiers = discover(self.filter_source.as_deref(), &self.filter_units).await?;
        let mut installed = 0;

        for identifier in &identifiers {
            match self.install_filter(bot, identifier) {
                Ok(()) => {
                    installed += 1;
                    tracing::info!("Loaded chat filter: \"{}\"", identifier);
                }
                Err(e) => tracing::warn!("Skipping chat filter \"{}\": {}", identifier, e),
            }
        }

        tracing::info!("Loaded {} filters", installed);
        Ok(installed)
    }

    /// Build a fresh handler for `name` from its current factory and install it
    pub fn reload_event_handler(&self, bot: &Arc<Bot>, name: &str) -> Result<(), LoaderError> {
        self.install_event_handler(bot, name)?;
        tracing::info!("Reloaded event handler: \"{}\"", name);
        Ok(())
    }

    /// Swap the factory for `name`, then reload it
    pub fn replace_event_unit<C>(
        &self,
        bot: &Arc<Bot>,
        name: &str,
        factory: C,
    ) -> Result<(), LoaderError>
    where
        C: Fn(&Arc<Bot>) -> Result<Arc<dyn EventHandler>, LoaderError> + Send + Sync + 'static,
    {
        self.event_unit(name, factory);
        self.reload_event_handler(bot, name)
    }

    fn install_event_handler(&self, bot: &Arc<Bot>, identifier: &str) -> Result<(), LoaderError> {
        let name = unit_name(identifier)
            .ok_or_else(|| LoaderError::UnknownUnit(identifier.to_string()))?;
        let factory = self
            .event_units
            .get(name)
            .ok_or_else(|| LoaderError::UnknownUnit(name.to_string()))?;
        let handler = factory(bot)?;

        if bot.install_event_handler(name, handler) {
            tracing::warn!("Event handler \"{}\" replaced an earlier one", name);
        }
        Ok(())
    }

    fn install_filter(&self, bot: &Arc<Bot>, identifier: &str) -> Result<(), LoaderError> {
        let name = unit_name(identifier)
            .ok_or_else(|| LoaderError::UnknownUnit(identifier.to_string()))?;
        let factory = self
            .filter_units
            .get(name)
            .ok_or_else(|| LoaderError::UnknownUnit(name.to_string()))?;
        let filter = factory(bot)?;

        if bot.install_filter(name, filter) {
            tracing::warn!("Chat filter \"{}\" replaced an earlier one", name);
        }
        Ok(())
    }
}

impl Default for ModuleLoader {
    fn default() -> Self {
        Self::new()
    }
}

async fn discover<F: ?Sized>(
    source: Option<&dyn UnitSource>,
    catalog: &UnitCatalog<F>,
) -> Result<Vec<String>, LoaderError> {
    match source {
        Some(source) => {
            tracing::debug!("Discovering units from {}", source.describe());
            source.list().await
        }
        None => Ok(catalog.keys()),
    }
}

#[cfg(test)]
mod tests;
