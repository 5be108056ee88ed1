//! Unit catalog - named factories for event handlers and filters

use std::sync::{Arc, RwLock};

use crate::application::bot::Bot;
use crate::application::errors::LoaderError;
use crate::domain::traits::{EventHandler, Filter};

/// Builds an event handler for a running bot
pub type EventHandlerFactory =
    dyn Fn(&Arc<Bot>) -> Result<Arc<dyn EventHandler>, LoaderError> + Send + Sync;

/// Builds a filter for a running bot
pub type FilterFactory = dyn Fn(&Arc<Bot>) -> Result<Arc<dyn Filter>, LoaderError> + Send + Sync;

/// Factories behind stable keys, in registration order.
///
/// Replacing a key swaps the factory in place; instances already built from
/// the old factory are untouched until the unit is reloaded.
pub struct UnitCatalog<F: ?Sized> {
    units: RwLock<Vec<(String, Arc<F>)>>,
}

impl<F: ?Sized> UnitCatalog<F> {
    pub fn new() -> Self {
        Self {
            units: RwLock::new(Vec::new()),
        }
    }

    /// Add or replace a factory; true if one was replaced
    pub fn register(&self, key: impl Into<String>, factory: Arc<F>) -> bool {
        let key = key.into();
        let Ok(mut units) = self.units.write() else {
            return false;
        };
        match units.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => {
                slot.1 = factory;
                true
            }
            None => {
                units.push((key, factory));
                false
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<F>> {
        self.units
            .read()
            .ok()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, f)| Arc::clone(f))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> Vec<String> {
        self.units
            .read()
            .map(|u| u.iter().map(|(k, _)| k.clone()).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.units.read().map(|u| u.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<F: ?Sized> Default for UnitCatalog<F> {
    fn default() -> Self {
        Self::new()
    }
}
