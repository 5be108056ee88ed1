use std::sync::Arc;

use crate::application::bot::Bot;
use crate::application::errors::LoaderError;
use crate::domain::entities::Message;
use crate::domain::traits::{Filter, FilterInfo};

const MIN_LETTERS: usize = 8;
const MAX_UPPERCASE_RATIO: f64 = 0.7;

/// Flags messages written mostly in capitals
pub struct CapslockFilter;

pub fn build(_bot: &Arc<Bot>) -> Result<Arc<dyn Filter>, LoaderError> {
    Ok(Arc::new(CapslockFilter))
}

impl Filter for CapslockFilter {
    fn describe(&self) -> FilterInfo {
        FilterInfo {
            name: "capslock".to_string(),
            description: "Blocks messages that are mostly uppercase".to_string(),
            warning_key: "filters.capslock.warning".to_string(),
        }
    }

    fn apply(&self, message: &Message) -> bool {
        let letters: Vec<char> = message.raw.chars().filter(|c| c.is_alphabetic()).collect();
        if letters.len() < MIN_LETTERS {
            return false;
        }
        let upper = letters.iter().filter(|c| c.is_uppercase()).count();
        upper as f64 / letters.len() as f64 > MAX_UPPERCASE_RATIO
    }
}
